// The full HAL surface of the output device. The engine can't be poked
// directly (that would mean locking inside the audio callback), so the
// control loop sends these over the command channel and the callback drains
// them at the top of each block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AudioCommand {
    /// Retune the square wave, in Hz.
    SetFrequency(f32),
    /// Output drive strength, 0.0..=1.0.
    SetLevel(f32),
    /// Level to zero. Same as SetLevel(0.0), kept separate so intent shows
    /// up in command logs.
    Silence,
}
