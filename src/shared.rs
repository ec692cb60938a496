// The input plan:
//
//   Up / Down         //  LightDelta(-1500 or 1500), nudge the simulated sensor
//   PageUp / PageDown //  LightDelta(-8000 or 8000), big jumps
//   Space             //  LightFlash, slam the sensor to the peak value
//   d                 //  LightDim, back off past the re-arm boundary
//   w                 //  SavePattern, write the override melody to the store
//   o                 //  CyclePattern, load the next stored pattern as the override
//   x                 //  DeletePattern, remove the currently loaded pattern
//   r                 //  ResetMelody, back to the built-in peak melody
//   l                 //  RefreshPatterns, re-read the pattern listing
//   Esc / Ctrl-C      //  Quit
//
// The rendering split: the conductor owns every bit of sequencer/trigger
// state, and the TUI just draws the DisplayState snapshot it hands out each
// frame.

/// Full-scale raw sensor value (16-bit ADC).
pub const RAW_MAX: u16 = u16::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    // simulated sensor knob
    LightDelta(i32),
    LightFlash,
    LightDim,

    // pattern store commands
    SavePattern,
    CyclePattern,
    DeletePattern,
    ResetMelody,
    RefreshPatterns,

    // quit (esc, ctrl-c)
    Quit,
}

/// Snapshot the view renders every frame. Built by the conductor; the TUI
/// never reaches into live state.
#[derive(Clone, Debug)]
pub struct DisplayState {
    pub raw: u16,
    pub norm: f32,
    /// Ambient frequency currently driving the output. None while the melody
    /// run owns the output (or before the first tick).
    pub freq_hz: Option<f32>,
    pub armed: bool,
    pub active: bool,
    pub melody_name: String,
    pub loaded_pattern: Option<String>,
    pub patterns: Vec<String>,
    pub bpm: f32,
    pub status: String,
}
