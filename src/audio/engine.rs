use crate::audio_api::AudioCommand;

// A passive-buzzer stand-in: one square-wave voice, retuned and gated by
// commands. No allocation anywhere in the render path.
const MASTER_GAIN: f32 = 0.20;

// Per-sample slew toward the target gain so level jumps don't click.
const GAIN_SLEW: f32 = 0.0015;

pub struct Engine {
    sample_rate: f32,
    phase: f32,     // 0.0..1.0, wraps per cycle
    phase_inc: f32, // cycles per sample
    level: f32,     // commanded drive, 0..1
    gain: f32,      // slewed toward level * MASTER_GAIN
}

impl Engine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            phase: 0.0,
            phase_inc: 0.0,
            level: 0.0,
            gain: 0.0,
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::SetFrequency(hz) => {
                self.phase_inc = hz.max(0.0) / self.sample_rate;
            }
            AudioCommand::SetLevel(level) => {
                self.level = level.clamp(0.0, 1.0);
            }
            AudioCommand::Silence => {
                self.level = 0.0;
            }
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        let out = if self.phase < 0.5 { 1.0 } else { -1.0 };

        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        let target = self.level * MASTER_GAIN;
        self.gain += (target - self.gain) * GAIN_SLEW;

        out * self.gain
    }

    // fill one interleaved block; every channel gets the same mono voice
    pub fn render_block(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels) {
            let s = self.next_sample();
            for slot in frame.iter_mut() {
                *slot = s;
            }
        }
    }
}
