use crate::audio_api::AudioCommand;
use crate::pipeline::note_event::NoteEvent;
use crate::pitch::midi_to_freq;

/// One melody step: a MIDI note or a rest, held for `beats`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MelodyEvent {
    pub pitch: Option<u8>,
    pub beats: f32,
}

impl MelodyEvent {
    pub fn note(pitch: u8, beats: f32) -> Self {
        Self {
            pitch: Some(pitch),
            beats,
        }
    }

    pub fn rest(beats: f32) -> Self {
        Self { pitch: None, beats }
    }

    /// Real-time length of this event, floored at one beat. Zero-length
    /// notes can't exist; half-beat entries hold a full beat.
    pub fn duration_secs(&self, bpm: f32) -> f32 {
        self.beats.max(1.0) * 60.0 / bpm
    }
}

/// An ordered, finite, immutable run of events.
#[derive(Clone, Debug)]
pub struct Melody {
    name: String,
    events: Vec<MelodyEvent>,
}

// The 18 notes the peak flash plays, half a beat each.
const PEAK_NOTES: [u8; 18] = [
    74, 78, 85, 78, 78, //
    74, 74, 74, 73, 74, //
    78, 81, 85, 81, 78, //
    88, 87, 86,
];

impl Melody {
    pub fn new(name: impl Into<String>, events: Vec<MelodyEvent>) -> Self {
        Self {
            name: name.into(),
            events,
        }
    }

    /// The built-in override melody.
    pub fn peak_default() -> Self {
        Self::new(
            "peak melody",
            PEAK_NOTES
                .iter()
                .map(|&n| MelodyEvent::note(n, 0.5))
                .collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn events(&self) -> &[MelodyEvent] {
        &self.events
    }

    pub fn duration_secs(&self, bpm: f32) -> f32 {
        self.events.iter().map(|e| e.duration_secs(bpm)).sum()
    }

    /// Rebuild a melody from a stored pattern: events are sorted by
    /// timestamp, each note holds until the next one starts, and the last
    /// note gets one beat.
    pub fn from_note_events(name: impl Into<String>, events: &[NoteEvent], bpm: f32) -> Self {
        let beat_sec = 60.0 / bpm;
        let mut sorted: Vec<&NoteEvent> = events.iter().collect();
        sorted.sort_by_key(|e| e.timestamp_ms);

        let steps = sorted
            .iter()
            .enumerate()
            .map(|(i, ev)| {
                let beats = match sorted.get(i + 1) {
                    Some(next) => {
                        let gap_ms = next.timestamp_ms.saturating_sub(ev.timestamp_ms);
                        (gap_ms as f32 / 1000.0) / beat_sec
                    }
                    None => 1.0,
                };
                MelodyEvent::note(ev.pitch, beats)
            })
            .collect();
        Self::new(name, steps)
    }

    /// Flatten to storable note events: timestamps accumulate event
    /// durations, rests advance the clock without emitting.
    pub fn to_note_events(&self, bpm: f32, magnitude: f32) -> Vec<NoteEvent> {
        let mut out = Vec::with_capacity(self.events.len());
        let mut clock_ms = 0u64;
        for ev in &self.events {
            if let Some(pitch) = ev.pitch {
                out.push(NoteEvent::new(clock_ms, pitch, magnitude));
            }
            clock_ms += (ev.duration_secs(bpm) * 1000.0).round() as u64;
        }
        out
    }
}

/// One in-flight playback of a melody. Advanced by the control loop each
/// tick; never restarted, never paused. While a run is live it is the only
/// thing emitting output commands.
pub struct MelodyRun {
    melody: Melody,
    bpm: f32,
    level: f32,
    idx: usize,
    remaining: f32, // seconds left on the current event
    started: bool,
    finished: bool,
}

impl MelodyRun {
    pub fn new(melody: Melody, bpm: f32, level: f32) -> Self {
        Self {
            melody,
            bpm,
            level,
            idx: 0,
            remaining: 0.0,
            started: false,
            finished: false,
        }
    }

    /// Consume `dt` seconds of playback, pushing output commands as events
    /// begin. The entry tick starts the first event and consumes no time, so
    /// note lengths count from the moment the note actually sounds. After
    /// the final event one Silence is emitted and the run reports finished.
    pub fn tick(&mut self, dt: f32, out: &mut Vec<AudioCommand>) {
        if self.finished {
            return;
        }

        if !self.started {
            self.started = true;
            if self.melody.events().is_empty() {
                out.push(AudioCommand::Silence);
                self.finished = true;
            } else {
                self.start_event(0, out);
            }
            return;
        }

        self.remaining -= dt;
        while self.remaining <= 0.0 {
            self.idx += 1;
            if self.idx >= self.melody.events().len() {
                out.push(AudioCommand::Silence);
                self.finished = true;
                return;
            }
            let carry = self.remaining; // <= 0, keeps totals exact across ticks
            self.start_event(self.idx, out);
            self.remaining += carry;
        }
    }

    fn start_event(&mut self, idx: usize, out: &mut Vec<AudioCommand>) {
        let ev = self.melody.events()[idx];
        match ev.pitch {
            Some(note) => {
                out.push(AudioCommand::SetFrequency(midi_to_freq(note)));
                out.push(AudioCommand::SetLevel(self.level));
            }
            None => out.push(AudioCommand::Silence),
        }
        self.remaining = ev.duration_secs(self.bpm);
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
