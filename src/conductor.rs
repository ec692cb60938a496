// The middle layer. Owns every piece of mutable core state (the smoothed
// sensor reader, the trigger state machine, the in-flight melody run) and
// decides once per tick who gets to talk to the output. The TUI renders
// display_state(); main just relays commands to the audio thread.
use serde_json::json;

use crate::audio_api::AudioCommand;
use crate::melody::{Melody, MelodyRun};
use crate::pipeline::pattern_store::{Metadata, PatternStore, StoreError};
use crate::pipeline::settings::Settings;
use crate::pitch::{MapParams, Scale, map_to_freq};
use crate::sensor::{LightSource, Reading, SensorReader};
use crate::shared::{DisplayState, InputEvent};
use crate::trigger::{TriggerConfigError, TriggerDetector};

pub struct Conductor<S: LightSource> {
    reader: SensorReader<S>,
    scale: Scale,
    map: MapParams,
    detector: TriggerDetector,
    run: Option<MelodyRun>,
    melody: Melody,
    store: PatternStore,
    settings: Settings,
    patterns: Vec<String>,
    loaded: Option<String>,
    last_reading: Reading,
    last_freq: Option<f32>,
    status: String,
}

impl<S: LightSource> Conductor<S> {
    pub fn new(
        settings: Settings,
        source: S,
        store: PatternStore,
    ) -> Result<Self, TriggerConfigError> {
        let detector = TriggerDetector::new(settings.trigger)?;
        let reader = SensorReader::new(source, settings.alpha);
        let map = MapParams {
            min: settings.min_light,
            max: settings.max_light,
            logarithmic: settings.logarithmic,
            invert: settings.invert,
        };
        let patterns = store.list().unwrap_or_default();
        Ok(Self {
            reader,
            scale: Scale::c_major(),
            map,
            detector,
            run: None,
            melody: Melody::peak_default(),
            store,
            settings,
            patterns,
            loaded: None,
            last_reading: Reading::default(),
            last_freq: None,
            status: String::from("shine a light"),
        })
    }

    /// One control-loop tick. Ordering is the whole arbitration story:
    /// classify the reading first, then either advance the melody run OR
    /// drive the ambient tone, never both in one tick.
    pub fn tick(&mut self, dt: f32) -> anyhow::Result<Vec<AudioCommand>> {
        let mut cmds = Vec::new();

        let reading = self.reader.sample()?;
        self.last_reading = reading;

        if self.detector.observe(reading.raw) {
            // mute the ambient tone right away; the run claims the output on
            // the next tick
            cmds.push(AudioCommand::Silence);
            self.last_freq = None;
            self.run = Some(MelodyRun::new(
                self.melody.clone(),
                self.settings.bpm,
                self.settings.melody_level,
            ));
            self.status = format!("peak at {}: {}", reading.raw, self.melody.name());
            return Ok(cmds);
        }

        if let Some(run) = self.run.as_mut() {
            run.tick(dt, &mut cmds);
            if run.is_finished() {
                self.run = None;
                self.detector.complete_melody();
                self.status = String::from("melody done, move the light away to re-arm");
            }
            return Ok(cmds);
        }

        let freq = map_to_freq(&self.scale, self.map, reading.raw);
        self.last_freq = Some(freq);
        cmds.push(AudioCommand::SetFrequency(freq));
        cmds.push(AudioCommand::SetLevel(self.settings.ambient_level));
        Ok(cmds)
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::SavePattern => self.save_pattern(),
            InputEvent::CyclePattern => self.cycle_pattern(),
            InputEvent::DeletePattern => self.delete_loaded(),
            InputEvent::ResetMelody => {
                self.melody = Melody::peak_default();
                self.loaded = None;
                self.status = String::from("override melody reset");
            }
            InputEvent::RefreshPatterns => {
                self.refresh_patterns();
                self.status = format!("{} pattern(s) on disk", self.patterns.len());
            }
            // sensor knob and quit are handled upstream
            InputEvent::LightDelta(_)
            | InputEvent::LightFlash
            | InputEvent::LightDim
            | InputEvent::Quit => {}
        }
    }

    fn save_pattern(&mut self) {
        let name = self.next_free_name();
        let mut metadata = Metadata::new();
        metadata.insert("bpm".into(), json!(self.settings.bpm));
        metadata.insert("source".into(), json!(self.melody.name()));
        let events = self
            .melody
            .to_note_events(self.settings.bpm, self.settings.melody_level);

        match self.store.save(&name, &metadata, &events) {
            Ok(()) => {
                self.refresh_patterns();
                self.status = format!("saved `{name}` ({} events)", events.len());
            }
            Err(e) => self.status = format!("save failed: {e}"),
        }
    }

    fn cycle_pattern(&mut self) {
        self.refresh_patterns();
        if self.patterns.is_empty() {
            self.status = String::from("no patterns on disk");
            return;
        }
        let next = match &self.loaded {
            Some(current) => {
                let idx = self.patterns.iter().position(|n| n == current);
                let next_idx = idx.map_or(0, |i| (i + 1) % self.patterns.len());
                self.patterns[next_idx].clone()
            }
            None => self.patterns[0].clone(),
        };
        match self.store.load(&next) {
            Ok((metadata, events)) => {
                let bpm = metadata
                    .get("bpm")
                    .and_then(|v| v.as_f64())
                    .map_or(self.settings.bpm, |b| b as f32);
                self.melody = Melody::from_note_events(next.clone(), &events, bpm);
                self.loaded = Some(next.clone());
                self.status = format!("loaded `{next}` ({} events)", events.len());
            }
            Err(e @ StoreError::NotFound(_)) => {
                // listing raced a delete; drop the stale entry
                self.refresh_patterns();
                self.status = format!("load failed: {e}");
            }
            Err(e) => self.status = format!("load failed: {e}"),
        }
    }

    fn delete_loaded(&mut self) {
        let Some(name) = self.loaded.clone() else {
            self.status = String::from("no pattern loaded");
            return;
        };
        match self.store.delete(&name) {
            Ok(()) => {
                self.melody = Melody::peak_default();
                self.loaded = None;
                self.refresh_patterns();
                self.status = format!("deleted `{name}`");
            }
            Err(e) => self.status = format!("delete failed: {e}"),
        }
    }

    fn refresh_patterns(&mut self) {
        match self.store.list() {
            Ok(names) => self.patterns = names,
            Err(e) => self.status = format!("listing failed: {e}"),
        }
    }

    fn next_free_name(&self) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("pattern-{n}");
            if !self.store.exists(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn is_active(&self) -> bool {
        self.detector.is_active()
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            raw: self.last_reading.raw,
            norm: self.last_reading.norm,
            freq_hz: self.last_freq,
            armed: self.detector.is_armed(),
            active: self.detector.is_active(),
            melody_name: self.melody.name().to_string(),
            loaded_pattern: self.loaded.clone(),
            patterns: self.patterns.clone(),
            bpm: self.settings.bpm,
            status: self.status.clone(),
        }
    }
}
