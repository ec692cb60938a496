// Instrument settings, persisted so a build can be tuned for its sensor:
// <base_dir>/.lumitone/config.json
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trigger::{PeakDirection, TriggerConfig, TriggerConfigError};

const LUMITONE_DIR: &str = ".lumitone";
const CONFIG_FILE: &str = "config.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// EMA smoothing factor, 0 < alpha <= 1.
    pub alpha: f32,
    /// Raw-reading range the pitch mapping spans.
    pub min_light: u16,
    pub max_light: u16,
    pub logarithmic: bool,
    /// Low readings -> high notes (inverted photosensor).
    pub invert: bool,
    pub bpm: f32,
    pub tick_ms: u64,
    pub ambient_level: f32,
    pub melody_level: f32,
    pub trigger: TriggerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        // the stock inverted-sensor build
        Self {
            alpha: 0.2,
            min_light: 2000,
            max_light: 40_000,
            logarithmic: true,
            invert: true,
            bpm: 112.0,
            tick_ms: 50,
            ambient_level: 0.5,
            melody_level: 0.5,
            trigger: TriggerConfig {
                peak: 2000,
                margin: 200,
                rearm: 6000,
                direction: PeakDirection::Low,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("alpha must be in (0, 1], got {0}")]
    Alpha(f32),
    #[error("light range {min}..{max} is invalid (need 1 <= min < max)")]
    LightRange { min: u16, max: u16 },
    #[error("bpm must be positive, got {0}")]
    Bpm(f32),
    #[error("tick interval must be nonzero")]
    Tick,
    #[error("output level {0} outside 0..=1")]
    Level(f32),
    #[error(transparent)]
    Trigger(#[from] TriggerConfigError),
}

impl Settings {
    /// Startup gate: a bad config is fatal before the loop ever runs.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(SettingsError::Alpha(self.alpha));
        }
        // min >= 1 keeps ln(min) defined in log mode
        if self.min_light < 1 || self.min_light >= self.max_light {
            return Err(SettingsError::LightRange {
                min: self.min_light,
                max: self.max_light,
            });
        }
        if !(self.bpm > 0.0) {
            return Err(SettingsError::Bpm(self.bpm));
        }
        if self.tick_ms == 0 {
            return Err(SettingsError::Tick);
        }
        for level in [self.ambient_level, self.melody_level] {
            if !(0.0..=1.0).contains(&level) {
                return Err(SettingsError::Level(level));
            }
        }
        self.trigger.validate()?;
        Ok(())
    }
}

// <base_dir>/.lumitone/config.json
fn config_file_path(base_dir: &Path) -> PathBuf {
    base_dir.join(LUMITONE_DIR).join(CONFIG_FILE)
}

/// Load settings, materializing the default file on first run so there's
/// something on disk to tune.
pub fn load_or_init(base_dir: &Path) -> anyhow::Result<Settings> {
    let path = config_file_path(base_dir);
    match std::fs::read_to_string(&path) {
        Ok(data) => Ok(serde_json::from_str(&data)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let settings = Settings::default();
            save(base_dir, &settings)?;
            Ok(settings)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn save(base_dir: &Path, settings: &Settings) -> anyhow::Result<()> {
    let path = config_file_path(base_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn first_run_materializes_config_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_or_init(dir.path()).unwrap();
        assert!(config_file_path(dir.path()).exists());

        let again = load_or_init(dir.path()).unwrap();
        assert_eq!(again.bpm, settings.bpm);
        assert_eq!(again.trigger.rearm, settings.trigger.rearm);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"bpm": 90.0}"#).unwrap();

        let settings = load_or_init(dir.path()).unwrap();
        assert_eq!(settings.bpm, 90.0);
        assert_eq!(settings.alpha, Settings::default().alpha);
    }

    #[test]
    fn validation_catches_bad_fields() {
        let s = Settings {
            alpha: 0.0,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(SettingsError::Alpha(_))));

        let s = Settings {
            min_light: 0,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(SettingsError::LightRange { .. })));

        let s = Settings {
            min_light: 5000,
            max_light: 5000,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(SettingsError::LightRange { .. })));

        let s = Settings {
            melody_level: 1.5,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(SettingsError::Level(_))));

        let mut s = Settings::default();
        s.trigger.rearm = 2100; // inside the peak zone
        assert!(matches!(s.validate(), Err(SettingsError::Trigger(_))));
    }
}
