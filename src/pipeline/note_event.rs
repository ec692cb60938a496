use serde::{Deserialize, Serialize};

/// One timestamped note in a stored pattern. Field names are the on-disk
/// format; don't rename without migrating the pattern files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub timestamp_ms: u64,
    pub pitch: u8,
    /// Strike strength, 0.0..=1.0.
    pub magnitude: f32,
    // older pattern files don't carry a channel
    #[serde(default)]
    pub channel: u32,
}

impl NoteEvent {
    pub fn new(timestamp_ms: u64, pitch: u8, magnitude: f32) -> Self {
        Self {
            timestamp_ms,
            pitch,
            magnitude: magnitude.clamp(0.0, 1.0),
            channel: 0,
        }
    }

    pub fn on_channel(mut self, channel: u32) -> Self {
        self.channel = channel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_exact_field_names() {
        let ev = NoteEvent::new(1000, 60, 0.8).on_channel(2);
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["timestamp_ms"], 1000);
        assert_eq!(json["pitch"], 60);
        assert_eq!(json["channel"], 2);
        assert!((json["magnitude"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn channel_defaults_to_zero_when_missing() {
        let ev: NoteEvent =
            serde_json::from_str(r#"{"timestamp_ms": 5, "pitch": 64, "magnitude": 0.5}"#).unwrap();
        assert_eq!(ev.channel, 0);
    }

    #[test]
    fn magnitude_is_clamped_at_construction() {
        assert_eq!(NoteEvent::new(0, 60, 1.5).magnitude, 1.0);
        assert_eq!(NoteEvent::new(0, 60, -0.5).magnitude, 0.0);
    }
}
