use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which side of the range counts as the peak. An inverted photosensor reads
/// LOW when bright, so the stock build triggers on `Low`; a non-inverted
/// sensor build flips this to `High`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakDirection {
    Low,
    High,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Reading at the center of the peak zone.
    pub peak: u16,
    /// Widens the zone: `Low` accepts raw <= peak + margin.
    pub margin: u16,
    /// Boundary the reading must cross, away from the peak, before the
    /// detector may re-arm.
    pub rearm: u16,
    pub direction: PeakDirection,
}

#[derive(Debug, Error, PartialEq)]
pub enum TriggerConfigError {
    #[error("re-arm boundary {rearm} does not clear the peak zone edge {zone_edge}; the detector could never re-arm")]
    Overlap { rearm: u16, zone_edge: u16 },
}

impl TriggerConfig {
    pub fn validate(&self) -> Result<(), TriggerConfigError> {
        let zone_edge = self.zone_edge();
        let clears = match self.direction {
            PeakDirection::Low => self.rearm > zone_edge,
            PeakDirection::High => self.rearm < zone_edge,
        };
        if clears {
            Ok(())
        } else {
            Err(TriggerConfigError::Overlap {
                rearm: self.rearm,
                zone_edge,
            })
        }
    }

    fn zone_edge(&self) -> u16 {
        match self.direction {
            PeakDirection::Low => self.peak.saturating_add(self.margin),
            PeakDirection::High => self.peak.saturating_sub(self.margin),
        }
    }

    fn in_peak_zone(&self, raw: u16) -> bool {
        match self.direction {
            PeakDirection::Low => raw <= self.zone_edge(),
            PeakDirection::High => raw >= self.zone_edge(),
        }
    }

    fn past_rearm(&self, raw: u16) -> bool {
        match self.direction {
            PeakDirection::Low => raw >= self.rearm,
            PeakDirection::High => raw <= self.rearm,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerState {
    pub armed: bool,
    pub active: bool,
    pub was_in_peak_zone: bool,
}

impl Default for TriggerState {
    fn default() -> Self {
        Self {
            armed: true,
            active: false,
            was_in_peak_zone: false,
        }
    }
}

/// One-shot peak trigger with hysteresis.
///
/// Armed-Idle -> Firing (rising edge into the zone) -> Unarmed-Idle
/// (melody running, then waiting to get away from the peak) -> Armed-Idle.
/// Sitting inside the zone never re-fires; only a fresh entry does.
pub struct TriggerDetector {
    config: TriggerConfig,
    state: TriggerState,
}

impl TriggerDetector {
    pub fn new(config: TriggerConfig) -> Result<Self, TriggerConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: TriggerState::default(),
        })
    }

    /// Feed one tick's reading. Returns true exactly when the melody should
    /// fire. The edge memory updates every tick no matter the state, so the
    /// rising-edge check is always against the previous tick.
    pub fn observe(&mut self, raw: u16) -> bool {
        let in_zone = self.config.in_peak_zone(raw);

        let fired =
            self.state.armed && !self.state.active && !self.state.was_in_peak_zone && in_zone;
        if fired {
            self.state.armed = false;
            self.state.active = true;
        }

        // re-arm only once the melody is over AND we've moved clearly away
        if !self.state.armed && !self.state.active && self.config.past_rearm(raw) {
            self.state.armed = true;
        }

        self.state.was_in_peak_zone = in_zone;
        fired
    }

    /// Completion signal from the melody run's owner.
    pub fn complete_melody(&mut self) {
        self.state.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn is_armed(&self) -> bool {
        self.state.armed
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }
}
