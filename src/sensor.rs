use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use crate::shared::RAW_MAX;

/// One raw photosensor sample. A hardware fault here is fatal; the loop
/// does not recover from a sensor that stops answering.
pub trait LightSource {
    fn read_raw(&mut self) -> anyhow::Result<u16>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reading {
    pub raw: u16,
    /// EMA-filtered normalized value, always in 0.0..=1.0.
    pub norm: f32,
}

/// Desktop stand-in for the ADC: a raw level behind an atomic, shared with
/// the input layer so key presses can move the "light".
pub struct SimulatedLight {
    level: Arc<AtomicU16>,
}

impl SimulatedLight {
    pub fn new(initial: u16) -> (Self, Arc<AtomicU16>) {
        let level = Arc::new(AtomicU16::new(initial));
        (Self { level: level.clone() }, level)
    }
}

impl LightSource for SimulatedLight {
    fn read_raw(&mut self) -> anyhow::Result<u16> {
        Ok(self.level.load(Ordering::Relaxed))
    }
}

/// Wraps a source with exponential-moving-average smoothing:
/// `filtered = (1-alpha) * filtered + alpha * (raw / RAW_MAX)`.
/// Filter state starts at 0 and belongs to this reader alone.
pub struct SensorReader<S: LightSource> {
    source: S,
    alpha: f32,
    filtered: f32,
}

impl<S: LightSource> SensorReader<S> {
    pub fn new(source: S, alpha: f32) -> Self {
        Self {
            source,
            alpha: alpha.clamp(f32::EPSILON, 1.0),
            filtered: 0.0,
        }
    }

    pub fn sample(&mut self) -> anyhow::Result<Reading> {
        let raw = self.source.read_raw()?;
        let norm = raw as f32 / RAW_MAX as f32;
        self.filtered = (1.0 - self.alpha) * self.filtered + self.alpha * norm;
        Ok(Reading {
            raw,
            norm: self.filtered.clamp(0.0, 1.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn normalized_is_raw_over_max() {
        let (light, knob) = SimulatedLight::new(RAW_MAX);
        // alpha = 1.0 disables smoothing
        let mut reader = SensorReader::new(light, 1.0);
        assert_eq!(reader.sample().unwrap().norm, 1.0);

        knob.store(0, Ordering::Relaxed);
        assert_eq!(reader.sample().unwrap().norm, 0.0);

        knob.store(RAW_MAX / 2, Ordering::Relaxed);
        let r = reader.sample().unwrap();
        assert!((r.norm - 0.5).abs() < 1e-3);
    }

    #[test]
    fn ema_starts_at_zero_and_converges() {
        let (light, _knob) = SimulatedLight::new(RAW_MAX);
        let mut reader = SensorReader::new(light, 0.2);

        // first sample: (1-0.2)*0 + 0.2*1.0
        let first = reader.sample().unwrap();
        assert!((first.norm - 0.2).abs() < 1e-6);

        // second: 0.8*0.2 + 0.2*1.0 = 0.36
        let second = reader.sample().unwrap();
        assert!((second.norm - 0.36).abs() < 1e-6);

        for _ in 0..200 {
            reader.sample().unwrap();
        }
        assert!(reader.sample().unwrap().norm > 0.99);
    }

    #[test]
    fn smoothing_state_is_per_reader() {
        let (a, _) = SimulatedLight::new(RAW_MAX);
        let (b, _) = SimulatedLight::new(RAW_MAX);
        let mut warm = SensorReader::new(a, 0.5);
        for _ in 0..50 {
            warm.sample().unwrap();
        }
        let mut cold = SensorReader::new(b, 0.5);
        assert!(cold.sample().unwrap().norm < warm.sample().unwrap().norm);
    }
}
