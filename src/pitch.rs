use thiserror::Error;

// C3..C6, the three-octave run the instrument steps through.
pub const C_MAJOR_MIDI: [u8; 22] = [
    48, 50, 52, 53, 55, 57, 59, // C3..B3
    60, 62, 64, 65, 67, 69, 71, // C4..B4
    72, 74, 76, 77, 79, 81, 83, // C5..B5
    84, // C6
];

#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("scale has no notes")]
    Empty,
    #[error("scale notes must be strictly ascending (violated at index {0})")]
    NotAscending(usize),
}

/// An ordered run of MIDI notes, lowest first. Immutable once built.
#[derive(Clone, Debug)]
pub struct Scale {
    notes: Vec<u8>,
}

impl Scale {
    pub fn new(notes: Vec<u8>) -> Result<Self, ScaleError> {
        if notes.is_empty() {
            return Err(ScaleError::Empty);
        }
        for i in 1..notes.len() {
            if notes[i] <= notes[i - 1] {
                return Err(ScaleError::NotAscending(i));
            }
        }
        Ok(Self { notes })
    }

    pub fn c_major() -> Self {
        Self {
            notes: C_MAJOR_MIDI.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn note_at(&self, idx: usize) -> u8 {
        self.notes[idx.min(self.notes.len() - 1)]
    }
}

/// How a raw light value lands on the scale.
#[derive(Clone, Copy, Debug)]
pub struct MapParams {
    pub min: u16,
    pub max: u16,
    pub logarithmic: bool,
    /// true = low readings map to the top of the scale. That matches an
    /// inverted photosensor, where bright light pulls the ADC value down and
    /// should pull the pitch up.
    pub invert: bool,
}

pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * 2f32.powf((note as f32 - 69.0) / 12.0)
}

/// Pick the scale note for a raw value. Values outside min..max clamp to the
/// end notes, never error. Pure: same inputs, same note, no state.
pub fn map_to_note(scale: &Scale, params: MapParams, value: u16) -> u8 {
    let (min, max) = (params.min as f32, params.max as f32);
    let mut t = if params.logarithmic {
        let v = (value as f32).max(1.0);
        (v.ln() - min.ln()) / (max.ln() - min.ln())
    } else {
        (value as f32 - min) / (max - min)
    };
    if params.invert {
        t = 1.0 - t;
    }
    t = t.clamp(0.0, 1.0);
    // round half away from zero; index 1.5 on a 4-note scale goes to 2
    let idx = (t * (scale.len() - 1) as f32).round() as usize;
    scale.note_at(idx)
}

pub fn map_to_freq(scale: &Scale, params: MapParams, value: u16) -> f32 {
    midi_to_freq(map_to_note(scale, params, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_note_scale() -> Scale {
        Scale::new(vec![48, 60, 72, 84]).unwrap()
    }

    fn log_params() -> MapParams {
        MapParams {
            min: 2000,
            max: 40_000,
            logarithmic: true,
            invert: true,
        }
    }

    #[test]
    fn concert_a_is_exact() {
        assert!((midi_to_freq(69) - 440.0).abs() < 1e-4);
        // octave law
        assert!((midi_to_freq(81) - 880.0).abs() < 1e-3);
        assert!((midi_to_freq(57) - 220.0).abs() < 1e-3);
    }

    #[test]
    fn scale_validation() {
        assert_eq!(Scale::new(vec![]).unwrap_err(), ScaleError::Empty);
        assert_eq!(
            Scale::new(vec![60, 60]).unwrap_err(),
            ScaleError::NotAscending(1)
        );
        assert_eq!(
            Scale::new(vec![60, 62, 59]).unwrap_err(),
            ScaleError::NotAscending(2)
        );
        assert!(Scale::new(vec![60]).is_ok());
    }

    #[test]
    fn min_maps_to_highest_note_when_inverted() {
        let scale = four_note_scale();
        assert_eq!(map_to_note(&scale, log_params(), 2000), 84);
        assert_eq!(map_to_note(&scale, log_params(), 40_000), 48);
    }

    #[test]
    fn out_of_range_values_clamp() {
        let scale = four_note_scale();
        for params in [
            log_params(),
            MapParams {
                logarithmic: false,
                ..log_params()
            },
        ] {
            assert_eq!(map_to_note(&scale, params, 0), 84);
            assert_eq!(map_to_note(&scale, params, 1999), 84);
            assert_eq!(map_to_note(&scale, params, 40_001), 48);
            assert_eq!(map_to_note(&scale, params, u16::MAX), 48);
        }
    }

    #[test]
    fn uninverted_mapping_runs_the_other_way() {
        let scale = four_note_scale();
        let params = MapParams {
            invert: false,
            ..log_params()
        };
        assert_eq!(map_to_note(&scale, params, 2000), 48);
        assert_eq!(map_to_note(&scale, params, 40_000), 84);
    }

    #[test]
    fn geometric_midpoint_rounds_up() {
        // sqrt(2000 * 40000) ~= 8944: t = 0.5, inverted stays 0.5,
        // idx = round(1.5) = 2 -> note 72
        let scale = four_note_scale();
        assert_eq!(map_to_note(&scale, log_params(), 8944), 72);
    }

    #[test]
    fn mapping_is_pure() {
        let scale = four_note_scale();
        let params = log_params();
        for value in [0u16, 1500, 8944, 23_000, 60_000] {
            let a = map_to_freq(&scale, params, value);
            let b = map_to_freq(&scale, params, value);
            assert_eq!(a, b);
        }
    }
}
