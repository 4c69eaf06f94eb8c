//! Pitch and note-name conversions
//!
//! Pitch numbers follow MIDI: A4 = 69 = 440 Hz, C4 = 60, 12 steps per octave.

use crate::error::AnalysisError;

/// Pitch-class names, sharps only (C = 0, ..., B = 11)
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Name of pitch class `pc` (taken modulo 12)
pub fn pitch_class_name(pc: usize) -> &'static str {
    NOTE_NAMES[pc % 12]
}

/// Fractional pitch number of a frequency: `69 + 12 * log2(hz / 440)`
pub fn hz_to_midi(hz: f32) -> f32 {
    69.0 + 12.0 * (hz / 440.0).log2()
}

/// Frequency of an integer pitch number
pub fn midi_to_hz(midi: i32) -> f32 {
    440.0 * 2f32.powf((midi - 69) as f32 / 12.0)
}

/// Scientific pitch name of a pitch number (e.g. 69 -> "A4", 61 -> "C#4")
pub fn midi_to_name(midi: i32) -> String {
    let pc = midi.rem_euclid(12) as usize;
    let octave = midi.div_euclid(12) - 1;
    format!("{}{}", NOTE_NAMES[pc], octave)
}

/// Parse a scientific pitch name (e.g. "C2", "A#4", "Bb3", "C-1") to Hz
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` on an unknown letter, accidental or
/// octave.
pub fn note_to_hz(name: &str) -> Result<f32, AnalysisError> {
    note_to_midi(name).map(midi_to_hz)
}

/// Parse a scientific pitch name to its pitch number
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `name` is not a valid note name.
pub fn note_to_midi(name: &str) -> Result<i32, AnalysisError> {
    let invalid = || AnalysisError::InvalidInput(format!("Invalid note name: {:?}", name));

    let mut chars = name.trim().chars();
    let letter = chars.next().ok_or_else(invalid)?;
    let base = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(invalid()),
    };

    let rest = chars.as_str();
    let (accidental, octave) = if let Some(r) = rest.strip_prefix(['#', '♯']) {
        (1, r)
    } else if let Some(r) = rest.strip_prefix(['b', '♭']) {
        (-1, r)
    } else {
        (0, rest)
    };

    let octave: i32 = octave.parse().map_err(|_| invalid())?;
    Ok((octave + 1) * 12 + base + accidental)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hz_to_midi_reference_points() {
        assert!((hz_to_midi(440.0) - 69.0).abs() < 1e-4);
        assert!((hz_to_midi(261.63) - 60.0).abs() < 0.01);
        assert!((hz_to_midi(880.0) - 81.0).abs() < 1e-4);
    }

    #[test]
    fn test_midi_to_name() {
        assert_eq!(midi_to_name(69), "A4");
        assert_eq!(midi_to_name(60), "C4");
        assert_eq!(midi_to_name(61), "C#4");
        assert_eq!(midi_to_name(36), "C2");
        assert_eq!(midi_to_name(0), "C-1");
    }

    #[test]
    fn test_note_to_hz() {
        assert!((note_to_hz("A4").unwrap() - 440.0).abs() < 1e-3);
        assert!((note_to_hz("C2").unwrap() - 65.406).abs() < 1e-2);
        assert!((note_to_hz("C1").unwrap() - 32.703).abs() < 1e-2);
        assert_eq!(note_to_midi("Bb3").unwrap(), note_to_midi("A#3").unwrap());
        assert_eq!(note_to_midi("C-1").unwrap(), 0);
    }

    #[test]
    fn test_note_to_hz_invalid() {
        assert!(note_to_hz("").is_err());
        assert!(note_to_hz("H2").is_err());
        assert!(note_to_hz("C").is_err());
        assert!(note_to_hz("C#x").is_err());
    }

    #[test]
    fn test_name_roundtrip() {
        for midi in 12..120 {
            assert_eq!(note_to_midi(&midi_to_name(midi)).unwrap(), midi);
        }
    }
}
