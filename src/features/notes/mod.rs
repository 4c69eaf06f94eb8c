//! Note event modules
//!
//! - Pitch number / frequency / name conversions
//! - Peak-picking note onset tracker over constant-Q frames

pub mod pitch;
pub mod tracker;

pub use pitch::{hz_to_midi, midi_to_hz, midi_to_name, note_to_hz, pitch_class_name, NOTE_NAMES};
pub use tracker::{detect_note_events, DebounceState, NoteTrackerConfig};
