//! Analysis result types
//!
//! Explicit result structs handed back by the entry operations:
//! spectral frames, chord sequences, note events and whole-run metadata.

pub mod result;
