//! Feature extraction modules
//!
//! This module contains all feature extraction algorithms:
//! - Spectral frames (constant-Q transform, STFT/mel spectrogram)
//! - Chroma projection
//! - Chord template matching and smoothing
//! - Note event tracking

pub mod chords;
pub mod chroma;
pub mod notes;
pub mod spectral;
