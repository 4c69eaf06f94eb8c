//! Chroma extraction modules
//!
//! Fold constant-Q magnitudes into a 12-bin pitch-class distribution:
//! - Octave folding of CQT bins
//! - Normalization strategies (L1, L2) and active pitch-class extraction

pub mod extractor;
pub mod normalization;

pub use extractor::{extract_chroma, fold_frame, ChromaNorm};
pub use normalization::{active_pitch_classes, mean_chroma, normalize_l1, normalize_l2};

/// Number of pitch classes (C = 0, ..., B = 11)
pub const N_PITCH_CLASSES: usize = 12;

/// Octave-folded energy per pitch class for one frame
pub type ChromaVector = [f32; N_PITCH_CLASSES];
