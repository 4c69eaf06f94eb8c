//! Chord recognition modules
//!
//! Match per-frame chroma against static chord templates:
//! - Quality templates and tie-break priority
//! - Cosine / set-overlap template matching
//! - Seventh-degree refinement of triad results
//! - Majority-vote label smoothing

pub mod matcher;
pub mod seventh;
pub mod smoothing;
pub mod templates;

pub use matcher::{
    classify_frame, match_chord, match_pitch_classes, ChordMatcherConfig, QualitySet,
    ScoringMode,
};
pub use seventh::{detect_seventh, Seventh, SeventhRefinement};
pub use smoothing::smooth_labels;
pub use templates::{ChordTemplate, Quality, QUALITY_PRIORITY};

use rayon::prelude::*;

use crate::analysis::result::{ChordLabel, ChordResult};
use crate::error::AnalysisError;
use crate::features::chroma::ChromaVector;

/// Best (root, quality) for one chroma vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordCandidate {
    /// Root pitch class (0-11)
    pub root: usize,
    /// Chord quality
    pub quality: Quality,
    /// Template score (0.0-1.0)
    pub score: f32,
}

impl ChordCandidate {
    /// Result for a frame with no harmonic content: C major at score 0
    pub fn degenerate() -> Self {
        Self {
            root: 0,
            quality: Quality::Major,
            score: 0.0,
        }
    }

    /// Label without seventh refinement
    pub fn label(&self) -> ChordLabel {
        ChordLabel::new(self.root, self.quality)
    }
}

/// Classify every frame and smooth the label sequence
///
/// Frames are matched in parallel and collected in order before smoothing.
///
/// # Arguments
///
/// * `chroma` - One chroma vector per frame
/// * `times` - Frame times in seconds (same length as `chroma`)
/// * `matcher` - Matcher configuration
/// * `smoothing_window` - Majority-vote window in frames (0 or 1 disables)
/// * `frame_hop_s` - Seconds between frames
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `chroma` and `times` differ in length.
pub fn detect_chords(
    chroma: &[ChromaVector],
    times: &[f32],
    matcher: &ChordMatcherConfig,
    smoothing_window: usize,
    frame_hop_s: f32,
) -> Result<ChordResult, AnalysisError> {
    if chroma.len() != times.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "chroma has {} frames but times has {}",
            chroma.len(),
            times.len()
        )));
    }

    log::debug!(
        "Detecting chords: {} frames, scoring={:?}, window={}",
        chroma.len(),
        matcher.scoring,
        smoothing_window
    );

    let (raw_labels, confidences): (Vec<ChordLabel>, Vec<f32>) = chroma
        .par_iter()
        .map(|frame| classify_frame(frame, matcher))
        .unzip();

    let labels = smooth_labels(&raw_labels, smoothing_window);

    let changed = labels
        .iter()
        .zip(&raw_labels)
        .filter(|(a, b)| a != b)
        .count();
    log::debug!("Smoothing relabeled {} of {} frames", changed, labels.len());

    Ok(ChordResult {
        labels,
        times: times.to_vec(),
        confidences,
        raw_labels,
        frame_hop_s,
    })
}
