//! Chord template matching
//!
//! Scores every (root, quality) combination against a pitch-class vector and
//! keeps the best one. Two scoring modes share one search:
//!
//! - **Cosine**: `dot(normalized_input, normalized_template)`
//! - **Set overlap**: `|active ∩ expected| / |expected| - 0.05 * |active - expected|`,
//!   clamped to >= 0, where `active` are the pitch classes holding more than
//!   `active_threshold` of the frame's energy
//!
//! Roots are scanned 0..12 and, within a root, qualities in priority order. A
//! later combination replaces the current best only if it scores more than
//! [`TIE_EPSILON`] higher, so effective ties resolve to the first combination
//! encountered.

use super::seventh::{detect_seventh, SeventhRefinement};
use super::templates::{ChordTemplate, Quality, QUALITY_PRIORITY, TRIAD_QUALITIES};
use super::ChordCandidate;
use crate::analysis::result::ChordLabel;
use crate::features::chroma::{normalize_l2, ChromaVector, N_PITCH_CLASSES};

/// Margin a later combination must beat the current best by
pub const TIE_EPSILON: f32 = 1e-6;

/// Penalty per active pitch class outside the template (set-overlap mode)
pub const EXTRA_NOTE_PENALTY: f32 = 0.05;

/// Scoring mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringMode {
    /// Cosine similarity between the L2-normalized input and template
    #[default]
    Cosine,
    /// Coverage of the thresholded pitch-class set, penalized for extra notes
    SetOverlap,
}

/// Qualities considered during matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualitySet {
    /// Every quality in priority order
    #[default]
    All,
    /// Major and minor triads only (pair with the seventh refinement)
    Triads,
}

impl QualitySet {
    /// Qualities in priority order
    pub fn qualities(self) -> &'static [Quality] {
        match self {
            QualitySet::All => &QUALITY_PRIORITY,
            QualitySet::Triads => &TRIAD_QUALITIES,
        }
    }
}

/// Chord matcher configuration
#[derive(Debug, Clone)]
pub struct ChordMatcherConfig {
    /// Scoring mode (default: Cosine)
    pub scoring: ScoringMode,

    /// Share of total frame energy a pitch class needs to count as active in
    /// set-overlap mode (default: 0.08)
    pub active_threshold: f32,

    /// Qualities to try (default: All)
    pub qualities: QualitySet,

    /// Seventh refinement applied to major/minor triad results
    /// (default: enabled, threshold 0.35, margin 1.05)
    pub seventh: Option<SeventhRefinement>,
}

impl Default for ChordMatcherConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringMode::Cosine,
            active_threshold: 0.08,
            qualities: QualitySet::All,
            seventh: Some(SeventhRefinement::default()),
        }
    }
}

/// Find the best-fitting chord for a pitch-class vector
///
/// # Arguments
///
/// * `chroma` - 12 pitch-class energies, any non-negative scale
/// * `config` - Scoring mode, threshold and quality set
///
/// # Returns
///
/// The best candidate with score in [0, 1]. An all-zero (or entirely inactive)
/// input returns the degenerate candidate: root C, major, score 0.
pub fn match_chord(chroma: &ChromaVector, config: &ChordMatcherConfig) -> ChordCandidate {
    let input = sanitize(chroma);

    match config.scoring {
        ScoringMode::Cosine => {
            let mut normalized = input;
            normalize_l2(&mut normalized);
            if normalized.iter().all(|&x| x == 0.0) {
                return ChordCandidate::degenerate();
            }
            best_candidate(config.qualities, |template| {
                cosine_score(&normalized, template)
            })
        }
        ScoringMode::SetOverlap => {
            let active = active_mask(&input, config.active_threshold);
            if active == 0 {
                return ChordCandidate::degenerate();
            }
            best_candidate(config.qualities, |template| {
                set_overlap_score(active, template.mask())
            })
        }
    }
}

/// Match a frame and apply the seventh refinement
///
/// # Returns
///
/// The chord label in canonical form (see [`ChordLabel::canonical`]) and its
/// confidence (the template score).
pub fn classify_frame(chroma: &ChromaVector, config: &ChordMatcherConfig) -> (ChordLabel, f32) {
    let candidate = match_chord(chroma, config);
    let mut label = candidate.label();

    if candidate.score > 0.0 && candidate.quality.is_triad() {
        if let Some(refinement) = &config.seventh {
            label.seventh = detect_seventh(&sanitize(chroma), candidate.root, refinement);
        }
    }

    (label.canonical(), candidate.score)
}

/// Match a set of pitch classes (e.g. note names picked from a score)
///
/// Duplicates and octave-equivalent values collapse into one pitch class.
/// Uses set-overlap scoring; an empty set returns the degenerate candidate.
pub fn match_pitch_classes(pitch_classes: &[usize]) -> ChordCandidate {
    let active = pitch_classes
        .iter()
        .fold(0u16, |mask, &pc| mask | (1 << (pc % N_PITCH_CLASSES)));
    if active == 0 {
        return ChordCandidate::degenerate();
    }
    best_candidate(QualitySet::All, |template| {
        set_overlap_score(active, template.mask())
    })
}

/// Set-overlap score of an active pitch-class mask against a template mask
pub fn set_overlap_score(active: u16, expected: u16) -> f32 {
    let expected_count = expected.count_ones().max(1) as f32;
    let covered = (active & expected).count_ones() as f32 / expected_count;
    let extras = (active & !expected).count_ones() as f32;
    (covered - EXTRA_NOTE_PENALTY * extras).max(0.0)
}

/// Pitch classes holding more than `threshold` of the vector's total energy
pub fn active_mask(chroma: &ChromaVector, threshold: f32) -> u16 {
    let total: f32 = chroma.iter().sum();
    if total <= 0.0 {
        return 0;
    }
    chroma
        .iter()
        .enumerate()
        .filter(|(_, x)| **x / total > threshold)
        .fold(0u16, |mask, (pc, _)| mask | (1 << pc))
}

fn cosine_score(normalized: &ChromaVector, template: &ChordTemplate) -> f32 {
    let intervals = template.quality.intervals();
    let dot: f32 = template.pitch_classes().map(|pc| normalized[pc]).sum();
    (dot / (intervals.len() as f32).sqrt()).clamp(0.0, 1.0)
}

fn best_candidate<F>(qualities: QualitySet, score: F) -> ChordCandidate
where
    F: Fn(&ChordTemplate) -> f32,
{
    let mut best: Option<ChordCandidate> = None;

    for root in 0..N_PITCH_CLASSES {
        for &quality in qualities.qualities() {
            let template = ChordTemplate::new(root, quality);
            let s = score(&template);
            let replace = match &best {
                None => true,
                Some(current) => s > current.score + TIE_EPSILON,
            };
            if replace {
                best = Some(ChordCandidate {
                    root,
                    quality,
                    score: s,
                });
            }
        }
    }

    best.unwrap_or_else(ChordCandidate::degenerate)
}

/// Replace negative and non-finite energies with zero
fn sanitize(chroma: &ChromaVector) -> ChromaVector {
    let mut out = *chroma;
    for x in out.iter_mut() {
        if !x.is_finite() || *x < 0.0 {
            *x = 0.0;
        }
    }
    out
}
