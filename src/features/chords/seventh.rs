//! Seventh-degree refinement of triad-level chord labels
//!
//! After template matching settles on a major or minor triad, the energy at the
//! flat seventh (root + 10) and major seventh (root + 11) is compared, each
//! relative to the frame's peak pitch class. A seventh is appended only when
//! one degree clears the threshold and beats the other by the margin.

use serde::{Deserialize, Serialize};

use crate::features::chroma::ChromaVector;

/// Seventh appended to a triad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seventh {
    /// Flat (minor) seventh, written "7"
    Flat,
    /// Major seventh, written "maj7"
    Major,
}

impl Seventh {
    /// Symbol suffix
    pub const fn suffix(self) -> &'static str {
        match self {
            Seventh::Flat => "7",
            Seventh::Major => "maj7",
        }
    }
}

/// Seventh refinement thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeventhRefinement {
    /// Minimum energy relative to the frame peak (default: 0.35)
    pub threshold: f32,

    /// Factor by which one degree must exceed the other (default: 1.05)
    pub margin: f32,
}

impl Default for SeventhRefinement {
    fn default() -> Self {
        Self {
            threshold: 0.35,
            margin: 1.05,
        }
    }
}

/// Decide whether the frame carries a seventh above `root`
///
/// # Arguments
///
/// * `chroma` - Pitch-class energies (any non-negative scale)
/// * `root` - Root pitch class of the chosen triad
/// * `refinement` - Threshold and margin
///
/// # Returns
///
/// `Some(Seventh)` when one degree dominates, `None` otherwise (including for
/// an all-zero frame).
pub fn detect_seventh(
    chroma: &ChromaVector,
    root: usize,
    refinement: &SeventhRefinement,
) -> Option<Seventh> {
    let peak = chroma.iter().copied().fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return None;
    }

    let flat = chroma[(root + 10) % 12] / peak;
    let major = chroma[(root + 11) % 12] / peak;

    if flat >= refinement.threshold && flat >= major * refinement.margin {
        Some(Seventh::Flat)
    } else if major >= refinement.threshold && major >= flat * refinement.margin {
        Some(Seventh::Major)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chroma(entries: &[(usize, f32)]) -> ChromaVector {
        let mut v = [0.0f32; 12];
        for &(pc, e) in entries {
            v[pc] = e;
        }
        v
    }

    #[test]
    fn test_dominant_seventh() {
        // G B D F
        let v = chroma(&[(7, 1.0), (11, 0.8), (2, 0.9), (5, 0.6)]);
        assert_eq!(detect_seventh(&v, 7, &SeventhRefinement::default()), Some(Seventh::Flat));
    }

    #[test]
    fn test_major_seventh() {
        // D F# A C#
        let v = chroma(&[(2, 1.0), (6, 0.8), (9, 0.9), (1, 0.5)]);
        assert_eq!(detect_seventh(&v, 2, &SeventhRefinement::default()), Some(Seventh::Major));
    }

    #[test]
    fn test_below_threshold() {
        let v = chroma(&[(0, 1.0), (4, 1.0), (7, 1.0), (10, 0.2)]);
        assert_eq!(detect_seventh(&v, 0, &SeventhRefinement::default()), None);
    }

    #[test]
    fn test_ambiguous_degrees() {
        // Both sevenths equally strong: neither wins the margin
        let v = chroma(&[(0, 1.0), (10, 0.5), (11, 0.5)]);
        assert_eq!(detect_seventh(&v, 0, &SeventhRefinement::default()), None);
    }

    #[test]
    fn test_silent_frame() {
        assert_eq!(detect_seventh(&[0.0; 12], 0, &SeventhRefinement::default()), None);
    }
}
