//! Chord quality templates
//!
//! Every quality is a fixed set of semitone offsets from an implicit root.
//! The table is static and read-only; [`QUALITY_PRIORITY`] fixes the order in
//! which qualities are tried, most harmonically specific first, and therefore
//! which quality wins a tie.

use serde::{Deserialize, Serialize};

use crate::features::chroma::{ChromaVector, N_PITCH_CLASSES};

/// Chord quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    /// Major seventh {0, 4, 7, 11}
    Major7,
    /// Minor seventh {0, 3, 7, 10}
    Minor7,
    /// Dominant seventh {0, 4, 7, 10}
    Dominant7,
    /// Major sixth {0, 4, 7, 9}
    Sixth,
    /// Minor sixth {0, 3, 7, 9}
    MinorSixth,
    /// Major triad {0, 4, 7}
    Major,
    /// Minor triad {0, 3, 7}
    Minor,
    /// Suspended fourth {0, 5, 7}
    Sus4,
    /// Suspended second {0, 2, 7}
    Sus2,
    /// Augmented triad {0, 4, 8}
    Augmented,
    /// Half-diminished seventh {0, 3, 6, 10}
    HalfDiminished7,
    /// Diminished seventh {0, 3, 6, 9}
    Diminished7,
    /// Diminished triad {0, 3, 6}
    Diminished,
    /// Power chord {0, 7}
    Power,
}

/// Every quality, in tie-break priority order
pub const QUALITY_PRIORITY: [Quality; 14] = [
    Quality::Major7,
    Quality::Minor7,
    Quality::Dominant7,
    Quality::Sixth,
    Quality::MinorSixth,
    Quality::Major,
    Quality::Minor,
    Quality::Sus4,
    Quality::Sus2,
    Quality::Augmented,
    Quality::HalfDiminished7,
    Quality::Diminished7,
    Quality::Diminished,
    Quality::Power,
];

/// Major and minor triads only
pub const TRIAD_QUALITIES: [Quality; 2] = [Quality::Major, Quality::Minor];

impl Quality {
    /// Semitone offsets from the root
    pub const fn intervals(self) -> &'static [usize] {
        match self {
            Quality::Major7 => &[0, 4, 7, 11],
            Quality::Minor7 => &[0, 3, 7, 10],
            Quality::Dominant7 => &[0, 4, 7, 10],
            Quality::Sixth => &[0, 4, 7, 9],
            Quality::MinorSixth => &[0, 3, 7, 9],
            Quality::Major => &[0, 4, 7],
            Quality::Minor => &[0, 3, 7],
            Quality::Sus4 => &[0, 5, 7],
            Quality::Sus2 => &[0, 2, 7],
            Quality::Augmented => &[0, 4, 8],
            Quality::HalfDiminished7 => &[0, 3, 6, 10],
            Quality::Diminished7 => &[0, 3, 6, 9],
            Quality::Diminished => &[0, 3, 6],
            Quality::Power => &[0, 7],
        }
    }

    /// Symbol suffix appended to the root name (e.g. "m7" in "Am7")
    pub const fn suffix(self) -> &'static str {
        match self {
            Quality::Major7 => "maj7",
            Quality::Minor7 => "m7",
            Quality::Dominant7 => "7",
            Quality::Sixth => "6",
            Quality::MinorSixth => "m6",
            Quality::Major => "",
            Quality::Minor => "m",
            Quality::Sus4 => "sus4",
            Quality::Sus2 => "sus2",
            Quality::Augmented => "aug",
            Quality::HalfDiminished7 => "m7b5",
            Quality::Diminished7 => "dim7",
            Quality::Diminished => "dim",
            Quality::Power => "5",
        }
    }

    /// Human-readable quality name
    pub const fn description(self) -> &'static str {
        match self {
            Quality::Major7 => "Major Seventh",
            Quality::Minor7 => "Minor Seventh",
            Quality::Dominant7 => "Dominant Seventh",
            Quality::Sixth => "Major Sixth",
            Quality::MinorSixth => "Minor Sixth",
            Quality::Major => "Major",
            Quality::Minor => "Minor",
            Quality::Sus4 => "Suspended Fourth",
            Quality::Sus2 => "Suspended Second",
            Quality::Augmented => "Augmented",
            Quality::HalfDiminished7 => "Half-Diminished Seventh",
            Quality::Diminished7 => "Diminished Seventh",
            Quality::Diminished => "Diminished",
            Quality::Power => "Power Chord",
        }
    }

    /// Whether this is a plain major or minor triad
    pub const fn is_triad(self) -> bool {
        matches!(self, Quality::Major | Quality::Minor)
    }
}

/// A quality rotated onto a concrete root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordTemplate {
    /// Root pitch class (0-11)
    pub root: usize,
    /// Chord quality
    pub quality: Quality,
}

impl ChordTemplate {
    /// Rotate `quality` onto `root` (taken modulo 12)
    pub fn new(root: usize, quality: Quality) -> Self {
        Self {
            root: root % N_PITCH_CLASSES,
            quality,
        }
    }

    /// Pitch classes of the chord, in interval order
    pub fn pitch_classes(&self) -> impl Iterator<Item = usize> + '_ {
        self.quality
            .intervals()
            .iter()
            .map(move |&i| (self.root + i) % N_PITCH_CLASSES)
    }

    /// Pitch-class set as a 12-bit mask (bit `pc` set for every chord tone)
    pub fn mask(&self) -> u16 {
        self.pitch_classes().fold(0u16, |mask, pc| mask | (1 << pc))
    }

    /// Unit-energy indicator vector (1.0 on chord tones, 0.0 elsewhere)
    pub fn indicator(&self) -> ChromaVector {
        let mut v = [0.0f32; N_PITCH_CLASSES];
        for pc in self.pitch_classes() {
            v[pc] = 1.0;
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_covers_every_quality_once() {
        for (i, a) in QUALITY_PRIORITY.iter().enumerate() {
            for b in QUALITY_PRIORITY.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(QUALITY_PRIORITY[0], Quality::Major7);
        assert_eq!(QUALITY_PRIORITY[13], Quality::Power);
    }

    #[test]
    fn test_intervals_start_at_root() {
        for q in QUALITY_PRIORITY {
            assert_eq!(q.intervals()[0], 0);
            assert!(q.intervals().iter().all(|&i| i < 12));
        }
    }

    #[test]
    fn test_rotation_wraps() {
        // A minor: A C E
        let t = ChordTemplate::new(9, Quality::Minor);
        let pcs: Vec<usize> = t.pitch_classes().collect();
        assert_eq!(pcs, vec![9, 0, 4]);
        assert_eq!(t.mask(), (1 << 9) | 1 | (1 << 4));
    }

    #[test]
    fn test_indicator() {
        let v = ChordTemplate::new(0, Quality::Major).indicator();
        assert_eq!(v[0], 1.0);
        assert_eq!(v[4], 1.0);
        assert_eq!(v[7], 1.0);
        assert_eq!(v.iter().sum::<f32>(), 3.0);
    }
}
