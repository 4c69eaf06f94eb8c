//! Analysis result types

use serde::{Deserialize, Serialize};

use crate::features::chords::{Quality, Seventh};
use crate::features::notes::pitch::pitch_class_name;
use crate::features::spectral::TransformKind;

/// Time-frequency matrix in decibels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralResult {
    /// Transform that produced the frames
    pub kind: TransformKind,

    /// One row per frame, one value per bin (dB, floored at -120)
    pub frames: Vec<Vec<f32>>,

    /// Frame times in seconds
    pub times: Vec<f32>,

    /// Center frequency of every bin in Hz
    pub freqs: Vec<f32>,
}

impl SpectralResult {
    /// Number of frames
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of frequency bins
    pub fn n_bins(&self) -> usize {
        self.freqs.len()
    }
}

/// Chord label: root, quality and optional appended seventh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChordLabel {
    /// Root pitch class (0 = C, ..., 11 = B)
    pub root: usize,

    /// Template quality
    pub quality: Quality,

    /// Seventh added by the refinement pass (major/minor triads only)
    pub seventh: Option<Seventh>,
}

impl ChordLabel {
    /// Label without a refined seventh
    pub fn new(root: usize, quality: Quality) -> Self {
        Self {
            root: root % 12,
            quality,
            seventh: None,
        }
    }

    /// Fold a refined seventh into the matching seventh-chord quality
    ///
    /// Major + flat seventh is `Dominant7`, major + major seventh is `Major7`,
    /// minor + flat seventh is `Minor7`. Only minor + major seventh keeps the
    /// `seventh` field, so equal symbols always compare equal.
    pub fn canonical(self) -> Self {
        let quality = match (self.quality, self.seventh) {
            (Quality::Major, Some(Seventh::Flat)) => Quality::Dominant7,
            (Quality::Major, Some(Seventh::Major)) => Quality::Major7,
            (Quality::Minor, Some(Seventh::Flat)) => Quality::Minor7,
            _ => return self,
        };
        Self::new(self.root, quality)
    }

    /// Chord symbol (e.g., "C", "Am7", "G7", "Dmaj7", "F#sus4")
    ///
    /// # Example
    ///
    /// ```
    /// use stratum_chords::analysis::result::ChordLabel;
    /// use stratum_chords::features::chords::{Quality, Seventh};
    ///
    /// assert_eq!(ChordLabel::new(0, Quality::Major).symbol(), "C");
    /// assert_eq!(ChordLabel::new(6, Quality::Sus4).symbol(), "F#sus4");
    ///
    /// let mut label = ChordLabel::new(9, Quality::Minor);
    /// label.seventh = Some(Seventh::Flat);
    /// assert_eq!(label.symbol(), "Am7");
    /// ```
    pub fn symbol(&self) -> String {
        let seventh = self.seventh.map(Seventh::suffix).unwrap_or("");
        format!(
            "{}{}{}",
            pitch_class_name(self.root),
            self.quality.suffix(),
            seventh
        )
    }

    /// Long-form name (e.g., "A Minor Seventh")
    pub fn description(&self) -> String {
        let name = pitch_class_name(self.root);
        match (self.quality, self.seventh) {
            (Quality::Major, Some(Seventh::Flat)) => format!("{} Dominant Seventh", name),
            (Quality::Major, Some(Seventh::Major)) => format!("{} Major Seventh", name),
            (Quality::Minor, Some(Seventh::Flat)) => format!("{} Minor Seventh", name),
            (Quality::Minor, Some(Seventh::Major)) => format!("{} Minor Major Seventh", name),
            (quality, _) => format!("{} {}", name, quality.description()),
        }
    }

    /// Pitch classes of the chord, root first (including a refined seventh)
    pub fn pitch_classes(&self) -> Vec<usize> {
        let mut pcs: Vec<usize> = self
            .quality
            .intervals()
            .iter()
            .map(|&i| (self.root + i) % 12)
            .collect();
        match self.seventh {
            Some(Seventh::Flat) => pcs.push((self.root + 10) % 12),
            Some(Seventh::Major) => pcs.push((self.root + 11) % 12),
            None => {}
        }
        pcs
    }
}

impl std::fmt::Display for ChordLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.symbol())
    }
}

/// Per-frame chord sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChordResult {
    /// Smoothed labels, one per frame
    pub labels: Vec<ChordLabel>,

    /// Frame times in seconds
    pub times: Vec<f32>,

    /// Template score of each frame's raw match, in [0, 1]
    pub confidences: Vec<f32>,

    /// Labels before smoothing
    pub raw_labels: Vec<ChordLabel>,

    /// Seconds between frames (hop length / sample rate)
    pub frame_hop_s: f32,
}

impl ChordResult {
    /// Number of frames
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if there are no frames
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Smoothed labels as chord symbols
    pub fn symbols(&self) -> Vec<String> {
        self.labels.iter().map(ChordLabel::symbol).collect()
    }

    /// Label with the most frames (earliest first occurrence on ties)
    pub fn dominant_label(&self) -> Option<ChordLabel> {
        let mut counts: Vec<(ChordLabel, usize)> = Vec::new();
        for label in &self.labels {
            match counts.iter_mut().find(|(seen, _)| seen == label) {
                Some((_, count)) => *count += 1,
                None => counts.push((*label, 1)),
            }
        }
        let mut best: Option<(ChordLabel, usize)> = None;
        for (label, count) in counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label)
    }
}

/// Where a note event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteSource {
    /// Peak picked from a constant-Q frame
    Cqt,
}

/// Discrete note onset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Onset time in seconds
    pub time: f32,

    /// Pitch number (A4 = 69)
    pub midi: i32,

    /// Scientific pitch name (e.g., "A4")
    pub name: String,

    /// Center frequency of the detected bin in Hz
    pub frequency: f32,

    /// Level above the activation threshold, scaled to [0, 1]
    pub velocity: f32,

    /// Detector that produced the event
    pub source: NoteSource,
}

/// Chronologically sorted note events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteEventList(pub Vec<NoteEvent>);

impl NoteEventList {
    /// Number of events
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no notes were detected
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in time order
    pub fn iter(&self) -> std::slice::Iter<'_, NoteEvent> {
        self.0.iter()
    }

    /// Events of one pitch, in time order
    pub fn for_pitch(&self, midi: i32) -> impl Iterator<Item = &NoteEvent> + '_ {
        self.0.iter().filter(move |e| e.midi == midi)
    }
}

impl<'a> IntoIterator for &'a NoteEventList {
    type Item = &'a NoteEvent;
    type IntoIter = std::slice::Iter<'a, NoteEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Single chord for a whole signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackChord {
    /// Best-fitting chord of the averaged chroma
    pub chord: ChordLabel,

    /// Template score (0.0-1.0)
    pub confidence: f32,

    /// Names of the active pitch classes
    pub notes: Vec<String>,
}

/// Complete analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Display spectrogram
    pub spectrum: SpectralResult,

    /// Per-frame chords
    pub chords: ChordResult,

    /// Note onsets
    pub notes: NoteEventList,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

/// Analysis metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Audio duration in seconds
    pub duration_seconds: f32,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,

    /// Algorithm version
    pub algorithm_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_seventh(root: usize, quality: Quality, seventh: Seventh) -> ChordLabel {
        ChordLabel {
            seventh: Some(seventh),
            ..ChordLabel::new(root, quality)
        }
    }

    #[test]
    fn test_symbols() {
        assert_eq!(ChordLabel::new(0, Quality::Major).symbol(), "C");
        assert_eq!(ChordLabel::new(11, Quality::Diminished).symbol(), "Bdim");
        assert_eq!(ChordLabel::new(4, Quality::Power).symbol(), "E5");
        assert_eq!(ChordLabel::new(2, Quality::Major7).symbol(), "Dmaj7");
        assert_eq!(ChordLabel::new(7, Quality::HalfDiminished7).symbol(), "Gm7b5");
        assert_eq!(with_seventh(7, Quality::Major, Seventh::Flat).symbol(), "G7");
        assert_eq!(with_seventh(2, Quality::Major, Seventh::Major).symbol(), "Dmaj7");
        assert_eq!(with_seventh(0, Quality::Minor, Seventh::Major).symbol(), "Cmmaj7");
    }

    #[test]
    fn test_canonical_folds_refined_sevenths() {
        let folded = with_seventh(0, Quality::Major, Seventh::Flat).canonical();
        assert_eq!(folded, ChordLabel::new(0, Quality::Dominant7));
        assert_eq!(
            with_seventh(2, Quality::Major, Seventh::Major).canonical(),
            ChordLabel::new(2, Quality::Major7)
        );
        assert_eq!(
            with_seventh(9, Quality::Minor, Seventh::Flat).canonical(),
            ChordLabel::new(9, Quality::Minor7)
        );

        // Minor-major seventh has no template of its own
        let mm7 = with_seventh(0, Quality::Minor, Seventh::Major);
        assert_eq!(mm7.canonical(), mm7);
        assert_eq!(ChordLabel::new(7, Quality::Sus4).canonical(), ChordLabel::new(7, Quality::Sus4));

        // Symbols survive the fold
        for label in [
            with_seventh(0, Quality::Major, Seventh::Flat),
            with_seventh(2, Quality::Major, Seventh::Major),
            with_seventh(9, Quality::Minor, Seventh::Flat),
        ] {
            assert_eq!(label.canonical().symbol(), label.symbol());
        }
    }

    #[test]
    fn test_description() {
        assert_eq!(with_seventh(9, Quality::Minor, Seventh::Flat).description(), "A Minor Seventh");
        assert_eq!(ChordLabel::new(1, Quality::Augmented).description(), "C# Augmented");
    }

    #[test]
    fn test_pitch_classes() {
        assert_eq!(ChordLabel::new(9, Quality::Minor).pitch_classes(), vec![9, 0, 4]);
        assert_eq!(
            with_seventh(7, Quality::Major, Seventh::Flat).pitch_classes(),
            vec![7, 11, 2, 5]
        );
    }

    #[test]
    fn test_dominant_label() {
        let c = ChordLabel::new(0, Quality::Major);
        let g = ChordLabel::new(7, Quality::Major);
        let result = ChordResult {
            labels: vec![g, c, c, g],
            times: vec![0.0, 0.1, 0.2, 0.3],
            confidences: vec![1.0; 4],
            raw_labels: vec![g, c, c, g],
            frame_hop_s: 0.1,
        };
        assert_eq!(result.dominant_label(), Some(g));
        assert_eq!(result.symbols(), vec!["G", "C", "C", "G"]);
    }

    #[test]
    fn test_note_event_list() {
        let event = |time: f32, midi: i32| NoteEvent {
            time,
            midi,
            name: crate::features::notes::pitch::midi_to_name(midi),
            frequency: crate::features::notes::pitch::midi_to_hz(midi),
            velocity: 0.5,
            source: NoteSource::Cqt,
        };
        let list = NoteEventList(vec![event(0.0, 69), event(0.0, 60), event(0.2, 69)]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.for_pitch(69).count(), 2);
        assert!(NoteEventList::default().is_empty());
    }

    #[test]
    fn test_serialize_label() {
        let json = serde_json::to_string(&ChordLabel::new(9, Quality::Minor)).unwrap();
        let back: ChordLabel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.symbol(), "Am");
    }
}
