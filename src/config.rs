//! Configuration parameters for chord and note analysis

use crate::features::chords::ChordMatcherConfig;
use crate::features::chroma::ChromaNorm;
use crate::features::notes::NoteTrackerConfig;
use crate::features::spectral::{CqtParams, FrequencyScale, SpectrogramParams, TransformParams};

/// Chord classification parameters
#[derive(Debug, Clone)]
pub struct ChordConfig {
    /// Constant-Q transform feeding the chroma projection
    /// (default: C1 upward, 84 bins, hop 512)
    pub cqt: CqtParams,

    /// Per-frame chroma normalization before matching (default: None)
    ///
    /// The matcher normalizes internally, so this only matters when the raw
    /// chroma is inspected.
    pub chroma_norm: ChromaNorm,

    /// Template matcher (default: cosine scoring, all qualities, seventh refinement)
    pub matcher: ChordMatcherConfig,

    /// Majority-vote window in frames (default: 5; 0 or 1 disables)
    pub smoothing_window: usize,
}

impl Default for ChordConfig {
    fn default() -> Self {
        Self {
            cqt: CqtParams::default(),
            chroma_norm: ChromaNorm::None,
            matcher: ChordMatcherConfig::default(),
            smoothing_window: 5,
        }
    }
}

/// Combined analysis configuration
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    /// Display spectrogram (default: 128-band mel, n_fft 2048, hop 512)
    pub spectrum: TransformParams,

    /// Chord classification
    pub chords: ChordConfig,

    /// Note event tracking
    pub notes: NoteTrackerConfig,
}

impl AnalysisConfig {
    /// Use one hop length for every transform
    pub fn with_hop_length(mut self, hop_length: usize) -> Self {
        match &mut self.spectrum {
            TransformParams::Cqt(params) => params.hop_length = hop_length,
            TransformParams::Spectrogram(params) => params.hop_length = hop_length,
        }
        self.chords.cqt.hop_length = hop_length;
        self.notes.hop_length = hop_length;
        self
    }

    /// Display a linear-frequency spectrogram instead of the mel default
    pub fn with_linear_spectrum(mut self) -> Self {
        let hop_length = match &self.spectrum {
            TransformParams::Cqt(params) => params.hop_length,
            TransformParams::Spectrogram(params) => params.hop_length,
        };
        self.spectrum = TransformParams::Spectrogram(SpectrogramParams {
            hop_length,
            scale: FrequencyScale::Linear,
            ..SpectrogramParams::default()
        });
        self
    }
}
