//! # Stratum Chords
//!
//! A harmonic analysis engine: per-frame chord labels and note onsets from a
//! mono audio signal.
//!
//! ## Features
//!
//! - **Spectral Frames**: Constant-Q transform for analysis, mel/linear spectrogram for display
//! - **Chroma**: Octave-folded 12-bin pitch-class energies with L1/L2 normalization
//! - **Chord Detection**: Template matching over 14 qualities with deterministic tie-breaking,
//!   seventh refinement and majority-vote smoothing
//! - **Note Tracking**: Top-N constant-Q peak picking with per-pitch debouncing
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_chords::{classify_chords, track_notes, ChordConfig, NoteTrackerConfig};
//!
//! // Load audio samples (mono, f32)
//! let samples: Vec<f32> = vec![]; // Your audio data
//! let sample_rate = 22050;
//!
//! let chords = classify_chords(&samples, sample_rate, &ChordConfig::default())?;
//! for (time, label) in chords.times.iter().zip(&chords.labels) {
//!     println!("{:6.2}s  {}", time, label);
//! }
//!
//! let notes = track_notes(&samples, sample_rate, &NoteTrackerConfig::default())?;
//! println!("{} note events", notes.len());
//! # Ok::<(), stratum_chords::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Samples → CQT → Chroma → Template Matcher → Smoother → Chord labels
//!         → CQT (dB) → Note Tracker → Note events
//!         → Spectrogram → Display frames
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

use std::time::Instant;

// Re-export main types
pub use analysis::result::{
    AnalysisMetadata, AnalysisResult, ChordLabel, ChordResult, NoteEvent, NoteEventList,
    NoteSource, SpectralResult, TrackChord,
};
pub use config::{AnalysisConfig, ChordConfig};
pub use error::AnalysisError;
pub use features::chords::{ChordMatcherConfig, Quality, QualitySet, ScoringMode, Seventh};
pub use features::notes::NoteTrackerConfig;
pub use features::spectral::{CqtParams, FrequencyScale, SpectrogramParams, TransformParams};
pub use io::{load_audio, SampleBuffer};

use features::chords::{classify_frame, detect_chords};
use features::chroma::{
    active_pitch_classes, extract_chroma, mean_chroma, normalize_l1, ChromaNorm,
};
use features::notes::{detect_note_events, pitch_class_name};
use features::spectral::{compute_cqt, extract_frames};

/// Mean-chroma entries at or below this share are zeroed before matching
const MEAN_CHROMA_FLOOR: f32 = 0.05;

/// Time-frequency frames for display
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `params` - Transform selection and parameters
///
/// # Returns
///
/// dB frames (floored at -120 dB) with frame times and bin frequencies
///
/// # Errors
///
/// Returns `AnalysisError::InvalidSignal` for an empty buffer or zero sample
/// rate, `AnalysisError::InvalidInput` for invalid transform parameters.
pub fn analyze_spectrum(
    samples: &[f32],
    sample_rate: u32,
    params: &TransformParams,
) -> Result<SpectralResult, AnalysisError> {
    let buffer = SampleBuffer::new(samples, sample_rate)?;
    log::debug!(
        "Computing display spectrum: {} samples at {} Hz",
        buffer.len(),
        sample_rate
    );
    extract_frames(&buffer, params)
}

/// Per-frame chord labels, smoothed
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `config` - CQT, matcher and smoothing parameters
///
/// # Returns
///
/// `ChordResult` with one smoothed label, time and confidence per CQT frame.
/// Silent frames carry the degenerate label "C" at confidence 0.
///
/// # Errors
///
/// Returns `AnalysisError` on an invalid signal or invalid parameters.
///
/// # Example
///
/// ```no_run
/// use stratum_chords::{classify_chords, ChordConfig};
///
/// let samples = vec![0.0f32; 22050];
/// let result = classify_chords(&samples, 22050, &ChordConfig::default())?;
/// assert!(result.symbols().iter().all(|s| s == "C"));
/// # Ok::<(), stratum_chords::AnalysisError>(())
/// ```
pub fn classify_chords(
    samples: &[f32],
    sample_rate: u32,
    config: &ChordConfig,
) -> Result<ChordResult, AnalysisError> {
    let buffer = SampleBuffer::new(samples, sample_rate)?;
    chords_for_buffer(&buffer, config)
}

/// Note onset events
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `config` - CQT range, dB threshold, peak count and re-trigger gap
///
/// # Returns
///
/// Events sorted by time; empty for a silent signal
///
/// # Errors
///
/// Returns `AnalysisError` on an invalid signal or invalid parameters.
pub fn track_notes(
    samples: &[f32],
    sample_rate: u32,
    config: &NoteTrackerConfig,
) -> Result<NoteEventList, AnalysisError> {
    let buffer = SampleBuffer::new(samples, sample_rate)?;
    notes_for_buffer(&buffer, config)
}

/// One chord for the whole signal, from its averaged chroma
///
/// The mean chroma is L1-normalized and entries at or below 0.05 are zeroed
/// before matching. `notes` lists the pitch classes above the matcher's
/// `active_threshold`.
///
/// # Errors
///
/// Returns `AnalysisError` on an invalid signal or invalid parameters.
pub fn classify_mean_chord(
    samples: &[f32],
    sample_rate: u32,
    config: &ChordConfig,
) -> Result<TrackChord, AnalysisError> {
    let buffer = SampleBuffer::new(samples, sample_rate)?;
    let cqt = compute_cqt(&buffer, &config.cqt)?;
    let chroma = extract_chroma(&cqt, ChromaNorm::None)?;

    let mut mean = mean_chroma(&chroma);
    normalize_l1(&mut mean);
    for x in mean.iter_mut() {
        if *x <= MEAN_CHROMA_FLOOR {
            *x = 0.0;
        }
    }

    let (chord, confidence) = classify_frame(&mean, &config.matcher);
    let notes = active_pitch_classes(&mean, config.matcher.active_threshold)
        .into_iter()
        .map(|pc| pitch_class_name(pc).to_string())
        .collect();

    log::debug!(
        "Whole-signal chord: {} (confidence {:.3}) over {} frames",
        chord,
        confidence,
        chroma.len()
    );

    Ok(TrackChord {
        chord,
        confidence,
        notes,
    })
}

/// Full analysis: display spectrum, chords and notes
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Analysis configuration
///
/// # Returns
///
/// `AnalysisResult` with every stage's output and run metadata
///
/// # Errors
///
/// Returns `AnalysisError` if any stage fails; no partial result is returned.
///
/// # Example
///
/// ```no_run
/// use stratum_chords::{analyze, AnalysisConfig};
///
/// let samples = vec![0.0f32; 44100 * 5];
/// let result = analyze(&samples, 44100, &AnalysisConfig::default())?;
/// println!("{} chord frames, {} notes", result.chords.len(), result.notes.len());
/// # Ok::<(), stratum_chords::AnalysisError>(())
/// ```
pub fn analyze(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let start_time = Instant::now();

    let buffer = SampleBuffer::new(samples, sample_rate)?;
    log::debug!(
        "Starting analysis: {} samples at {} Hz ({:.2}s)",
        buffer.len(),
        sample_rate,
        buffer.duration_seconds()
    );

    let spectrum = extract_frames(&buffer, &config.spectrum)?;
    let chords = chords_for_buffer(&buffer, &config.chords)?;
    let notes = notes_for_buffer(&buffer, &config.notes)?;

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;
    log::debug!(
        "Analysis complete: {} chord frames, {} notes in {:.1} ms",
        chords.len(),
        notes.len(),
        processing_time_ms
    );

    Ok(AnalysisResult {
        spectrum,
        chords,
        notes,
        metadata: AnalysisMetadata {
            duration_seconds: buffer.duration_seconds(),
            sample_rate,
            processing_time_ms,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}

fn chords_for_buffer(
    buffer: &SampleBuffer<'_>,
    config: &ChordConfig,
) -> Result<ChordResult, AnalysisError> {
    let cqt = compute_cqt(buffer, &config.cqt)?;
    let chroma = extract_chroma(&cqt, config.chroma_norm)?;
    let frame_hop_s = config.cqt.hop_length as f32 / buffer.sample_rate() as f32;

    detect_chords(
        &chroma,
        &cqt.times,
        &config.matcher,
        config.smoothing_window,
        frame_hop_s,
    )
}

fn notes_for_buffer(
    buffer: &SampleBuffer<'_>,
    config: &NoteTrackerConfig,
) -> Result<NoteEventList, AnalysisError> {
    let cqt = compute_cqt(buffer, &config.cqt_params())?;
    detect_note_events(&cqt.to_db(), &cqt.times, &cqt.freqs, config)
}
