//! Spectral frame extraction
//!
//! Turns a sample buffer into time-indexed spectral frames:
//! - Constant-Q transform (musically spaced bins, feeds chroma and note tracking)
//! - Linear/mel spectrogram (display only, never feeds the classifiers)
//!
//! All frames are centered: frame `t` is centered on sample `t * hop_length`,
//! with zero padding outside the signal, giving `1 + len / hop_length` frames.

pub mod cqt;
pub mod spectrogram;

pub use cqt::{compute_cqt, cqt_frequencies, CqtParams, CqtSpectrum};
pub use spectrogram::{compute_spectrogram, FrequencyScale, SpectrogramParams};

use serde::{Deserialize, Serialize};

use crate::analysis::result::SpectralResult;
use crate::error::AnalysisError;
use crate::io::SampleBuffer;

/// Floor for every decibel value handed out by the engine
///
/// Silent frames (and the whole matrix of a silent signal) sit at this value
/// instead of negative infinity.
pub const DB_FLOOR: f32 = -120.0;

/// Kind of time-frequency transform behind a [`SpectralResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformKind {
    /// Constant-Q transform (log-spaced bins)
    Cqt,
    /// Linear-frequency STFT power spectrogram
    Linear,
    /// Mel-scaled STFT power spectrogram
    Mel,
}

/// Transform selection for [`extract_frames`]
#[derive(Debug, Clone)]
pub enum TransformParams {
    /// Constant-Q transform
    Cqt(CqtParams),
    /// Linear or mel STFT spectrogram
    Spectrogram(SpectrogramParams),
}

impl Default for TransformParams {
    fn default() -> Self {
        TransformParams::Spectrogram(SpectrogramParams::default())
    }
}

/// Compute decibel frames for display with the selected transform
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the transform parameters are
/// invalid for the buffer's sample rate.
pub fn extract_frames(
    buffer: &SampleBuffer<'_>,
    params: &TransformParams,
) -> Result<SpectralResult, AnalysisError> {
    match params {
        TransformParams::Cqt(cqt_params) => Ok(compute_cqt(buffer, cqt_params)?.into_db_result()),
        TransformParams::Spectrogram(spec_params) => compute_spectrogram(buffer, spec_params),
    }
}

/// Fail if a transform produced a non-finite value
///
/// Inputs are checked finite by [`SampleBuffer::new`], so a non-finite
/// magnitude or power means the transform overflowed `f32`. Converting it to
/// dB would silently turn the loudest bins into the floor.
///
/// # Errors
///
/// Returns `AnalysisError::ProcessingError` naming the first bad frame and bin.
pub fn ensure_finite(values: &[Vec<f32>], transform: &str) -> Result<(), AnalysisError> {
    for (frame, row) in values.iter().enumerate() {
        if let Some(bin) = row.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::ProcessingError(format!(
                "{} overflowed at frame {}, bin {} (input level too high)",
                transform, frame, bin
            )));
        }
    }
    Ok(())
}

/// Convert a magnitude matrix to dB relative to its global maximum
///
/// `dB = 20 * log10(mag / max_mag)`, floored at [`DB_FLOOR`]. An all-zero
/// matrix maps entirely to the floor.
pub fn amplitude_to_db(magnitudes: &[Vec<f32>]) -> Vec<Vec<f32>> {
    to_db(magnitudes, 20.0)
}

/// Convert a power matrix to dB relative to its global maximum
///
/// `dB = 10 * log10(power / max_power)`, floored at [`DB_FLOOR`].
pub fn power_to_db(power: &[Vec<f32>]) -> Vec<Vec<f32>> {
    to_db(power, 10.0)
}

fn to_db(values: &[Vec<f32>], factor: f32) -> Vec<Vec<f32>> {
    let reference = values
        .iter()
        .flat_map(|frame| frame.iter().copied())
        .filter(|v| v.is_finite())
        .fold(0.0f32, f32::max);

    values
        .iter()
        .map(|frame| {
            frame
                .iter()
                .map(|&v| {
                    if reference <= 0.0 || !v.is_finite() || v <= 0.0 {
                        return DB_FLOOR;
                    }
                    let db = factor * (v / reference).log10();
                    if db.is_finite() {
                        db.max(DB_FLOOR)
                    } else {
                        DB_FLOOR
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amplitude_to_db_reference() {
        let mags = vec![vec![1.0, 0.1], vec![0.01, 0.0]];
        let db = amplitude_to_db(&mags);
        assert!((db[0][0] - 0.0).abs() < 1e-4);
        assert!((db[0][1] + 20.0).abs() < 1e-4);
        assert!((db[1][0] + 40.0).abs() < 1e-4);
        assert_eq!(db[1][1], DB_FLOOR);
    }

    #[test]
    fn test_silence_maps_to_floor() {
        let mags = vec![vec![0.0; 4]; 3];
        let db = amplitude_to_db(&mags);
        assert!(db.iter().flatten().all(|&v| v == DB_FLOOR));
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite(&[vec![0.0, 1.0], vec![1e30, 0.5]], "CQT").is_ok());
        let err = ensure_finite(&[vec![0.0, 1.0], vec![0.0, f32::INFINITY]], "CQT").unwrap_err();
        assert!(matches!(err, AnalysisError::ProcessingError(_)));
        assert!(err.to_string().contains("frame 1, bin 1"));
        assert!(ensure_finite(&[vec![f32::NAN]], "STFT").is_err());
    }

    #[test]
    fn test_power_to_db() {
        let power = vec![vec![4.0, 0.4]];
        let db = power_to_db(&power);
        assert!((db[0][1] + 10.0).abs() < 1e-4);
    }
}
