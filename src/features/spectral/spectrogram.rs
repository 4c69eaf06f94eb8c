//! STFT power spectrogram (linear or mel frequency axis)
//!
//! Hands a human-viewable spectrogram to the rendering layer. None of the
//! classifiers read it.

use std::f32::consts::PI;
use std::sync::Arc;

use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::{ensure_finite, power_to_db, TransformKind};
use crate::analysis::result::SpectralResult;
use crate::error::AnalysisError;
use crate::io::SampleBuffer;

/// Frequency axis of the spectrogram
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrequencyScale {
    /// One row per FFT bin, `0..=n_fft/2`
    Linear,
    /// Slaney-style mel filterbank between 0 Hz and Nyquist
    Mel {
        /// Number of mel bands (default: 128)
        n_mels: usize,
    },
}

/// STFT spectrogram parameters
#[derive(Debug, Clone)]
pub struct SpectrogramParams {
    /// Hop length in samples (default: 512)
    pub hop_length: usize,

    /// FFT size in samples (default: 2048)
    pub n_fft: usize,

    /// Frequency axis (default: 128 mel bands)
    pub scale: FrequencyScale,
}

impl Default for SpectrogramParams {
    fn default() -> Self {
        Self {
            hop_length: 512,
            n_fft: 2048,
            scale: FrequencyScale::Mel { n_mels: 128 },
        }
    }
}

/// Compute a dB power spectrogram for display
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` on a zero hop, FFT size or mel count,
/// `AnalysisError::ProcessingError` if the power overflows `f32`.
pub fn compute_spectrogram(
    buffer: &SampleBuffer<'_>,
    params: &SpectrogramParams,
) -> Result<SpectralResult, AnalysisError> {
    if params.hop_length == 0 || params.n_fft == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "hop_length and n_fft must be > 0, got {} and {}",
            params.hop_length, params.n_fft
        )));
    }
    if let FrequencyScale::Mel { n_mels: 0 } = params.scale {
        return Err(AnalysisError::InvalidInput(
            "n_mels must be > 0".to_string(),
        ));
    }

    let n_frames = buffer.frame_count(params.hop_length);
    log::debug!(
        "Computing spectrogram: {} frames, n_fft={}, hop={}, scale={:?}",
        n_frames,
        params.n_fft,
        params.hop_length,
        params.scale
    );

    let power = stft_power(buffer.samples(), params.n_fft, params.hop_length, n_frames);
    ensure_finite(&power, "STFT")?;
    let sample_rate = buffer.sample_rate() as f32;

    let (kind, frames, freqs) = match params.scale {
        FrequencyScale::Linear => {
            let freqs: Vec<f32> = (0..=params.n_fft / 2)
                .map(|k| k as f32 * sample_rate / params.n_fft as f32)
                .collect();
            (TransformKind::Linear, power, freqs)
        }
        FrequencyScale::Mel { n_mels } => {
            let bank = MelFilterbank::new(n_mels, params.n_fft, sample_rate);
            let mel_power: Vec<Vec<f32>> =
                power.par_iter().map(|frame| bank.apply(frame)).collect();
            ensure_finite(&mel_power, "Mel filterbank")?;
            (TransformKind::Mel, mel_power, bank.center_freqs)
        }
    };

    let times = (0..n_frames)
        .map(|frame| buffer.frame_time(frame, params.hop_length))
        .collect();

    Ok(SpectralResult {
        kind,
        frames: power_to_db(&frames),
        times,
        freqs,
    })
}

/// Centered, Hann-windowed STFT power for every frame
fn stft_power(
    samples: &[f32],
    n_fft: usize,
    hop_length: usize,
    n_frames: usize,
) -> Vec<Vec<f32>> {
    let fft: Arc<dyn Fft<f32>> = FftPlanner::<f32>::new().plan_fft_forward(n_fft);
    let window = periodic_hann(n_fft);
    let half = (n_fft / 2) as isize;

    (0..n_frames)
        .into_par_iter()
        .map(|frame| {
            let start = (frame * hop_length) as isize - half;
            let mut spectrum: Vec<Complex<f32>> = window
                .iter()
                .enumerate()
                .map(|(n, &w)| {
                    let pos = start + n as isize;
                    let x = if pos >= 0 {
                        samples.get(pos as usize).copied().unwrap_or(0.0)
                    } else {
                        0.0
                    };
                    Complex::new(x * w, 0.0)
                })
                .collect();

            fft.process(&mut spectrum);

            spectrum[..=n_fft / 2].iter().map(|c| c.norm_sqr()).collect()
        })
        .collect()
}

fn periodic_hann(len: usize) -> Vec<f32> {
    (0..len)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / len as f32).cos())
        .collect()
}

/// Triangular mel filters with Slaney area normalization
struct MelFilterbank {
    weights: Vec<Vec<f32>>,
    center_freqs: Vec<f32>,
}

impl MelFilterbank {
    fn new(n_mels: usize, n_fft: usize, sample_rate: f32) -> Self {
        let n_bins = n_fft / 2 + 1;
        let fft_freqs: Vec<f32> = (0..n_bins)
            .map(|k| k as f32 * sample_rate / n_fft as f32)
            .collect();

        let max_mel = hz_to_mel(sample_rate / 2.0);
        let edges: Vec<f32> = (0..n_mels + 2)
            .map(|i| mel_to_hz(max_mel * i as f32 / (n_mels + 1) as f32))
            .collect();

        let weights = (0..n_mels)
            .map(|m| {
                let (lower, center, upper) = (edges[m], edges[m + 1], edges[m + 2]);
                let enorm = 2.0 / (upper - lower);
                fft_freqs
                    .iter()
                    .map(|&f| {
                        let rising = (f - lower) / (center - lower);
                        let falling = (upper - f) / (upper - center);
                        rising.min(falling).max(0.0) * enorm
                    })
                    .collect()
            })
            .collect();

        Self {
            weights,
            center_freqs: edges[1..=n_mels].to_vec(),
        }
    }

    fn apply(&self, power: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .map(|filter| filter.iter().zip(power).map(|(w, p)| w * p).sum())
            .collect()
    }
}

const MEL_F_SP: f32 = 200.0 / 3.0;
const MEL_MIN_LOG_HZ: f32 = 1000.0;
const MEL_MIN_LOG_MEL: f32 = MEL_MIN_LOG_HZ / MEL_F_SP;

fn mel_log_step() -> f32 {
    6.4f32.ln() / 27.0
}

/// Slaney mel scale: linear below 1 kHz, logarithmic above
pub fn hz_to_mel(hz: f32) -> f32 {
    if hz < MEL_MIN_LOG_HZ {
        hz / MEL_F_SP
    } else {
        MEL_MIN_LOG_MEL + (hz / MEL_MIN_LOG_HZ).ln() / mel_log_step()
    }
}

/// Inverse of [`hz_to_mel`]
pub fn mel_to_hz(mel: f32) -> f32 {
    if mel < MEL_MIN_LOG_MEL {
        mel * MEL_F_SP
    } else {
        MEL_MIN_LOG_HZ * (mel_log_step() * (mel - MEL_MIN_LOG_MEL)).exp()
    }
}
