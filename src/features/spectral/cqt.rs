//! Constant-Q transform
//!
//! Each bin `k` is a Hann-windowed complex sinusoid centered on
//! `fmin * 2^(k / bins_per_octave)` whose length keeps the quality factor
//! `Q = filter_scale / (2^(1 / bins_per_octave) - 1)` constant across bins.
//!
//! Kernels are applied directly in the time domain, one centered frame per
//! hop. Frames are independent and computed in parallel with rayon, then
//! collected in frame order.
//!
//! # Reference
//!
//! Brown, J. C. (1991). Calculation of a constant Q spectral transform.
//! *Journal of the Acoustical Society of America*, 89(1), 425-434.

use std::f32::consts::PI;

use rayon::prelude::*;
use rustfft::num_complex::Complex;

use super::{amplitude_to_db, ensure_finite, TransformKind};
use crate::analysis::result::SpectralResult;
use crate::error::AnalysisError;
use crate::io::SampleBuffer;

/// Constant-Q transform parameters
#[derive(Debug, Clone)]
pub struct CqtParams {
    /// Hop length in samples between frame centers (default: 512)
    pub hop_length: usize,

    /// Center frequency of bin 0 in Hz (default: 32.70, C1)
    pub fmin: f32,

    /// Number of bins (default: 84, seven octaves)
    pub n_bins: usize,

    /// Bins per octave (default: 12, one per semitone)
    pub bins_per_octave: usize,

    /// Kernel length multiplier (default: 2.0)
    ///
    /// At 2.0 with 12 bins per octave, a tone centered on one bin falls on the
    /// first null of its neighbours' Hann response.
    pub filter_scale: f32,
}

impl Default for CqtParams {
    fn default() -> Self {
        Self {
            hop_length: 512,
            fmin: 32.703_197,
            n_bins: 84,
            bins_per_octave: 12,
            filter_scale: 2.0,
        }
    }
}

impl CqtParams {
    /// Check parameters against a sample rate
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` on a zero hop, zero bins, a
    /// non-positive fmin or filter scale, or a top bin at or above Nyquist.
    pub fn validate(&self, sample_rate: u32) -> Result<(), AnalysisError> {
        if self.hop_length == 0 {
            return Err(AnalysisError::InvalidInput(
                "hop_length must be > 0".to_string(),
            ));
        }
        if self.n_bins == 0 || self.bins_per_octave == 0 {
            return Err(AnalysisError::InvalidInput(
                "n_bins and bins_per_octave must be > 0".to_string(),
            ));
        }
        if self.fmin <= 0.0
            || !self.fmin.is_finite()
            || self.filter_scale <= 0.0
            || !self.filter_scale.is_finite()
        {
            return Err(AnalysisError::InvalidInput(format!(
                "fmin and filter_scale must be positive, got {} and {}",
                self.fmin, self.filter_scale
            )));
        }

        let nyquist = sample_rate as f32 / 2.0;
        let top = self.fmin * 2f32.powf((self.n_bins - 1) as f32 / self.bins_per_octave as f32);
        if top >= nyquist {
            return Err(AnalysisError::InvalidInput(format!(
                "Highest CQT bin ({:.1} Hz) exceeds Nyquist ({:.1} Hz)",
                top, nyquist
            )));
        }

        Ok(())
    }

    /// Quality factor shared by every bin
    pub fn q_factor(&self) -> f32 {
        self.filter_scale / (2f32.powf(1.0 / self.bins_per_octave as f32) - 1.0)
    }
}

/// Linear-magnitude CQT of a whole signal
#[derive(Debug, Clone)]
pub struct CqtSpectrum {
    /// Magnitudes, frame-major: `magnitudes[frame][bin]`
    pub magnitudes: Vec<Vec<f32>>,

    /// Frame time offsets in seconds
    pub times: Vec<f32>,

    /// Center frequency of every bin in Hz
    pub freqs: Vec<f32>,

    /// Bins per octave used to build the kernels
    pub bins_per_octave: usize,
}

impl CqtSpectrum {
    /// Magnitudes converted to dB relative to the analysis maximum
    pub fn to_db(&self) -> Vec<Vec<f32>> {
        amplitude_to_db(&self.magnitudes)
    }

    /// Number of frames
    pub fn n_frames(&self) -> usize {
        self.magnitudes.len()
    }

    /// Package as a display result in dB
    pub fn into_db_result(self) -> SpectralResult {
        SpectralResult {
            kind: TransformKind::Cqt,
            frames: amplitude_to_db(&self.magnitudes),
            times: self.times,
            freqs: self.freqs,
        }
    }
}

/// Center frequencies of every CQT bin: `fmin * 2^(k / bins_per_octave)`
pub fn cqt_frequencies(fmin: f32, n_bins: usize, bins_per_octave: usize) -> Vec<f32> {
    (0..n_bins)
        .map(|k| fmin * 2f32.powf(k as f32 / bins_per_octave as f32))
        .collect()
}

/// Compute the constant-Q transform of a buffer
///
/// # Arguments
///
/// * `buffer` - Validated mono signal
/// * `params` - Transform parameters
///
/// # Returns
///
/// Linear magnitudes scaled so a full-scale sinusoid centered on a bin reads
/// close to 1.0, plus frame times and bin frequencies.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `params` fail validation,
/// `AnalysisError::ProcessingError` if a magnitude overflows `f32`.
pub fn compute_cqt(
    buffer: &SampleBuffer<'_>,
    params: &CqtParams,
) -> Result<CqtSpectrum, AnalysisError> {
    params.validate(buffer.sample_rate())?;

    let freqs = cqt_frequencies(params.fmin, params.n_bins, params.bins_per_octave);
    let kernels = build_kernels(&freqs, buffer.sample_rate() as f32, params.q_factor());
    let n_frames = buffer.frame_count(params.hop_length);

    log::debug!(
        "Computing CQT: {} samples at {} Hz, {} frames x {} bins (Q={:.2})",
        buffer.len(),
        buffer.sample_rate(),
        n_frames,
        params.n_bins,
        params.q_factor()
    );

    let samples = buffer.samples();
    let magnitudes: Vec<Vec<f32>> = (0..n_frames)
        .into_par_iter()
        .map(|frame| {
            let center = (frame * params.hop_length) as isize;
            kernels
                .iter()
                .map(|kernel| kernel.apply(samples, center))
                .collect()
        })
        .collect();
    ensure_finite(&magnitudes, "CQT")?;

    let times = (0..n_frames)
        .map(|frame| buffer.frame_time(frame, params.hop_length))
        .collect();

    Ok(CqtSpectrum {
        magnitudes,
        times,
        freqs,
        bins_per_octave: params.bins_per_octave,
    })
}

/// One precomputed bin filter
struct CqtKernel {
    taps: Vec<Complex<f32>>,
}

impl CqtKernel {
    /// Magnitude of the filter response for the frame centered at `center`
    fn apply(&self, samples: &[f32], center: isize) -> f32 {
        let len = self.taps.len() as isize;
        let start = center - len / 2;

        // Clip the kernel to the part overlapping the signal (zero padding).
        let first = (-start).max(0);
        let last = (samples.len() as isize - start).min(len);
        if first >= last {
            return 0.0;
        }

        let taps = &self.taps[first as usize..last as usize];
        let window = &samples[(start + first) as usize..(start + last) as usize];
        let acc = taps
            .iter()
            .zip(window.iter())
            .fold(Complex::new(0.0f32, 0.0), |acc, (&tap, &x)| acc + tap * x);

        // A real sinusoid splits its energy between +f and -f.
        2.0 * acc.norm()
    }
}

fn build_kernels(freqs: &[f32], sample_rate: f32, q: f32) -> Vec<CqtKernel> {
    freqs
        .iter()
        .map(|&freq| {
            let len = ((q * sample_rate / freq).ceil() as usize).max(1);
            let window = hann(len);
            let norm: f32 = window.iter().sum::<f32>().max(f32::EPSILON);
            let half = (len / 2) as f32;
            let taps = window
                .iter()
                .enumerate()
                .map(|(n, &w)| {
                    let phase = -2.0 * PI * freq * (n as f32 - half) / sample_rate;
                    Complex::from_polar(w / norm, phase)
                })
                .collect();
            CqtKernel { taps }
        })
        .collect()
}

/// Symmetric Hann window
pub(crate) fn hann(len: usize) -> Vec<f32> {
    if len == 1 {
        return vec![1.0];
    }
    let denom = (len - 1) as f32;
    (0..len)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / denom).cos())
        .collect()
}
