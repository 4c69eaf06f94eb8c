//! Validated, immutable view over a mono signal

use crate::error::AnalysisError;

/// Mono sample buffer with its sample rate
///
/// Borrowed from the caller for the duration of one analysis run. Construction
/// validates the signal once so the transforms can assume a non-empty, finite
/// buffer and a non-zero sample rate.
#[derive(Debug, Clone, Copy)]
pub struct SampleBuffer<'a> {
    samples: &'a [f32],
    sample_rate: u32,
}

impl<'a> SampleBuffer<'a> {
    /// Wrap `samples` recorded at `sample_rate` Hz
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidSignal` if the buffer is empty, the sample
    /// rate is zero, or any sample is non-finite.
    pub fn new(samples: &'a [f32], sample_rate: u32) -> Result<Self, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::InvalidSignal(
                "Empty audio samples".to_string(),
            ));
        }

        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSignal(
                "Sample rate must be positive".to_string(),
            ));
        }

        if let Some(idx) = samples.iter().position(|s| !s.is_finite()) {
            return Err(AnalysisError::InvalidSignal(format!(
                "Non-finite sample at index {}",
                idx
            )));
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Raw samples
    pub fn samples(&self) -> &'a [f32] {
        self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed buffer
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Signal duration in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Number of centered analysis frames for `hop_length`: `1 + len / hop`
    pub fn frame_count(&self, hop_length: usize) -> usize {
        1 + self.samples.len() / hop_length.max(1)
    }

    /// Time offset of frame `index` in seconds
    pub fn frame_time(&self, index: usize, hop_length: usize) -> f32 {
        (index * hop_length) as f32 / self.sample_rate as f32
    }
}
