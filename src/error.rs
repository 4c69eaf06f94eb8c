//! Error types for the harmonic analysis engine

use thiserror::Error;

/// Errors that can occur during harmonic analysis
///
/// Absence of harmonic content is never an error: silent frames classify as
/// the degenerate chord at confidence 0 and produce no note events.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// Empty or degenerate sample buffer, or a non-positive sample rate
    #[error("Invalid signal: {0}")]
    InvalidSignal(String),

    /// Audio file could not be opened or decoded
    #[error("Load error: {0}")]
    Load(String),

    /// Invalid analysis parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A transform produced non-finite values (input level overflowed `f32`)
    #[error("Processing error: {0}")]
    ProcessingError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = AnalysisError::InvalidSignal("empty buffer".to_string());
        assert_eq!(err.to_string(), "Invalid signal: empty buffer");

        let err = AnalysisError::Load("missing.wav".to_string());
        assert_eq!(err.to_string(), "Load error: missing.wav");
    }
}
