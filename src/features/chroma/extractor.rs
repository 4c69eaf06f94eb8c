//! Chroma vector extraction
//!
//! Converts a constant-Q magnitude spectrogram to 12-element chroma vectors by
//! summing every bin that shares a pitch class.

use rayon::prelude::*;

use super::normalization::{normalize_l1, normalize_l2};
use super::{ChromaVector, N_PITCH_CLASSES};
use crate::error::AnalysisError;
use crate::features::notes::pitch::hz_to_midi;
use crate::features::spectral::CqtSpectrum;

/// Per-frame chroma normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromaNorm {
    /// Raw octave-folded sums
    #[default]
    None,
    /// Unit L2 norm (for cosine-similarity matching)
    L2,
    /// Sum to one (for threshold-based note extraction)
    L1,
}

/// Extract chroma vectors from a CQT spectrum
///
/// Bin `k` contributes to pitch class `(pc(fmin) + k) mod 12`, which is
/// `k mod 12` when the lowest bin is a C. All-zero frames stay all-zero under
/// every normalization.
///
/// # Arguments
///
/// * `spectrum` - Linear-magnitude CQT with 12 bins per octave
/// * `norm` - Per-frame normalization
///
/// # Returns
///
/// One chroma vector per CQT frame
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the CQT does not have 12 bins per
/// octave or has no bins.
pub fn extract_chroma(
    spectrum: &CqtSpectrum,
    norm: ChromaNorm,
) -> Result<Vec<ChromaVector>, AnalysisError> {
    if spectrum.bins_per_octave != N_PITCH_CLASSES {
        return Err(AnalysisError::InvalidInput(format!(
            "Chroma projection needs 12 bins per octave, got {}",
            spectrum.bins_per_octave
        )));
    }

    let first_pitch_class = spectrum
        .freqs
        .first()
        .map(|&f| hz_to_midi(f).round().rem_euclid(12.0) as usize)
        .ok_or_else(|| AnalysisError::InvalidInput("CQT has no bins".to_string()))?;

    log::debug!(
        "Extracting chroma: {} frames, lowest bin pitch class {}, norm {:?}",
        spectrum.n_frames(),
        first_pitch_class,
        norm
    );

    let chroma = spectrum
        .magnitudes
        .par_iter()
        .map(|frame| {
            let mut chroma = fold_frame(frame, first_pitch_class);
            match norm {
                ChromaNorm::None => {}
                ChromaNorm::L2 => normalize_l2(&mut chroma),
                ChromaNorm::L1 => normalize_l1(&mut chroma),
            }
            chroma
        })
        .collect();

    Ok(chroma)
}

/// Fold one frame of semitone-spaced magnitudes into pitch classes
///
/// Negative and non-finite magnitudes are ignored.
pub fn fold_frame(frame: &[f32], first_pitch_class: usize) -> ChromaVector {
    let mut chroma = [0.0f32; N_PITCH_CLASSES];
    for (bin, &mag) in frame.iter().enumerate() {
        if mag.is_finite() && mag > 0.0 {
            chroma[(first_pitch_class + bin) % N_PITCH_CLASSES] += mag;
        }
    }
    chroma
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum(frames: Vec<Vec<f32>>, fmin: f32, bins_per_octave: usize) -> CqtSpectrum {
        let n_bins = frames.first().map(|f| f.len()).unwrap_or(0);
        CqtSpectrum {
            times: (0..frames.len()).map(|i| i as f32).collect(),
            magnitudes: frames,
            freqs: crate::features::spectral::cqt_frequencies(fmin, n_bins, bins_per_octave),
            bins_per_octave,
        }
    }

    #[test]
    fn test_fold_octaves() {
        let mut frame = vec![0.0f32; 36];
        frame[0] = 1.0; // C
        frame[12] = 2.0; // C one octave up
        frame[31] = 0.5; // G two octaves up
        let chroma = fold_frame(&frame, 0);
        assert_eq!(chroma[0], 3.0);
        assert_eq!(chroma[7], 0.5);
        assert_eq!(chroma.iter().sum::<f32>(), 3.5);
    }

    #[test]
    fn test_fold_with_offset_root() {
        let mut frame = vec![0.0f32; 12];
        frame[0] = 1.0;
        // Lowest bin is A: bin 0 lands on pitch class 9
        let chroma = fold_frame(&frame, 9);
        assert_eq!(chroma[9], 1.0);
    }

    #[test]
    fn test_extract_chroma_normalizations() {
        let mut frame = vec![0.0f32; 24];
        frame[0] = 3.0;
        frame[16] = 4.0; // E
        let spec = spectrum(vec![frame, vec![0.0; 24]], 32.703_197, 12);

        let l2 = extract_chroma(&spec, ChromaNorm::L2).unwrap();
        assert!((l2[0][0] - 0.6).abs() < 1e-6);
        assert!((l2[0][4] - 0.8).abs() < 1e-6);

        let l1 = extract_chroma(&spec, ChromaNorm::L1).unwrap();
        assert!((l1[0].iter().sum::<f32>() - 1.0).abs() < 1e-6);

        // Silent frame stays zero, no NaN
        assert!(l2[1].iter().all(|&v| v == 0.0));
        assert!(l1[1].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_extract_chroma_rejects_wrong_resolution() {
        let spec = spectrum(vec![vec![0.0; 36]], 32.703_197, 36);
        assert!(extract_chroma(&spec, ChromaNorm::None).is_err());
    }
}
