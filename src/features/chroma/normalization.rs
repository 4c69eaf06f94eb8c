//! Chroma normalization strategies

use super::{ChromaVector, N_PITCH_CLASSES};

/// Below this norm a vector counts as silent and is left untouched
const EPSILON: f32 = 1e-12;

/// Scale a chroma vector to unit L2 norm (no-op on an all-zero vector)
pub fn normalize_l2(chroma: &mut ChromaVector) {
    let norm = chroma.iter().map(|&x| x * x).sum::<f32>().sqrt();
    if norm > EPSILON {
        for x in chroma.iter_mut() {
            *x /= norm;
        }
    }
}

/// Scale a chroma vector to sum to one (no-op on an all-zero vector)
pub fn normalize_l1(chroma: &mut ChromaVector) {
    let sum: f32 = chroma.iter().map(|x| x.abs()).sum();
    if sum > EPSILON {
        for x in chroma.iter_mut() {
            *x /= sum;
        }
    }
}

/// Average chroma over frames (all-zero for an empty slice)
pub fn mean_chroma(frames: &[ChromaVector]) -> ChromaVector {
    let mut mean = [0.0f32; N_PITCH_CLASSES];
    if frames.is_empty() {
        return mean;
    }
    for frame in frames {
        for (acc, &x) in mean.iter_mut().zip(frame.iter()) {
            *acc += x;
        }
    }
    let n = frames.len() as f32;
    for x in mean.iter_mut() {
        *x /= n;
    }
    mean
}

/// Pitch classes whose share of the total energy exceeds `threshold`
///
/// The vector is L1-normalized first, so `threshold` is a fraction of the
/// frame's energy (e.g. 0.1). Returned in ascending pitch-class order.
pub fn active_pitch_classes(chroma: &ChromaVector, threshold: f32) -> Vec<usize> {
    let mut normalized = *chroma;
    normalize_l1(&mut normalized);
    normalized
        .iter()
        .enumerate()
        .filter(|(_, x)| **x > threshold)
        .map(|(pc, _)| pc)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_l2_unit_norm() {
        let mut chroma = [0.0f32; 12];
        chroma[0] = 1.0;
        chroma[4] = 1.0;
        chroma[7] = 1.0;
        normalize_l2(&mut chroma);
        let norm: f32 = chroma.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_untouched() {
        let mut chroma = [0.0f32; 12];
        normalize_l2(&mut chroma);
        normalize_l1(&mut chroma);
        assert!(chroma.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_mean_chroma() {
        let mut a = [0.0f32; 12];
        let mut b = [0.0f32; 12];
        a[0] = 2.0;
        b[0] = 4.0;
        b[7] = 2.0;
        let mean = mean_chroma(&[a, b]);
        assert_eq!(mean[0], 3.0);
        assert_eq!(mean[7], 1.0);
        assert!(mean_chroma(&[]).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_active_pitch_classes() {
        let mut chroma = [0.01f32; 12];
        chroma[9] = 1.0; // A
        chroma[0] = 1.0; // C
        chroma[4] = 1.0; // E
        assert_eq!(active_pitch_classes(&chroma, 0.1), vec![0, 4, 9]);
        assert!(active_pitch_classes(&[0.0; 12], 0.1).is_empty());
    }
}
