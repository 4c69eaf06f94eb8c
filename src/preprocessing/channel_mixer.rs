//! Channel mixing utilities (multi-channel to mono conversion)

/// Average interleaved multi-channel samples into mono
///
/// # Arguments
///
/// * `interleaved` - Samples laid out as `[c0, c1, ..., c0, c1, ...]`
/// * `channels` - Number of interleaved channels
///
/// # Returns
///
/// Mono samples, one per complete frame. A trailing partial frame is dropped.
pub fn downmix_interleaved(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    let scale = 1.0 / channels as f32;
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}
