//! Sliding-window majority vote over per-frame labels
//!
//! Suppresses single-frame flicker in the chord sequence. Element `i` of the
//! output is the most frequent label in `[i - W/2, i + W/2]` (clipped to the
//! sequence). Frequency ties go to the label whose first occurrence inside the
//! window comes earliest.

/// Majority-vote smoothing
///
/// # Arguments
///
/// * `labels` - Per-frame labels in time order
/// * `window` - Window size in frames (odd recommended, default 5)
///
/// # Returns
///
/// A sequence of the same length. The input is returned unchanged when
/// `window <= 1` or the sequence is shorter than `window`.
pub fn smooth_labels<T: Clone + PartialEq>(labels: &[T], window: usize) -> Vec<T> {
    let n = labels.len();
    if window <= 1 || n < window {
        return labels.to_vec();
    }

    let half = window / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            majority(&labels[lo..hi]).clone()
        })
        .collect()
}

/// Most frequent element, earliest first occurrence on ties
fn majority<T: PartialEq>(window: &[T]) -> &T {
    let mut counts: Vec<(&T, usize)> = Vec::with_capacity(window.len());
    for label in window {
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut best = &counts[0];
    for entry in &counts[1..] {
        if entry.1 > best.1 {
            best = entry;
        }
    }
    best.0
}
