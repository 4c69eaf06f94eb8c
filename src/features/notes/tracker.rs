//! Note event tracking from constant-Q frames
//!
//! Per frame, in time order:
//! 1. Skip frames sitting entirely at the silence floor
//! 2. Keep bins above the dB threshold, strongest `peak_top_n` first
//! 3. Round each bin's center frequency to the nearest semitone
//! 4. Drop pitches that fired less than `min_note_gap` seconds ago
//! 5. Emit the rest with velocity scaled from threshold (0) to 0 dB (1)

use std::collections::HashMap;

use super::pitch::{hz_to_midi, midi_to_name, note_to_hz};
use crate::analysis::result::{NoteEvent, NoteEventList, NoteSource};
use crate::error::AnalysisError;
use crate::features::spectral::{CqtParams, DB_FLOOR};

/// Note tracker configuration
#[derive(Debug, Clone)]
pub struct NoteTrackerConfig {
    /// Hop length in samples (default: 512)
    pub hop_length: usize,

    /// Lowest CQT bin in Hz (default: C2, 65.406 Hz)
    pub fmin: f32,

    /// Number of CQT bins (default: 72, six octaves up to B7)
    pub n_bins: usize,

    /// CQT bins per octave (default: 12)
    pub bins_per_octave: usize,

    /// Activation threshold in dB relative to the signal maximum (default: -48.0)
    pub db_threshold: f32,

    /// Maximum simultaneous peaks per frame (default: 5)
    pub peak_top_n: usize,

    /// Minimum re-trigger gap per pitch in seconds (default: 0.08)
    pub min_note_gap: f32,
}

impl Default for NoteTrackerConfig {
    fn default() -> Self {
        Self {
            hop_length: 512,
            fmin: note_to_hz("C2").unwrap_or(65.406),
            n_bins: 72,
            bins_per_octave: 12,
            db_threshold: -48.0,
            peak_top_n: 5,
            min_note_gap: 0.08,
        }
    }
}

impl NoteTrackerConfig {
    /// CQT parameters for the tracker's transform
    pub fn cqt_params(&self) -> CqtParams {
        CqtParams {
            hop_length: self.hop_length,
            fmin: self.fmin,
            n_bins: self.n_bins,
            bins_per_octave: self.bins_per_octave,
            ..CqtParams::default()
        }
    }

    /// Check the tracking parameters (the transform validates its own)
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` on a non-finite threshold or gap,
    /// or a negative gap.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.db_threshold.is_finite() {
            return Err(AnalysisError::InvalidInput(format!(
                "db_threshold must be finite, got {}",
                self.db_threshold
            )));
        }
        if !self.min_note_gap.is_finite() || self.min_note_gap < 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "min_note_gap must be finite and >= 0, got {}",
                self.min_note_gap
            )));
        }
        Ok(())
    }
}

/// Last emission time per pitch, local to one tracking run
#[derive(Debug, Default)]
pub struct DebounceState {
    last_fired: HashMap<i32, f32>,
}

impl DebounceState {
    /// Empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a firing of `midi` at `time` unless it fired within `min_gap`
    ///
    /// Returns `true` if the event should be emitted.
    pub fn try_fire(&mut self, midi: i32, time: f32, min_gap: f32) -> bool {
        if let Some(&last) = self.last_fired.get(&midi) {
            if time - last < min_gap {
                return false;
            }
        }
        self.last_fired.insert(midi, time);
        true
    }
}

/// Detect note onsets in decibel CQT frames
///
/// # Arguments
///
/// * `db_frames` - One row of dB values per frame (0 dB = signal maximum)
/// * `times` - Frame times in seconds, increasing
/// * `freqs` - Center frequency of every bin in Hz
/// * `config` - Threshold, peak count and re-trigger gap
///
/// # Returns
///
/// Events sorted by time. Frames with no bin above threshold contribute nothing.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `times` does not match the frame
/// count, a frame does not match `freqs`, or the config is invalid.
pub fn detect_note_events(
    db_frames: &[Vec<f32>],
    times: &[f32],
    freqs: &[f32],
    config: &NoteTrackerConfig,
) -> Result<NoteEventList, AnalysisError> {
    config.validate()?;
    if db_frames.len() != times.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "{} frames but {} frame times",
            db_frames.len(),
            times.len()
        )));
    }
    if let Some(frame) = db_frames.iter().find(|f| f.len() != freqs.len()) {
        return Err(AnalysisError::InvalidInput(format!(
            "frame has {} bins but {} bin frequencies",
            frame.len(),
            freqs.len()
        )));
    }

    log::debug!(
        "Tracking notes: {} frames, threshold={:.1} dB, top_n={}, min_gap={:.3}s",
        db_frames.len(),
        config.db_threshold,
        config.peak_top_n,
        config.min_note_gap
    );

    let span = (-config.db_threshold).max(1e-6);
    let mut debounce = DebounceState::new();
    let mut events = Vec::new();
    let mut candidates: Vec<(usize, f32)> = Vec::with_capacity(freqs.len());

    for (frame, &time) in db_frames.iter().zip(times) {
        if frame.iter().all(|&db| db <= DB_FLOOR) {
            continue;
        }

        candidates.clear();
        candidates.extend(
            frame
                .iter()
                .enumerate()
                .filter(|(_, db)| **db > config.db_threshold)
                .map(|(bin, &db)| (bin, db)),
        );
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        candidates.truncate(config.peak_top_n);

        for &(bin, db) in &candidates {
            let frequency = freqs[bin];
            let midi = hz_to_midi(frequency).round() as i32;
            if !debounce.try_fire(midi, time, config.min_note_gap) {
                continue;
            }
            events.push(NoteEvent {
                time,
                midi,
                name: midi_to_name(midi),
                frequency,
                velocity: ((db - config.db_threshold) / span).clamp(0.0, 1.0),
                source: NoteSource::Cqt,
            });
        }
    }

    events.sort_by(|a, b| a.time.total_cmp(&b.time));

    log::debug!("Tracked {} note events", events.len());

    Ok(NoteEventList(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::notes::pitch::midi_to_hz;

    /// Bin frequencies C2..B7
    fn freqs() -> Vec<f32> {
        (36..108).map(midi_to_hz).collect()
    }

    fn frame_with(peaks: &[(i32, f32)]) -> Vec<f32> {
        let mut frame = vec![DB_FLOOR; 72];
        for &(midi, db) in peaks {
            frame[(midi - 36) as usize] = db;
        }
        frame
    }

    #[test]
    fn test_defaults() {
        let config = NoteTrackerConfig::default();
        assert!((config.fmin - 65.406).abs() < 0.01);
        assert_eq!(config.n_bins, 72);
        assert_eq!(config.db_threshold, -48.0);
        assert_eq!(config.peak_top_n, 5);
        assert_eq!(config.min_note_gap, 0.08);
    }

    #[test]
    fn test_held_note_is_debounced() {
        // 100 frames, hop ~23 ms, A4 held at 0 dB
        let hop = 512.0 / 22050.0;
        let frames = vec![frame_with(&[(69, 0.0)]); 100];
        let times: Vec<f32> = (0..100).map(|i| i as f32 * hop).collect();

        let events = detect_note_events(&frames, &times, &freqs(), &NoteTrackerConfig::default()).unwrap();

        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e.name == "A4" && e.midi == 69));
        for pair in events.0.windows(2) {
            assert!(pair[1].time - pair[0].time >= 0.08 - 1e-6);
        }
        // Every 4th frame fires (4 * 23.2 ms > 80 ms > 3 * 23.2 ms)
        assert_eq!(events.len(), 25);
    }

    #[test]
    fn test_silent_frames_emit_nothing() {
        let frames = vec![vec![DB_FLOOR; 72]; 20];
        let times: Vec<f32> = (0..20).map(|i| i as f32 * 0.02).collect();
        let events = detect_note_events(&frames, &times, &freqs(), &NoteTrackerConfig::default()).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_below_threshold_ignored() {
        let frames = vec![frame_with(&[(60, -50.0), (64, -47.0)])];
        let events = detect_note_events(&frames, &[0.0], &freqs(), &NoteTrackerConfig::default()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events.0[0].name, "E4");
    }

    #[test]
    fn test_top_n_strongest() {
        let peaks = [(48, -30.0), (52, -3.0), (55, -10.0), (60, -1.0), (64, -20.0), (67, -6.0), (72, -40.0)];
        let frames = vec![frame_with(&peaks)];
        let config = NoteTrackerConfig {
            peak_top_n: 3,
            ..NoteTrackerConfig::default()
        };
        let events = detect_note_events(&frames, &[0.0], &freqs(), &config).unwrap();
        let mut midis: Vec<i32> = events.iter().map(|e| e.midi).collect();
        midis.sort_unstable();
        assert_eq!(midis, vec![52, 60, 67]);
    }

    #[test]
    fn test_velocity_scaling() {
        let frames = vec![frame_with(&[(69, 0.0), (60, -24.0), (64, -48.0 + 1e-3)])];
        let events = detect_note_events(&frames, &[0.0], &freqs(), &NoteTrackerConfig::default()).unwrap();

        let velocity = |midi: i32| events.for_pitch(midi).next().map(|e| e.velocity);
        assert!((velocity(69).unwrap() - 1.0).abs() < 1e-6);
        assert!((velocity(60).unwrap() - 0.5).abs() < 1e-6);
        assert!(velocity(64).unwrap() < 0.01);
        assert!(events.iter().all(|e| (0.0..=1.0).contains(&e.velocity)));
    }

    #[test]
    fn test_retrigger_after_gap() {
        let frames = vec![frame_with(&[(69, 0.0)]); 3];
        let times = [0.0, 0.05, 0.2];
        let events = detect_note_events(&frames, &times, &freqs(), &NoteTrackerConfig::default()).unwrap();
        let fired: Vec<f32> = events.iter().map(|e| e.time).collect();
        assert_eq!(fired, vec![0.0, 0.2]);
    }

    #[test]
    fn test_debounce_state() {
        let mut state = DebounceState::new();
        assert!(state.try_fire(60, 0.0, 0.1));
        assert!(!state.try_fire(60, 0.05, 0.1));
        assert!(state.try_fire(62, 0.05, 0.1));
        assert!(state.try_fire(60, 0.1, 0.1));
    }

    #[test]
    fn test_mismatched_input_rejected() {
        let frames = vec![vec![0.0; 10]];
        assert!(detect_note_events(&frames, &[0.0], &freqs(), &NoteTrackerConfig::default()).is_err());
        let frames = vec![frame_with(&[])];
        assert!(detect_note_events(&frames, &[], &freqs(), &NoteTrackerConfig::default()).is_err());
    }
}
