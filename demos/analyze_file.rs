//! Example: Analyze a single audio file
//!
//! Prints chord changes, the whole-file chord and note onsets.
//!
//! ```text
//! cargo run --example analyze_file -- song.wav [--json]
//! ```

use stratum_chords::{analyze, classify_mean_chord, load_audio, AnalysisConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: analyze_file <audio file> [--json]")?;
    let json = args.any(|a| a == "--json");

    let (samples, sample_rate) = load_audio(&path)?;

    let config = AnalysisConfig::default();
    let result = analyze(&samples, sample_rate, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let track = classify_mean_chord(&samples, sample_rate, &config.chords)?;

    println!("Analysis Results: {}", path);
    println!(
        "  Duration: {:.2}s at {} Hz",
        result.metadata.duration_seconds, result.metadata.sample_rate
    );
    println!(
        "  Overall chord: {} (confidence: {:.2}, notes: {})",
        track.chord,
        track.confidence,
        track.notes.join(" ")
    );

    println!("  Chord changes:");
    let chords = &result.chords;
    let mut previous = None;
    for ((time, label), confidence) in chords.times.iter().zip(&chords.labels).zip(&chords.confidences) {
        if previous != Some(label) {
            println!("    {:7.2}s  {:<8} ({:.2})", time, label.symbol(), confidence);
            previous = Some(label);
        }
    }

    println!("  Note events: {}", result.notes.len());
    for event in result.notes.iter().take(20) {
        println!(
            "    {:7.2}s  {:<4} {:8.2} Hz  velocity {:.2}",
            event.time, event.name, event.frequency, event.velocity
        );
    }

    println!("  Processing time: {:.2} ms", result.metadata.processing_time_ms);

    Ok(())
}
