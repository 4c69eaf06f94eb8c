//! Audio decoding using Symphonia

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer as InterleavedBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AnalysisError;
use crate::preprocessing::channel_mixer::downmix_interleaved;

/// Decode an audio file to mono PCM samples
///
/// Every channel is averaged into a single mono signal. Corrupted packets are
/// skipped; any other reader or decoder failure aborts the load.
///
/// # Arguments
///
/// * `path` - Path to an audio file (wav, flac, mp3, ogg)
///
/// # Returns
///
/// Tuple of (samples, sample_rate)
///
/// # Errors
///
/// Returns `AnalysisError::Load` if the file cannot be opened or probed, has no
/// decodable audio track, or decodes to zero samples.
pub fn load_audio<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, u32), AnalysisError> {
    let path = path.as_ref();
    log::debug!("Decoding audio file: {}", path.display());

    let src = File::open(path)
        .map_err(|e| AnalysisError::Load(format!("{}: {}", path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| load_error(path, e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            AnalysisError::Load(format!("{}: no supported audio track", path.display()))
        })?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.ok_or_else(|| {
        AnalysisError::Load(format!("{}: unknown sample rate", path.display()))
    })?;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| load_error(path, e))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(e) if is_end_of_stream(&e) => break,
            Err(e) => return Err(load_error(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let channels = spec.channels.count();
                let mut interleaved = InterleavedBuffer::<f32>::new(decoded.capacity() as u64, spec);
                interleaved.copy_interleaved_ref(decoded);
                samples.extend(downmix_interleaved(interleaved.samples(), channels));
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("Skipping corrupted packet: {}", msg);
                continue;
            }
            Err(e) => return Err(load_error(path, e)),
        }
    }

    if samples.is_empty() {
        return Err(AnalysisError::Load(format!(
            "{}: no audio samples decoded",
            path.display()
        )));
    }

    log::debug!(
        "Decoded {} mono samples at {} Hz from {}",
        samples.len(),
        sample_rate,
        path.display()
    );

    Ok((samples, sample_rate))
}

/// The reader reports end of stream as an `UnexpectedEof` I/O error
fn is_end_of_stream(err: &SymphoniaError) -> bool {
    matches!(err, SymphoniaError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
}

fn load_error(path: &Path, err: SymphoniaError) -> AnalysisError {
    AnalysisError::Load(format!("{}: {}", path.display(), err))
}
