//! Audio I/O modules
//!
//! Audio decoding with Symphonia and the validated sample buffer consumed by
//! every transform.

pub mod decoder;
pub mod sample_buffer;

pub use decoder::load_audio;
pub use sample_buffer::SampleBuffer;
