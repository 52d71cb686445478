//! Voice input
//!
//! Microphone capture, the press-enter recording session, and the
//! transcription client.

mod capture;
mod recorder;
mod stt;

pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use recorder::{Recorder, TEMP_WAV_FILE};
pub use stt::SpeechToText;
