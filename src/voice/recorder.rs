//! Press-enter recording session
//!
//! One `record_query` call is one voice turn: open the microphone, capture
//! until the user presses enter, write the WAV artifact, transcribe it, and
//! hand back the transcript. The capture handle is created fresh inside each
//! call, so nothing is shared between turns. The stop trigger reads from a
//! caller-owned input stream so buffered bytes survive across turns.

use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::voice::capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
use crate::voice::stt::SpeechToText;
use crate::{Error, Result};

/// Transient WAV artifact written to the working directory between capture
/// and transcription
pub const TEMP_WAV_FILE: &str = "temp_output.wav";

/// Records voice queries and turns them into transcripts
pub struct Recorder {
    stt: SpeechToText,
    wav_path: PathBuf,
}

impl Recorder {
    /// Create a new recorder that transcribes through the given client
    #[must_use]
    pub fn new(stt: SpeechToText) -> Self {
        Self {
            stt,
            wav_path: PathBuf::from(TEMP_WAV_FILE),
        }
    }

    /// Record a single voice query and return its transcript
    ///
    /// Capture runs until a line arrives on `input` (the enter keypress).
    /// The captured samples are serialized to the WAV artifact, submitted
    /// whole to the transcription service, and the artifact is removed only
    /// after a successful response; on failure the file is kept so the
    /// audio is not lost.
    ///
    /// # Errors
    ///
    /// Returns error if the audio device fails, if stop arrives before any
    /// audio was captured, or if the artifact write or the transcription
    /// call fails.
    pub async fn record_query<R>(&self, input: &mut R) -> Result<String>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut capture = AudioCapture::open()?;

        println!("[Recording. Press enter to stop.]");
        capture.start()?;
        wait_for_enter(input).await?;
        capture.stop();

        let samples = capture.take_buffer();
        tracing::debug!(samples = samples.len(), "recording finished");

        let wav = encode_query(&samples)?;
        tokio::fs::write(&self.wav_path, &wav).await?;

        let audio = tokio::fs::read(&self.wav_path).await?;
        let transcript = match self.stt.transcribe(&audio).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    path = %self.wav_path.display(),
                    "transcription failed, keeping audio file"
                );
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::remove_file(&self.wav_path).await {
            tracing::warn!(
                path = %self.wav_path.display(),
                error = %e,
                "failed to remove audio file"
            );
        }

        Ok(transcript)
    }
}

/// Encode captured samples for submission
///
/// A stop that lands before the first capture callback leaves the buffer
/// empty; that is an error here, not an upload of a silent WAV.
fn encode_query(samples: &[f32]) -> Result<Vec<u8>> {
    if samples.is_empty() {
        return Err(Error::Audio(
            "recording stopped before any audio was captured".to_string(),
        ));
    }
    samples_to_wav(samples, SAMPLE_RATE)
}

/// Block until the next line arrives on the input stream
async fn wait_for_enter<R>(input: &mut R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    input.read_line(&mut line).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_capture_is_rejected_before_upload() {
        let err = encode_query(&[]).unwrap_err();
        assert!(matches!(err, Error::Audio(_)));
        assert!(err.to_string().contains("before any audio"));
    }

    #[test]
    fn captured_samples_encode_to_wav() {
        let wav = encode_query(&[0.0, 0.5, -0.5]).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
    }

    #[tokio::test]
    async fn wait_for_enter_consumes_one_line() {
        let mut input = std::io::Cursor::new(b"\nleftover".to_vec());
        wait_for_enter(&mut input).await.unwrap();

        let mut rest = String::new();
        input.read_line(&mut rest).await.unwrap();
        assert_eq!(rest, "leftover");
    }
}
