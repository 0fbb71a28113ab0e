//! Narrow interfaces to the speech collaborators of the session loop.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeechError {
    /// Nothing intelligible was heard.
    #[error("speech could not be recognized")]
    Unrecognized,

    /// The input source is exhausted (e.g. end of console input).
    #[error("speech input closed")]
    InputClosed,

    #[error("recognition failed: {0}")]
    Recognition(String),

    #[error("synthesis failed: {0}")]
    Synthesis(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpeechError {
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SpeechError::InputClosed)
    }
}

#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Blocks until one utterance has been captured and transcribed.
    async fn listen(&self) -> Result<String, SpeechError>;
}

#[async_trait]
pub trait TextToSpeech: Send + Sync {
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;
}
