use thiserror::Error;

use crate::speech::SpeechError;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Either language-model round trip failed. Fatal to the current turn only.
    #[error("LLM error: {0}")]
    ModelCommunication(String),

    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cancelled")]
    Cancelled,
}

impl AgentError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            AgentError::ModelCommunication(_) => true,
            AgentError::Speech(error) => error.is_recoverable(),
            AgentError::Config(_) => false,
            AgentError::Cancelled => false,
        }
    }
}
