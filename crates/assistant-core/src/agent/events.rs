use serde::{Deserialize, Serialize};

use crate::tools::ToolOutcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The session is waiting for the next utterance.
    Listening,

    Transcribed {
        text: String,
    },

    /// The activation phrase was heard on its own; the next utterance is the question.
    Activated,

    /// Speech input could not be turned into text; the turn is skipped.
    Unrecognized,

    ToolStart {
        tool_call_id: String,
        tool_name: String,
        arguments: serde_json::Value,
    },

    ToolComplete {
        tool_call_id: String,
        tool_name: String,
        outcome: ToolOutcome,
    },

    ToolError {
        tool_call_id: String,
        tool_name: String,
        error: String,
    },

    Answer {
        text: String,
    },

    TurnFailed {
        message: String,
    },

    SpeechFailed {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}
