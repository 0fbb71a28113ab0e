use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly voice assistant. \
Answer briefly in one or two spoken sentences without markdown or lists. \
Use the available tools when the question needs current data such as the date, \
weather, location or facts from the web. Coordinates for the weather can come \
from the location tool.";

/// Configuration for one conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    pub system_prompt: String,
    /// Model rounds that may request tools before the final, tool-less call.
    /// `1` is the classic two-call turn.
    pub max_tool_rounds: usize,
    pub max_output_tokens: Option<u32>,
    /// Run the handlers of one batch concurrently.
    pub parallel_tool_calls: bool,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tool_rounds: 1,
            max_output_tokens: None,
            parallel_tool_calls: false,
        }
    }
}
