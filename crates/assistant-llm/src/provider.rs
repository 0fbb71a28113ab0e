use assistant_core::{tools::ToolSchema, Message, TokenUsage, ToolCall};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, LLMError>;

/// One complete (non-streamed) model response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantReply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<TokenUsage>,
}

impl AssistantReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Converts the reply into the assistant message echoed back to the model.
    pub fn into_message(self) -> Message {
        let tool_calls = self
            .tool_calls
            .into_iter()
            .map(|mut call| {
                call.ensure_id();
                call
            })
            .collect();
        Message::assistant(self.content, Some(tool_calls))
    }
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Chat completion
    ///
    /// # Arguments
    /// * `messages` - Conversation so far
    /// * `tools` - Tools advertised for this call; empty means none
    /// * `max_output_tokens` - Maximum output tokens
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        max_output_tokens: Option<u32>,
    ) -> Result<AssistantReply>;
}
