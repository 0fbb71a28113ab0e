pub mod provider;
pub mod providers;

pub use provider::{AssistantReply, LLMError, LLMProvider, Result};
pub use providers::OpenAIProvider;
