pub mod agent;
pub mod speech;
pub mod tools;

pub use agent::events::{AgentEvent, TokenUsage};
pub use agent::types::{Message, Role};
pub use agent::AgentError;
pub use speech::{SpeechError, SpeechToText, TextToSpeech};
pub use tools::{
    normalize_tool_name, parse_tool_args, FunctionCall, FunctionSchema, ParameterKind,
    ParameterSpec, RegistryError, SharedTool, Tool, ToolCall, ToolCallResult, ToolError,
    ToolFailure, ToolFailureKind, ToolInvoker, ToolOutcome, ToolRegistry, ToolSchema, ToolSpec,
};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
