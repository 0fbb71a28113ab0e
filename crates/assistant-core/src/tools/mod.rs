pub mod invoker;
pub mod registry;
pub mod result;
pub mod spec;
pub mod types;

pub use invoker::{parse_tool_args, ToolError, ToolInvoker};
pub use registry::{normalize_tool_name, RegistryError, SharedTool, Tool, ToolRegistry};
pub use result::{ToolCallResult, ToolFailure, ToolFailureKind, ToolOutcome};
pub use spec::{ParameterKind, ParameterSpec, ToolSpec};
pub use types::{FunctionCall, FunctionSchema, ToolCall, ToolSchema};
