use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{join_all, FutureExt};
use thiserror::Error;

use crate::tools::{
    normalize_tool_name, ToolCall, ToolCallResult, ToolFailureKind, ToolRegistry, ToolSchema,
};

#[derive(Error, Debug, Clone)]
pub enum ToolError {
    /// The lookup ran but had nothing to report.
    #[error("No results: {0}")]
    NotFound(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl ToolError {
    pub fn execution(message: impl Into<String>) -> Self {
        ToolError::Execution(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;

pub fn parse_tool_args(arguments: &str) -> Result<serde_json::Value> {
    let args_raw = arguments.trim();

    if args_raw.is_empty() {
        return Ok(serde_json::json!({}));
    }

    let args: serde_json::Value = serde_json::from_str(args_raw)
        .map_err(|error| ToolError::InvalidArguments(format!("Invalid JSON arguments: {error}")))?;

    if !args.is_object() {
        return Err(ToolError::InvalidArguments(
            "arguments must be a JSON object".to_string(),
        ));
    }

    Ok(args)
}

/// Dispatches model tool calls against the registry.
///
/// Every failure is turned into a [`ToolCallResult`]; nothing escapes
/// `invoke`, so one bad call never aborts the rest of a batch.
#[derive(Clone)]
pub struct ToolInvoker {
    registry: Arc<ToolRegistry>,
    parallel: bool,
}

impl ToolInvoker {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            parallel: false,
        }
    }

    /// Run the calls of one batch concurrently. Results are still returned
    /// in request order.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn describe_all(&self) -> Vec<ToolSchema> {
        self.registry.describe_all()
    }

    pub async fn invoke(&self, call: &ToolCall) -> ToolCallResult {
        let tool_name = normalize_tool_name(call.function.name.trim());

        let args = match parse_tool_args(&call.function.arguments) {
            Ok(args) => args,
            Err(error) => {
                log::warn!("[{}] {} rejected: {}", call.id, tool_name, error);
                return ToolCallResult::failure(
                    &call.id,
                    tool_name,
                    ToolFailureKind::MalformedArguments,
                    error.to_string(),
                );
            }
        };

        let Some(tool) = self.registry.resolve(tool_name) else {
            log::warn!("[{}] unknown tool requested: {}", call.id, tool_name);
            return ToolCallResult::failure(
                &call.id,
                tool_name,
                ToolFailureKind::UnknownTool,
                format!("Tool '{tool_name}' not found"),
            );
        };

        if let Err(reason) = tool.spec().validate_arguments(&args) {
            log::warn!("[{}] {} rejected: {}", call.id, tool_name, reason);
            return ToolCallResult::failure(
                &call.id,
                tool_name,
                ToolFailureKind::MalformedArguments,
                reason,
            );
        }

        log::debug!("[{}] executing {} with {}", call.id, tool_name, args);

        match AssertUnwindSafe(tool.execute(args)).catch_unwind().await {
            Ok(Ok(payload)) => ToolCallResult::success(&call.id, tool_name, payload),
            Ok(Err(error)) => {
                log::warn!("[{}] {} failed: {}", call.id, tool_name, error);
                ToolCallResult::failure(
                    &call.id,
                    tool_name,
                    ToolFailureKind::HandlerFailure,
                    error.to_string(),
                )
            }
            Err(_) => {
                log::error!("[{}] {} panicked", call.id, tool_name);
                ToolCallResult::failure(
                    &call.id,
                    tool_name,
                    ToolFailureKind::HandlerFailure,
                    format!("Tool '{tool_name}' panicked"),
                )
            }
        }
    }

    pub async fn invoke_batch(&self, calls: &[ToolCall]) -> Vec<ToolCallResult> {
        if self.parallel {
            return join_all(calls.iter().map(|call| self.invoke(call))).await;
        }

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.invoke(call).await);
        }
        results
    }
}
