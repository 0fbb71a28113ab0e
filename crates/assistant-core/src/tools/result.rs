use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::agent::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFailureKind {
    /// The argument payload was not a valid JSON object for the tool.
    MalformedArguments,
    /// No tool with the requested name is registered.
    UnknownTool,
    /// The handler ran and reported an error.
    HandlerFailure,
}

impl fmt::Display for ToolFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ToolFailureKind::MalformedArguments => "malformed arguments",
            ToolFailureKind::UnknownTool => "unknown tool",
            ToolFailureKind::HandlerFailure => "handler failure",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub kind: ToolFailureKind,
    pub message: String,
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success(Value),
    Failure(ToolFailure),
}

/// Outcome of one tool call, keyed by the model's call id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub call_id: String,
    pub tool_name: String,
    pub outcome: ToolOutcome,
}

impl ToolCallResult {
    pub fn success(call_id: impl Into<String>, tool_name: impl Into<String>, payload: Value) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            outcome: ToolOutcome::Success(payload),
        }
    }

    pub fn failure(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        kind: ToolFailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            outcome: ToolOutcome::Failure(ToolFailure {
                kind,
                message: message.into(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Success(_))
    }

    pub fn failure_kind(&self) -> Option<ToolFailureKind> {
        match &self.outcome {
            ToolOutcome::Success(_) => None,
            ToolOutcome::Failure(failure) => Some(failure.kind),
        }
    }

    /// Content of the tool message handed back to the model. Failures are
    /// reported as data so the model can explain them to the user.
    pub fn to_message_content(&self) -> String {
        match &self.outcome {
            ToolOutcome::Success(payload) => payload.to_string(),
            ToolOutcome::Failure(failure) => json!({
                "error": {
                    "kind": failure.kind,
                    "message": failure.message,
                }
            })
            .to_string(),
        }
    }

    pub fn to_message(&self) -> Message {
        Message::tool_result(
            self.call_id.clone(),
            self.tool_name.clone(),
            self.to_message_content(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Role;

    #[test]
    fn success_content_is_the_payload() {
        let result = ToolCallResult::success("call_1", "get_ip", json!({"public_ip": "1.2.3.4"}));

        assert!(result.is_success());
        assert_eq!(result.failure_kind(), None);
        assert_eq!(result.to_message_content(), r#"{"public_ip":"1.2.3.4"}"#);
    }

    #[test]
    fn failure_content_carries_kind_and_message() {
        let result = ToolCallResult::failure(
            "call_2",
            "get_weather",
            ToolFailureKind::HandlerFailure,
            "operation timed out",
        );

        let content: Value = serde_json::from_str(&result.to_message_content()).unwrap();
        assert_eq!(content["error"]["kind"], "handler_failure");
        assert_eq!(content["error"]["message"], "operation timed out");
    }

    #[test]
    fn to_message_preserves_call_id_and_name() {
        let message =
            ToolCallResult::failure("call_9", "nope", ToolFailureKind::UnknownTool, "missing")
                .to_message();

        assert_eq!(message.role, Role::Tool);
        assert_eq!(message.tool_call_id.as_deref(), Some("call_9"));
        assert_eq!(message.name.as_deref(), Some("nope"));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = ToolOutcome::Failure(ToolFailure {
            kind: ToolFailureKind::MalformedArguments,
            message: "bad".to_string(),
        });

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "failure");
        assert_eq!(value["payload"]["kind"], "malformed_arguments");
    }
}
