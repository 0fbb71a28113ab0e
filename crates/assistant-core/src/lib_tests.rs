use super::*;

#[test]
fn test_message_creation() {
    let msg = Message::user("Hello");
    assert_eq!(msg.content, "Hello");
    assert!(matches!(msg.role, Role::User));
    assert!(msg.tool_calls.is_none());
}

#[test]
fn test_assistant_message_drops_empty_tool_calls() {
    let msg = Message::assistant("Hi", Some(vec![]));
    assert!(msg.tool_calls.is_none());
    assert!(msg.requested_tool_calls().is_empty());
}

#[test]
fn test_tool_call_creation() {
    let tool_call = ToolCall::new("call-1", "test_tool", r#"{"key": "value"}"#);

    assert_eq!(tool_call.id, "call-1");
    assert_eq!(tool_call.tool_type, "function");
    assert_eq!(tool_call.function.name, "test_tool");
}

#[test]
fn test_tool_call_ensure_id_fills_blank_ids() {
    let mut tool_call = ToolCall::new("", "get_ip", "{}");
    tool_call.ensure_id();
    assert!(tool_call.id.starts_with("call_"));

    let mut named = ToolCall::new("call_7", "get_ip", "{}");
    named.ensure_id();
    assert_eq!(named.id, "call_7");
}

#[test]
fn test_tool_call_deserializes_without_type() {
    let json = r#"{"id":"call_1","function":{"name":"get_ip","arguments":"{}"}}"#;
    let call: ToolCall = serde_json::from_str(json).unwrap();

    assert_eq!(call.tool_type, "function");
    assert_eq!(call.function.name, "get_ip");
}

#[test]
fn test_message_serialization_skips_empty_fields() {
    let msg = Message::system("Be brief");
    let json = serde_json::to_value(&msg).unwrap();

    assert_eq!(json["role"], "system");
    assert_eq!(json["content"], "Be brief");
    assert!(json.get("tool_calls").is_none());
    assert!(json.get("tool_call_id").is_none());
    assert!(json.get("name").is_none());
}

#[test]
fn test_agent_event_serialization() {
    let event = AgentEvent::ToolError {
        tool_call_id: "call_1".to_string(),
        tool_name: "get_weather".to_string(),
        error: "timeout".to_string(),
    };
    let json = serde_json::to_value(&event).unwrap();

    assert_eq!(json["type"], "tool_error");
    assert_eq!(json["tool_call_id"], "call_1");
}

#[test]
fn test_token_usage_accumulates() {
    let mut usage = TokenUsage::default();
    usage.add(&TokenUsage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    });
    usage.add(&TokenUsage {
        prompt_tokens: 1,
        completion_tokens: 2,
        total_tokens: 3,
    });

    assert_eq!(usage.total_tokens, 18);
    assert_eq!(usage.prompt_tokens, 11);
}

#[test]
fn test_agent_error_recoverability() {
    assert!(AgentError::ModelCommunication("down".to_string()).is_recoverable());
    assert!(AgentError::Speech(SpeechError::Unrecognized).is_recoverable());
    assert!(!AgentError::Speech(SpeechError::InputClosed).is_recoverable());
    assert!(!AgentError::Cancelled.is_recoverable());
}
