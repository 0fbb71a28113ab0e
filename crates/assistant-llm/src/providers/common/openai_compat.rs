//! OpenAI-compatible request serialization and response parsing.
//!
//! Any backend speaking the chat completions API (OpenAI, local servers,
//! proxies) accepts these bodies.

use assistant_core::{tools::ToolSchema, Message, TokenUsage, ToolCall};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::provider::{AssistantReply, LLMError, Result};

/// Convert internal [`Message`] values to an OpenAI-compatible JSON array.
pub fn messages_to_openai_compat_json(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| {
            let mut msg = json!({
                "role": m.role.as_str(),
                "content": m.content,
            });

            if let Some(tool_call_id) = &m.tool_call_id {
                msg["tool_call_id"] = json!(tool_call_id);
            }

            if let Some(name) = &m.name {
                msg["name"] = json!(name);
            }

            if let Some(tool_calls) = &m.tool_calls {
                msg["tool_calls"] = json!(tool_calls);
            }

            msg
        })
        .collect()
}

/// Convert internal [`ToolSchema`] values to the OpenAI `tools` array JSON.
pub fn tools_to_openai_compat_json(tools: &[ToolSchema]) -> Vec<Value> {
    tools.iter().map(|t| json!(t)).collect()
}

/// Build a non-streaming chat request body. `tools` is left out entirely
/// when empty so the model cannot request further calls.
pub fn build_openai_compat_body(
    model: &str,
    messages: &[Message],
    tools: &[ToolSchema],
    max_output_tokens: Option<u32>,
) -> Value {
    let mut body = json!({
        "model": model,
        "messages": messages_to_openai_compat_json(messages),
        "stream": false,
    });

    if !tools.is_empty() {
        body["tools"] = json!(tools_to_openai_compat_json(tools));
        body["tool_choice"] = json!("auto");
    }

    if let Some(max_tokens) = max_output_tokens {
        body["max_tokens"] = json!(max_tokens);
    }

    body
}

// --- OpenAI-compatible response parsing ---

#[derive(Debug, Deserialize)]
struct OpenAICompatResponse {
    #[serde(default)]
    choices: Vec<OpenAICompatChoice>,
    usage: Option<OpenAICompatUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatChoice {
    message: OpenAICompatMessage,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

/// Parse a chat completions response body into an [`AssistantReply`].
pub fn parse_openai_compat_response(body: &str) -> Result<AssistantReply> {
    let response: OpenAICompatResponse = serde_json::from_str(body)?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::Api("response contained no choices".to_string()))?;

    Ok(AssistantReply {
        content: choice.message.content.unwrap_or_default(),
        tool_calls: choice.message.tool_calls.unwrap_or_default(),
        usage: response.usage.map(|usage| TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::tools::FunctionSchema;

    fn weather_schema() -> ToolSchema {
        ToolSchema {
            schema_type: "function".to_string(),
            function: FunctionSchema {
                name: "get_weather".to_string(),
                description: "Weather".to_string(),
                parameters: json!({"type": "object", "properties": {}}),
            },
        }
    }

    #[test]
    fn body_without_tools_omits_tool_fields() {
        let body = build_openai_compat_body("gpt-4o-mini", &[Message::user("Hi")], &[], Some(64));

        assert_eq!(body["stream"], false);
        assert_eq!(body["max_tokens"], 64);
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn body_with_tools_advertises_them() {
        let body = build_openai_compat_body(
            "gpt-4o-mini",
            &[Message::user("Weather?")],
            &[weather_schema()],
            None,
        );

        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "get_weather");
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn tool_round_trip_messages_keep_correlation_fields() {
        let messages = vec![
            Message::assistant(
                "",
                Some(vec![ToolCall::new("call_1", "get_ip", "{}")]),
            ),
            Message::tool_result("call_1", "get_ip", r#"{"public_ip":"1.2.3.4"}"#),
        ];

        let json = messages_to_openai_compat_json(&messages);

        assert_eq!(json[0]["role"], "assistant");
        assert_eq!(json[0]["tool_calls"][0]["id"], "call_1");
        assert_eq!(json[0]["tool_calls"][0]["function"]["name"], "get_ip");
        assert_eq!(json[1]["role"], "tool");
        assert_eq!(json[1]["tool_call_id"], "call_1");
        assert_eq!(json[1]["name"], "get_ip");
    }

    #[test]
    fn parses_tool_call_response() {
        let body = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "get_weather", "arguments": "{\"latitude\":1}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 20, "completion_tokens": 5, "total_tokens": 25}
        }"#;

        let reply = parse_openai_compat_response(body).unwrap();

        assert_eq!(reply.content, "");
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].function.arguments, r#"{"latitude":1}"#);
        assert_eq!(reply.usage.unwrap().total_tokens, 25);
    }

    #[test]
    fn parses_text_response_without_usage() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hello"}}]}"#;
        let reply = parse_openai_compat_response(body).unwrap();

        assert_eq!(reply.content, "Hello");
        assert!(reply.tool_calls.is_empty());
        assert!(reply.usage.is_none());
    }

    #[test]
    fn empty_choices_is_an_api_error() {
        let error = parse_openai_compat_response(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(error, LLMError::Api(_)));
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        let error = parse_openai_compat_response("not json").unwrap_err();
        assert!(matches!(error, LLMError::Json(_)));
    }
}
