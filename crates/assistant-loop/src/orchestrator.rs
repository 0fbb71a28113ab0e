use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use assistant_core::tools::{
    normalize_tool_name, parse_tool_args, ToolInvoker, ToolRegistry, ToolSchema,
};
use assistant_core::{
    AgentError, AgentEvent, Message, TokenUsage, ToolCall, ToolCallResult, ToolOutcome,
};
use assistant_llm::{AssistantReply, LLMProvider};

use crate::config::TurnConfig;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnPhase {
    AwaitingFirstResponse,
    AwaitingSecondResponse,
    Done,
}

/// Result of one utterance's conversation turn.
#[derive(Debug, Clone, Default)]
pub struct TurnOutcome {
    pub answer: String,
    /// Every tool result of the turn, in request order.
    pub tool_results: Vec<ToolCallResult>,
    /// Number of model calls made (1 without tools, 2 for a tool round).
    pub model_turns: usize,
    pub usage: TokenUsage,
}

/// Drives the tool-calling protocol for a single utterance.
///
/// The first call advertises every registered tool. If the model requests
/// calls, they are executed and the results appended before the model is
/// asked again. Once `max_tool_rounds` is spent, the request goes out without
/// tools, so the turn always ends with plain text.
pub struct ConversationOrchestrator {
    llm: Arc<dyn LLMProvider>,
    invoker: ToolInvoker,
    config: TurnConfig,
}

impl ConversationOrchestrator {
    pub fn new(llm: Arc<dyn LLMProvider>, registry: Arc<ToolRegistry>, config: TurnConfig) -> Self {
        let invoker = ToolInvoker::new(registry).with_parallel(config.parallel_tool_calls);
        Self {
            llm,
            invoker,
            config,
        }
    }

    pub async fn run_turn(
        &self,
        utterance: &str,
        event_tx: &mpsc::Sender<AgentEvent>,
    ) -> Result<TurnOutcome> {
        let turn_id = format!("turn-{}", &Uuid::new_v4().simple().to_string()[..8]);
        let tool_schemas = self.invoker.describe_all();

        log::debug!(
            "[{}] Starting turn: utterance='{}', tools={}, max_tool_rounds={}",
            turn_id,
            utterance,
            tool_schemas.len(),
            self.config.max_tool_rounds
        );

        let mut messages = vec![
            Message::system(self.config.system_prompt.clone()),
            Message::user(utterance),
        ];
        let mut outcome = TurnOutcome::default();
        let mut phase = TurnPhase::AwaitingFirstResponse;
        let mut tool_rounds = 0;

        while phase != TurnPhase::Done {
            let advertise_tools = tool_rounds < self.config.max_tool_rounds;
            let offered: &[ToolSchema] = if advertise_tools { &tool_schemas[..] } else { &[] };

            let reply = self.request(&turn_id, phase, &messages, offered).await?;
            outcome.model_turns += 1;
            if let Some(usage) = reply.usage {
                outcome.usage.add(&usage);
            }

            if !reply.has_tool_calls() {
                outcome.answer = reply.content;
                phase = TurnPhase::Done;
                continue;
            }

            if !advertise_tools {
                log::warn!(
                    "[{}] Model requested {} tool call(s) after tools were withdrawn; using its text as the answer",
                    turn_id,
                    reply.tool_calls.len()
                );
                outcome.answer = reply.content;
                phase = TurnPhase::Done;
                continue;
            }

            let assistant_message = reply.into_message();
            let tool_calls = assistant_message.requested_tool_calls().to_vec();
            messages.push(assistant_message);

            let results = self.execute_tools(&turn_id, &tool_calls, event_tx).await;
            messages.extend(results.iter().map(ToolCallResult::to_message));
            outcome.tool_results.extend(results);

            tool_rounds += 1;
            phase = TurnPhase::AwaitingSecondResponse;
        }

        log::info!(
            "[{}] Turn completed: model_turns={}, tool_calls={}, tokens={}",
            turn_id,
            outcome.model_turns,
            outcome.tool_results.len(),
            outcome.usage.total_tokens
        );

        Ok(outcome)
    }

    async fn request(
        &self,
        turn_id: &str,
        phase: TurnPhase,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> Result<AssistantReply> {
        let timer = Timer::new(format!("llm_request ({:?})", phase));

        let reply = self
            .llm
            .chat(messages, tools, self.config.max_output_tokens)
            .await
            .map_err(|error| {
                log::error!("[{}] LLM request failed: {}", turn_id, error);
                AgentError::ModelCommunication(error.to_string())
            })?;

        timer.debug(turn_id);
        Ok(reply)
    }

    async fn execute_tools(
        &self,
        turn_id: &str,
        tool_calls: &[ToolCall],
        event_tx: &mpsc::Sender<AgentEvent>,
    ) -> Vec<ToolCallResult> {
        log::debug!("[{}] Executing {} tool call(s)", turn_id, tool_calls.len());

        for tool_call in tool_calls {
            let arguments = parse_tool_args(&tool_call.function.arguments)
                .unwrap_or_else(|_| Value::String(tool_call.function.arguments.clone()));
            send_event(
                event_tx,
                AgentEvent::ToolStart {
                    tool_call_id: tool_call.id.clone(),
                    tool_name: normalize_tool_name(tool_call.function.name.trim()).to_string(),
                    arguments,
                },
            )
            .await;
        }

        let timer = Timer::new("tool_batch");
        let results = self.invoker.invoke_batch(tool_calls).await;
        timer.debug(turn_id);

        for result in &results {
            let event = match &result.outcome {
                ToolOutcome::Success(_) => AgentEvent::ToolComplete {
                    tool_call_id: result.call_id.clone(),
                    tool_name: result.tool_name.clone(),
                    outcome: result.outcome.clone(),
                },
                ToolOutcome::Failure(failure) => {
                    log::warn!("[{}] Tool '{}' failed: {}", turn_id, result.tool_name, failure);
                    AgentEvent::ToolError {
                        tool_call_id: result.call_id.clone(),
                        tool_name: result.tool_name.clone(),
                        error: failure.to_string(),
                    }
                }
            };
            send_event(event_tx, event).await;
        }

        results
    }
}

async fn send_event(event_tx: &mpsc::Sender<AgentEvent>, event: AgentEvent) {
    let _ = event_tx.send(event).await;
}

struct Timer {
    name: String,
    start: std::time::Instant,
}

impl Timer {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: std::time::Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    fn debug(&self, turn_id: &str) {
        log::debug!(
            "[{}] {} completed in {}ms",
            turn_id,
            self.name,
            self.elapsed_ms()
        );
    }
}
