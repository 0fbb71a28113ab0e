//! Full listen → answer → speak iterations against a mock chat completions API.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assistant_core::tools::ToolRegistry;
use assistant_core::{AgentEvent, SpeechError, SpeechToText, TextToSpeech};
use assistant_llm::OpenAIProvider;
use assistant_loop::{ConversationOrchestrator, SessionLoop, TurnConfig};
use assistant_tools::{GetCurrentDateTool, GetWeatherTool, LookupClient};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

struct ScriptedInput {
    utterances: Mutex<VecDeque<Result<String, SpeechError>>>,
}

impl ScriptedInput {
    fn new(utterances: Vec<Result<String, SpeechError>>) -> Arc<Self> {
        Arc::new(Self {
            utterances: Mutex::new(utterances.into()),
        })
    }
}

#[async_trait]
impl SpeechToText for ScriptedInput {
    async fn listen(&self) -> Result<String, SpeechError> {
        self.utterances
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SpeechError::InputClosed))
    }
}

#[derive(Default)]
struct CapturedSpeech {
    spoken: Mutex<Vec<String>>,
}

#[async_trait]
impl TextToSpeech for CapturedSpeech {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Plays the model: asks for one tool on the first call, then phrases an
/// answer from whatever the tool message contains.
struct ToolThenAnswer {
    tool_name: &'static str,
    arguments: &'static str,
}

impl Respond for ToolThenAnswer {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let messages = body["messages"].as_array().unwrap();

        let tool_message = messages.iter().find(|m| m["role"] == "tool");
        let message = match tool_message {
            None => json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": self.tool_name, "arguments": self.arguments}
                }]
            }),
            Some(tool) => {
                assert!(body.get("tools").is_none(), "second call must not offer tools");
                let content: Value =
                    serde_json::from_str(tool["content"].as_str().unwrap()).unwrap();
                let text = match content.get("error") {
                    Some(_) => "Sorry, I could not retrieve the weather right now.".to_string(),
                    None => format!("Today is {}.", content["date"].as_str().unwrap_or("?")),
                };
                json!({"role": "assistant", "content": text})
            }
        };

        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": message, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
    }
}

async fn mount_model(server: &MockServer, responder: ToolThenAnswer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(responder)
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn registry(weather_base: &str, weather_timeout: Duration) -> Arc<ToolRegistry> {
    let http = reqwest::Client::builder()
        .timeout(weather_timeout)
        .build()
        .unwrap();

    let mut registry = ToolRegistry::new();
    registry.register(GetCurrentDateTool::new()).unwrap();
    registry
        .register(GetWeatherTool::new(
            LookupClient::from_client(http),
            weather_base,
        ))
        .unwrap();
    Arc::new(registry)
}

fn session(
    model_uri: String,
    registry: Arc<ToolRegistry>,
    input: Arc<ScriptedInput>,
    output: Arc<CapturedSpeech>,
) -> (SessionLoop, mpsc::Receiver<AgentEvent>) {
    let llm = Arc::new(OpenAIProvider::new("sk-test").with_base_url(model_uri));
    let orchestrator = Arc::new(ConversationOrchestrator::new(
        llm,
        registry,
        TurnConfig::default(),
    ));
    let (tx, rx) = mpsc::channel(128);
    (SessionLoop::new(input, output, orchestrator, tx), rx)
}

async fn drain(session: SessionLoop, mut rx: mpsc::Receiver<AgentEvent>) -> Vec<AgentEvent> {
    drop(session);
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn time_question_is_answered_with_the_current_date() {
    let model = MockServer::start().await;
    mount_model(
        &model,
        ToolThenAnswer {
            tool_name: "get_current_date",
            arguments: "",
        },
        2,
    )
    .await;

    let input = ScriptedInput::new(vec![Ok("what time is it".to_string())]);
    let output = Arc::new(CapturedSpeech::default());
    let (session, rx) = session(
        model.uri(),
        registry("http://127.0.0.1:9", Duration::from_secs(1)),
        input,
        output.clone(),
    );

    let summary = session.run(CancellationToken::new()).await.unwrap();
    assert_eq!(summary.answers, 1);

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let spoken = output.spoken.lock().unwrap().clone();
    assert_eq!(spoken.len(), 1);
    assert!(spoken[0].contains(&today), "answer was: {}", spoken[0]);

    let events = drain(session, rx).await;
    assert!(events.iter().any(|e| matches!(
        e,
        AgentEvent::ToolComplete { tool_name, .. } if tool_name == "get_current_date"
    )));
}

#[tokio::test]
async fn unintelligible_speech_skips_the_model() {
    let model = MockServer::start().await;
    mount_model(
        &model,
        ToolThenAnswer {
            tool_name: "get_current_date",
            arguments: "{}",
        },
        0,
    )
    .await;

    let input = ScriptedInput::new(vec![Err(SpeechError::Unrecognized)]);
    let output = Arc::new(CapturedSpeech::default());
    let (session, rx) = session(
        model.uri(),
        registry("http://127.0.0.1:9", Duration::from_secs(1)),
        input,
        output.clone(),
    );

    let summary = session.run(CancellationToken::new()).await.unwrap();

    assert_eq!(summary.unrecognized, 1);
    assert_eq!(summary.utterances, 0);
    assert!(output.spoken.lock().unwrap().is_empty());

    let events = drain(session, rx).await;
    let unrecognized = events
        .iter()
        .filter(|e| matches!(e, AgentEvent::Unrecognized))
        .count();
    assert_eq!(unrecognized, 1);
    // Listening again after the skip, then the input closes.
    let listening = events
        .iter()
        .filter(|e| matches!(e, AgentEvent::Listening))
        .count();
    assert_eq!(listening, 2);
}

#[tokio::test]
async fn weather_timeout_still_produces_an_answer() {
    let model = MockServer::start().await;
    mount_model(
        &model,
        ToolThenAnswer {
            tool_name: "get_weather",
            arguments: r#"{"latitude": 52.5, "longitude": 13.4}"#,
        },
        2,
    )
    .await;

    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"current": {}}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&weather)
        .await;

    let input = ScriptedInput::new(vec![Ok("how is the weather in Berlin".to_string())]);
    let output = Arc::new(CapturedSpeech::default());
    let (session, rx) = session(
        model.uri(),
        registry(&weather.uri(), Duration::from_millis(200)),
        input,
        output.clone(),
    );

    let summary = session.run(CancellationToken::new()).await.unwrap();
    assert_eq!(summary.answers, 1);
    assert_eq!(summary.failed_turns, 0);

    let spoken = output.spoken.lock().unwrap().clone();
    assert_eq!(
        spoken,
        vec!["Sorry, I could not retrieve the weather right now.".to_string()]
    );

    let events = drain(session, rx).await;
    assert!(events.iter().any(|e| matches!(
        e,
        AgentEvent::ToolError { tool_name, error, .. }
            if tool_name == "get_weather" && error.contains("timed out")
    )));
}
