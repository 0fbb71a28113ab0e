use assistant_core::{AgentEvent, ToolOutcome};
use colored::Colorize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Formats one event for the terminal. Answers are only echoed when the
/// speech output does not print them itself.
pub fn render_event(event: &AgentEvent, echo_answers: bool) -> Option<String> {
    let line = match event {
        AgentEvent::Listening => "🎤 Listening...".dimmed().to_string(),
        AgentEvent::Transcribed { text } => format!("{} {}", "You:".cyan().bold(), text),
        AgentEvent::Activated => "👂 Yes?".cyan().to_string(),
        AgentEvent::Unrecognized => "🤷 Sorry, I did not understand that.".yellow().to_string(),
        AgentEvent::ToolStart {
            tool_name,
            arguments,
            ..
        } => format!("🔧 {} {}", tool_name, arguments).cyan().to_string(),
        AgentEvent::ToolComplete {
            tool_name, outcome, ..
        } => match outcome {
            ToolOutcome::Success(payload) => {
                format!("✅ {}: {}", tool_name, payload).green().to_string()
            }
            ToolOutcome::Failure(failure) => {
                format!("❌ {}: {}", tool_name, failure).red().to_string()
            }
        },
        AgentEvent::ToolError {
            tool_name, error, ..
        } => format!("❌ {}: {}", tool_name, error).red().to_string(),
        AgentEvent::Answer { text } => {
            if !echo_answers {
                return None;
            }
            format!("{} {}", "Assistant:".green().bold(), text)
        }
        AgentEvent::TurnFailed { message } => {
            format!("❌ Could not answer: {}", message).red().to_string()
        }
        AgentEvent::SpeechFailed { message } => {
            format!("🔇 Speech error: {}", message).red().to_string()
        }
    };
    Some(line)
}

pub fn spawn_renderer(mut rx: mpsc::Receiver<AgentEvent>, echo_answers: bool) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(line) = render_event(&event, echo_answers) {
                println!("{}", line);
            }
        }
    })
}
