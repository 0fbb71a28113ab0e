use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use assistant_core::{AgentError, AgentEvent, SpeechError, SpeechToText, TextToSpeech};

use crate::orchestrator::{ConversationOrchestrator, Result};

/// Counters reported when the session loop ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub utterances: usize,
    pub answers: usize,
    pub unrecognized: usize,
    /// Transcripts dropped for lacking the activation phrase.
    pub ignored: usize,
    pub failed_turns: usize,
}

/// Listen, answer, speak, repeat.
///
/// Iterations never overlap. Per-iteration failures are reported as events
/// and the loop moves on; it only stops on cancellation or when the speech
/// input is closed.
pub struct SessionLoop {
    stt: Arc<dyn SpeechToText>,
    tts: Arc<dyn TextToSpeech>,
    orchestrator: Arc<ConversationOrchestrator>,
    event_tx: mpsc::Sender<AgentEvent>,
    activation_phrase: Option<String>,
}

impl SessionLoop {
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        tts: Arc<dyn TextToSpeech>,
        orchestrator: Arc<ConversationOrchestrator>,
        event_tx: mpsc::Sender<AgentEvent>,
    ) -> Self {
        Self {
            stt,
            tts,
            orchestrator,
            event_tx,
            activation_phrase: None,
        }
    }

    /// Only act on utterances that start with `phrase`. A bare phrase makes
    /// the loop listen once more for the actual question.
    pub fn with_activation_phrase(mut self, phrase: Option<String>) -> Self {
        self.activation_phrase = phrase
            .map(|phrase| phrase.trim().to_string())
            .filter(|phrase| !phrase.is_empty());
        self
    }

    pub async fn run(&self, cancel: CancellationToken) -> Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        log::info!("Session loop started");

        loop {
            match self.iteration(&cancel, &mut summary).await {
                Ok(()) => {}
                Err(error) if error.is_recoverable() => {
                    log::warn!("Iteration failed: {}", error);
                }
                Err(AgentError::Cancelled) => {
                    log::info!("Session loop cancelled");
                    break;
                }
                Err(AgentError::Speech(SpeechError::InputClosed)) => {
                    log::info!("Speech input closed, ending session");
                    break;
                }
                Err(error) => return Err(error),
            }
        }

        log::info!(
            "Session ended: utterances={}, answers={}, unrecognized={}, ignored={}, failed_turns={}",
            summary.utterances,
            summary.answers,
            summary.unrecognized,
            summary.ignored,
            summary.failed_turns
        );
        Ok(summary)
    }

    async fn iteration(
        &self,
        cancel: &CancellationToken,
        summary: &mut SessionSummary,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        self.emit(AgentEvent::Listening).await;

        let Some(heard) = self.hear(cancel, summary).await? else {
            return Ok(());
        };

        let utterance = match self.activation_phrase.as_deref() {
            None => heard,
            Some(phrase) => match strip_activation(&heard, phrase) {
                None => {
                    summary.ignored += 1;
                    log::debug!("Ignoring speech without activation phrase: {}", heard);
                    return Ok(());
                }
                Some(command) if !command.is_empty() => command.to_string(),
                Some(_) => {
                    self.emit(AgentEvent::Activated).await;
                    match self.hear(cancel, summary).await? {
                        Some(command) => command,
                        None => return Ok(()),
                    }
                }
            },
        };

        summary.utterances += 1;
        log::debug!("Transcribed: {}", utterance);
        self.emit(AgentEvent::Transcribed {
            text: utterance.clone(),
        })
        .await;

        let turn = tokio::select! {
            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            turn = self.orchestrator.run_turn(&utterance, &self.event_tx) => turn,
        };

        let answer = match turn {
            Ok(outcome) => outcome.answer,
            Err(error) => {
                summary.failed_turns += 1;
                self.emit(AgentEvent::TurnFailed {
                    message: error.to_string(),
                })
                .await;
                return Ok(());
            }
        };

        if answer.trim().is_empty() {
            log::warn!("Model returned an empty answer; nothing to speak");
            return Ok(());
        }

        summary.answers += 1;
        self.emit(AgentEvent::Answer {
            text: answer.clone(),
        })
        .await;

        let spoken = tokio::select! {
            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            spoken = self.tts.speak(&answer) => spoken,
        };

        if let Err(error) = spoken {
            self.emit(AgentEvent::SpeechFailed {
                message: error.to_string(),
            })
            .await;
        }

        Ok(())
    }

    /// One `listen()` call. `None` means the iteration has nothing to act on.
    async fn hear(
        &self,
        cancel: &CancellationToken,
        summary: &mut SessionSummary,
    ) -> Result<Option<String>> {
        let heard = tokio::select! {
            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            heard = self.stt.listen() => heard,
        };

        match heard {
            Ok(text) => Ok(Some(text)),
            Err(SpeechError::Unrecognized) => {
                summary.unrecognized += 1;
                self.emit(AgentEvent::Unrecognized).await;
                Ok(None)
            }
            Err(SpeechError::InputClosed) => Err(AgentError::Speech(SpeechError::InputClosed)),
            Err(error) => {
                self.emit(AgentEvent::SpeechFailed {
                    message: error.to_string(),
                })
                .await;
                Ok(None)
            }
        }
    }

    async fn emit(&self, event: AgentEvent) {
        let _ = self.event_tx.send(event).await;
    }
}

/// Returns what follows `phrase` at the start of `transcript`, compared
/// case-insensitively and on a word boundary.
fn strip_activation<'a>(transcript: &'a str, phrase: &str) -> Option<&'a str> {
    let text = transcript.trim_start();
    let mut chars = text.char_indices();
    for expected in phrase.chars() {
        let (_, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }

    let offset = chars.next().map_or(text.len(), |(index, _)| index);
    let rest = &text[offset..];
    if rest.starts_with(char::is_alphanumeric) {
        return None;
    }

    Some(
        rest.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '!' | '?' | ':' | ';'))
            .trim_end(),
    )
}
