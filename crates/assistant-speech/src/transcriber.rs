//! Speech-to-text through an external recorder and an OpenAI-compatible
//! transcription endpoint.

use std::path::Path;
use std::time::Duration;

use assistant_core::{SpeechError, SpeechToText};
use async_trait::async_trait;
use serde_json::Value;

use crate::command::CommandTemplate;

pub struct RecordedTranscriber {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    language: Option<String>,
    recorder: CommandTemplate,
}

impl RecordedTranscriber {
    pub fn new(api_key: impl Into<String>, recorder: CommandTemplate) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "whisper-1".to_string(),
            language: None,
            recorder,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, SpeechError> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SpeechError::Recognition(format!("failed to create HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Uploads one WAV recording and returns the transcribed text.
    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<String, SpeechError> {
        let endpoint = format!("{}/audio/transcriptions", self.base_url);
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name("utterance.wav")
            .mime_str("audio/wav")
            .map_err(|e| SpeechError::Recognition(format!("invalid mime: {}", e)))?;
        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SpeechError::Recognition(format!("transcription request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SpeechError::Recognition(format!("failed to read transcription: {}", e)))?;
        if !status.is_success() {
            return Err(SpeechError::Recognition(format!(
                "transcription API error ({}): {}",
                status, body
            )));
        }

        let json: Value = serde_json::from_str(&body)
            .map_err(|e| SpeechError::Recognition(format!("invalid transcription response: {}", e)))?;
        Ok(json
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    async fn record(&self, path: &Path) -> Result<Vec<u8>, SpeechError> {
        self.recorder
            .run(path)
            .await
            .map_err(SpeechError::Recognition)?;
        Ok(tokio::fs::read(path).await?)
    }
}

#[async_trait]
impl SpeechToText for RecordedTranscriber {
    async fn listen(&self) -> Result<String, SpeechError> {
        let recording = tempfile::Builder::new()
            .prefix("utterance-")
            .suffix(".wav")
            .tempfile()?;

        let audio = self.record(recording.path()).await?;
        if audio.is_empty() {
            return Err(SpeechError::Unrecognized);
        }

        log::debug!("Recorded {} bytes of audio", audio.len());
        let text = self.transcribe(audio).await?;
        if text.is_empty() {
            return Err(SpeechError::Unrecognized);
        }
        Ok(text)
    }
}
