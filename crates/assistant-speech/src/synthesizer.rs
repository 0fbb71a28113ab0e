use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use assistant_core::{SpeechError, TextToSpeech};
use async_trait::async_trait;
use serde_json::json;

use crate::command::CommandTemplate;

/// Synthesizes answers through `/audio/speech` and plays the returned MP3.
pub struct HttpSpeechSynthesizer {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    voice: String,
    audio_dir: PathBuf,
    player: CommandTemplate,
}

impl HttpSpeechSynthesizer {
    pub fn new(api_key: impl Into<String>, player: CommandTemplate) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            audio_dir: std::env::temp_dir(),
            player,
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

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn with_audio_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.audio_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, SpeechError> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SpeechError::Synthesis(format!("failed to create HTTP client: {}", e)))?;
        Ok(self)
    }

    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let endpoint = format!("{}/audio/speech", self.base_url);
        let body = json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
            "response_format": "mp3",
        });

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SpeechError::Synthesis(format!("speech request failed: {}", e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Synthesis(format!("failed to read audio: {}", e)))?;
        if !status.is_success() {
            return Err(SpeechError::Synthesis(format!(
                "speech API error ({}): {}",
                status,
                String::from_utf8_lossy(&bytes)
            )));
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl TextToSpeech for HttpSpeechSynthesizer {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let audio = self.synthesize(text).await?;
        log::debug!("Synthesized {} bytes of audio", audio.len());

        // Removed again when `file` drops after playback.
        let mut file = tempfile::Builder::new()
            .prefix("answer-")
            .suffix(".mp3")
            .tempfile_in(&self.audio_dir)?;
        file.write_all(&audio)?;
        file.flush()?;

        self.player
            .run(file.path())
            .await
            .map_err(SpeechError::Synthesis)
    }
}
