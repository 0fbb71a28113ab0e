use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Typed lines on stdin.
    #[default]
    Console,
    /// Recorded audio, transcribed over HTTP.
    Microphone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Console,
    /// Synthesized over HTTP and played locally.
    Voice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub input: InputMode,
    pub output: OutputMode,
    /// Audio API base; falls back to the LLM API base when unset.
    pub api_base: Option<String>,
    /// Falls back to the LLM API key when unset.
    pub api_key: Option<String>,
    pub stt_model: String,
    pub language: Option<String>,
    pub tts_model: String,
    pub voice: String,
    pub recorder_command: String,
    pub player_command: String,
    /// Where synthesized audio is written before playback; system temp dir when unset.
    pub audio_dir: Option<PathBuf>,
    pub timeout_secs: u64,
    /// When set, only utterances starting with this phrase are answered.
    pub activation_phrase: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            input: InputMode::default(),
            output: OutputMode::default(),
            api_base: None,
            api_key: None,
            stt_model: "whisper-1".to_string(),
            language: Some("en".to_string()),
            tts_model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            recorder_command: "arecord -q -f S16_LE -r 16000 -c 1 -d 5 {path}".to_string(),
            player_command: "mpg321 -q {path}".to_string(),
            audio_dir: None,
            timeout_secs: 60,
            activation_phrase: None,
        }
    }
}
