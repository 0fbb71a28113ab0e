//! Layered configuration: TOML file, then environment, then command line.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use assistant_core::AgentError;
use assistant_loop::TurnConfig;
use assistant_speech::{InputMode, OutputMode, SpeechConfig};
use assistant_tools::ToolsConfig;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_PATH: &str = "config.toml";
const APP_DIR: &str = ".voice-assistant";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub turn: TurnConfig,
    pub tools: ToolsConfig,
    pub speech: SpeechConfig,
}

/// Values given on the command line; `None` leaves the configured value alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub input: Option<InputMode>,
    pub output: Option<OutputMode>,
    pub max_tool_rounds: Option<usize>,
    pub activation_phrase: Option<String>,
    pub parallel_tools: bool,
}

pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

pub fn parse_bool_env(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

impl Config {
    /// Reads `explicit` if given (it must exist), else `./config.toml`, else
    /// `~/.voice-assistant/config.toml`, else falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("config file {} does not exist", path.display());
                }
                Some(path.to_path_buf())
            }
            None => [PathBuf::from(CONFIG_FILE_PATH), app_dir().join(CONFIG_FILE_PATH)]
                .into_iter()
                .find(|candidate| candidate.exists()),
        };

        match path {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            None => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup("API_KEY") {
            self.llm.api_key = Some(api_key);
        }
        if let Some(api_base) = lookup("API_BASE") {
            self.llm.api_base = api_base;
        }
        if let Some(model) = lookup("MODEL") {
            self.llm.model = model;
        }
        if let Some(speech_key) = lookup("SPEECH_API_KEY") {
            self.speech.api_key = Some(speech_key);
        }
        if let Some(parallel) = lookup("PARALLEL_TOOL_CALLS") {
            self.turn.parallel_tool_calls = parse_bool_env(&parallel);
        }
    }

    pub fn apply_cli(&mut self, overrides: &CliOverrides) {
        if let Some(api_base) = &overrides.api_base {
            self.llm.api_base = api_base.clone();
        }
        if let Some(model) = &overrides.model {
            self.llm.model = model.clone();
        }
        if let Some(input) = overrides.input {
            self.speech.input = input;
        }
        if let Some(output) = overrides.output {
            self.speech.output = output;
        }
        if let Some(rounds) = overrides.max_tool_rounds {
            self.turn.max_tool_rounds = rounds;
        }
        if let Some(phrase) = &overrides.activation_phrase {
            self.speech.activation_phrase = Some(phrase.clone());
        }
        if overrides.parallel_tools {
            self.turn.parallel_tool_calls = true;
        }
    }

    /// Checks what talking to the model needs.
    pub fn validate(&self) -> Result<(), AgentError> {
        let invalid = |message: &str| -> Result<(), AgentError> {
            Err(AgentError::Config(message.to_string()))
        };

        if self.api_key().is_empty() {
            return invalid("no API key configured: set API_KEY or [llm].api_key");
        }
        if self.llm.api_base.trim().is_empty() {
            return invalid("[llm].api_base must not be empty");
        }
        if self.llm.model.trim().is_empty() {
            return invalid("[llm].model must not be empty");
        }
        if self.llm.timeout_secs == 0 || self.tools.http_timeout_secs == 0 {
            return invalid("timeouts must be at least one second");
        }
        if self.tools.crawl_max_bytes == 0 {
            return invalid("[tools].crawl_max_bytes must be positive");
        }
        Ok(())
    }

    pub fn api_key(&self) -> &str {
        self.llm.api_key.as_deref().unwrap_or_default().trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parse_bool_env_true_values() {
        for value in ["1", "true", "TRUE", " yes ", "Y", "on"] {
            assert!(parse_bool_env(value), "value {value:?} should be true");
        }
    }

    #[test]
    fn parse_bool_env_false_values() {
        for value in ["0", "false", "no", "off", "", "  "] {
            assert!(!parse_bool_env(value), "value {value:?} should be false");
        }
    }

    #[test]
    fn file_values_fill_sections_and_keep_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[llm]
api_key = "sk-file"
model = "gpt-4o"

[turn]
max_tool_rounds = 2

[tools]
http_timeout_secs = 5

[tools.endpoints]
weather = "http://localhost:9000"

[speech]
input = "microphone"
voice = "nova"
activation_phrase = "hey computer"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_base, "https://api.openai.com/v1");
        assert_eq!(config.turn.max_tool_rounds, 2);
        assert!(!config.turn.system_prompt.is_empty());
        assert_eq!(config.tools.http_timeout_secs, 5);
        assert_eq!(config.tools.endpoints.weather, "http://localhost:9000");
        assert_eq!(config.speech.input, InputMode::Microphone);
        assert_eq!(config.speech.voice, "nova");
        assert_eq!(config.speech.activation_phrase.as_deref(), Some("hey computer"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/definitely/not/here.toml"))).is_err());
    }

    #[test]
    fn precedence_is_file_then_env_then_cli() {
        let mut config: Config = toml::from_str(
            r#"
[llm]
api_key = "sk-file"
model = "file-model"
api_base = "http://file"
"#,
        )
        .unwrap();

        config.apply_env_overrides(env(&[
            ("API_KEY", "sk-env"),
            ("MODEL", "env-model"),
            ("PARALLEL_TOOL_CALLS", "yes"),
        ]));
        config.apply_cli(&CliOverrides {
            model: Some("cli-model".to_string()),
            output: Some(OutputMode::Voice),
            activation_phrase: Some("jarvis".to_string()),
            ..CliOverrides::default()
        });

        assert_eq!(config.api_key(), "sk-env");
        assert_eq!(config.llm.api_base, "http://file");
        assert_eq!(config.llm.model, "cli-model");
        assert!(config.turn.parallel_tool_calls);
        assert_eq!(config.speech.output, OutputMode::Voice);
        assert_eq!(config.speech.activation_phrase.as_deref(), Some("jarvis"));
    }

    #[test]
    fn validate_requires_api_key() {
        let mut config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(AgentError::Config(message)) if message.contains("API_KEY")
        ));

        config.apply_env_overrides(env(&[("API_KEY", "sk-test")]));
        assert!(config.validate().is_ok());
    }
}
