//! Builds the speech backends selected in [`SpeechConfig`].

use std::sync::Arc;
use std::time::Duration;

use assistant_core::{SpeechError, SpeechToText, TextToSpeech};

use crate::command::CommandTemplate;
use crate::config::{InputMode, OutputMode, SpeechConfig};
use crate::console::{ConsoleInput, ConsoleOutput};
use crate::synthesizer::HttpSpeechSynthesizer;
use crate::transcriber::RecordedTranscriber;

/// API settings shared with the language model, used when the speech
/// section leaves them unset.
pub struct ApiDefaults<'a> {
    pub api_base: &'a str,
    pub api_key: &'a str,
}

fn resolve<'a>(config: &'a SpeechConfig, defaults: &ApiDefaults<'a>) -> (&'a str, &'a str) {
    (
        config.api_base.as_deref().unwrap_or(defaults.api_base),
        config.api_key.as_deref().unwrap_or(defaults.api_key),
    )
}

pub fn create_speech_input(
    config: &SpeechConfig,
    defaults: &ApiDefaults<'_>,
) -> Result<Arc<dyn SpeechToText>, SpeechError> {
    match config.input {
        InputMode::Console => Ok(Arc::new(ConsoleInput::stdin())),
        InputMode::Microphone => {
            let (api_base, api_key) = resolve(config, defaults);
            let recorder =
                CommandTemplate::parse(&config.recorder_command).map_err(SpeechError::Recognition)?;
            log::info!("Speech input: recorder '{}' + {}", recorder.program(), config.stt_model);

            let transcriber = RecordedTranscriber::new(api_key, recorder)
                .with_base_url(api_base)
                .with_model(&config.stt_model)
                .with_language(config.language.clone())
                .with_timeout(Duration::from_secs(config.timeout_secs))?;
            Ok(Arc::new(transcriber))
        }
    }
}

pub fn create_speech_output(
    config: &SpeechConfig,
    defaults: &ApiDefaults<'_>,
) -> Result<Arc<dyn TextToSpeech>, SpeechError> {
    match config.output {
        OutputMode::Console => Ok(Arc::new(ConsoleOutput::stdout())),
        OutputMode::Voice => {
            let (api_base, api_key) = resolve(config, defaults);
            let player =
                CommandTemplate::parse(&config.player_command).map_err(SpeechError::Synthesis)?;
            log::info!(
                "Speech output: {} voice '{}' via '{}'",
                config.tts_model,
                config.voice,
                player.program()
            );

            let mut synthesizer = HttpSpeechSynthesizer::new(api_key, player)
                .with_base_url(api_base)
                .with_model(&config.tts_model)
                .with_voice(&config.voice)
                .with_timeout(Duration::from_secs(config.timeout_secs))?;
            if let Some(dir) = &config.audio_dir {
                std::fs::create_dir_all(dir)?;
                synthesizer = synthesizer.with_audio_dir(dir);
            }
            Ok(Arc::new(synthesizer))
        }
    }
}
