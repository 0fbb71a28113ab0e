//! Speech input and output backends for the session loop.
//!
//! Console backends read and print plain text. The recorded/HTTP backends
//! capture audio with an external recorder, transcribe it through an
//! OpenAI-compatible audio API and play synthesized answers with an
//! external player.

pub mod command;
pub mod config;
pub mod console;
pub mod factory;
pub mod synthesizer;
pub mod transcriber;

pub use command::CommandTemplate;
pub use config::{InputMode, OutputMode, SpeechConfig};
pub use console::{ConsoleInput, ConsoleOutput};
pub use factory::{create_speech_input, create_speech_output, ApiDefaults};
pub use synthesizer::HttpSpeechSynthesizer;
pub use transcriber::RecordedTranscriber;
