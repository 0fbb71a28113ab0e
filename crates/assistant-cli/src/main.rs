use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use assistant_core::ToolRegistry;
use assistant_llm::OpenAIProvider;
use assistant_loop::{ConversationOrchestrator, SessionLoop};
use assistant_speech::{
    create_speech_input, create_speech_output, ApiDefaults, InputMode, OutputMode,
};
use assistant_tools::builtin_registry;

mod config;
mod logging;
mod render;

use config::{CliOverrides, Config};
use logging::init_logging;
use render::spawn_renderer;

#[derive(Parser, Debug)]
#[command(name = "voice-assistant")]
#[command(about = "Voice assistant that answers with the help of live lookup tools")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Config file (default: ./config.toml, then ~/.voice-assistant/config.toml)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// LLM API base URL
    #[arg(long)]
    api_base: Option<String>,

    /// LLM model name
    #[arg(long)]
    model: Option<String>,

    /// Where utterances come from
    #[arg(long, value_enum)]
    input: Option<InputArg>,

    /// How answers are delivered
    #[arg(long, value_enum)]
    output: Option<OutputArg>,

    /// Model rounds that may request tools before the final answer
    #[arg(long)]
    max_tool_rounds: Option<usize>,

    /// Only answer utterances that start with this phrase
    #[arg(long)]
    activation_phrase: Option<String>,

    /// Run the tool calls of one round concurrently
    #[arg(long)]
    parallel_tools: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the listen → answer → speak loop until Ctrl-C or end of input (default)
    Listen,
    /// Answer a single question and exit
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Print the tool schemas advertised to the model
    Tools,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputArg {
    Console,
    Microphone,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputArg {
    Console,
    Voice,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            api_base: self.api_base.clone(),
            model: self.model.clone(),
            input: self.input.map(|input| match input {
                InputArg::Console => InputMode::Console,
                InputArg::Microphone => InputMode::Microphone,
            }),
            output: self.output.map(|output| match output {
                OutputArg::Console => OutputMode::Console,
                OutputArg::Voice => OutputMode::Voice,
            }),
            max_tool_rounds: self.max_tool_rounds,
            activation_phrase: self.activation_phrase.clone(),
            parallel_tools: self.parallel_tools,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let result = runtime.block_on(run(cli));
    // A console read may still be parked on stdin after Ctrl-C.
    runtime.shutdown_timeout(Duration::from_millis(200));
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    config.apply_cli(&cli.overrides());

    let registry = Arc::new(builtin_registry(&config.tools).context("failed to set up tools")?);
    log::info!("Registered tools: {}", registry.names().join(", "));

    match cli.command.unwrap_or(Command::Listen) {
        Command::Tools => print_tools(&registry),
        Command::Ask { question } => {
            config.validate()?;
            ask(&config, registry, &question.join(" ")).await
        }
        Command::Listen => {
            config.validate()?;
            listen(&config, registry).await
        }
    }
}

fn print_tools(registry: &ToolRegistry) -> anyhow::Result<()> {
    let schemas = registry.describe_all();
    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}

fn build_orchestrator(
    config: &Config,
    registry: Arc<ToolRegistry>,
) -> anyhow::Result<Arc<ConversationOrchestrator>> {
    let provider = OpenAIProvider::new(config.api_key())
        .with_base_url(&config.llm.api_base)
        .with_model(&config.llm.model)
        .with_timeout(Duration::from_secs(config.llm.timeout_secs))
        .context("failed to create LLM client")?;

    log::info!("LLM: {} at {}", provider.model(), config.llm.api_base);

    Ok(Arc::new(ConversationOrchestrator::new(
        Arc::new(provider),
        registry,
        config.turn.clone(),
    )))
}

async fn ask(config: &Config, registry: Arc<ToolRegistry>, question: &str) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(config, registry)?;
    let (event_tx, event_rx) = mpsc::channel(64);
    let renderer = spawn_renderer(event_rx, false);

    let outcome = orchestrator.run_turn(question, &event_tx).await;
    drop(event_tx);
    let _ = renderer.await;

    let outcome = outcome?;
    println!("{} {}", "Assistant:".green().bold(), outcome.answer);
    Ok(())
}

async fn listen(config: &Config, registry: Arc<ToolRegistry>) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(config, registry)?;

    let defaults = ApiDefaults {
        api_base: &config.llm.api_base,
        api_key: config.api_key(),
    };
    let stt = create_speech_input(&config.speech, &defaults)?;
    let tts = create_speech_output(&config.speech, &defaults)?;

    let (event_tx, event_rx) = mpsc::channel(64);
    let renderer = spawn_renderer(event_rx, config.speech.output == OutputMode::Voice);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Ctrl-C received, stopping");
            ctrl_c.cancel();
        }
    });

    println!("{}", "🤖 Voice assistant ready. Press Ctrl-C to quit.".cyan().bold());
    if let Some(phrase) = &config.speech.activation_phrase {
        println!("{}", format!("Start each question with \"{}\".", phrase).cyan());
    }

    let session = SessionLoop::new(stt, tts, orchestrator, event_tx)
        .with_activation_phrase(config.speech.activation_phrase.clone());
    let summary = session.run(cancel).await?;
    drop(session);
    let _ = renderer.await;

    println!(
        "{}",
        format!(
            "👋 Goodbye! {} question(s), {} answer(s), {} not understood, {} failed.",
            summary.utterances, summary.answers, summary.unrecognized, summary.failed_turns
        )
        .cyan()
    );
    Ok(())
}
