pub mod config;
pub mod orchestrator;
pub mod session;

pub use config::TurnConfig;
pub use orchestrator::{ConversationOrchestrator, TurnOutcome};
pub use session::{SessionLoop, SessionSummary};
