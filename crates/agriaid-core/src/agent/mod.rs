//! Model-facing side of a turn: context window, system prompt, and the
//! bounded agent/tools loop.

pub mod orchestrator;
pub mod prompt;
pub mod window;

pub use orchestrator::{LoopOutcome, OrchestratorError, OrchestratorResult, ToolOrchestrator};
pub use prompt::SystemPromptBuilder;
pub use window::ConversationWindow;
