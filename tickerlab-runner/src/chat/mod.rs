//! Chat session with market-data context injection.

pub mod command;
pub mod context;
pub mod session;
pub mod transcript;

pub use command::{parse_command, Command};
pub use context::{ContextError, ContextSources};
pub use session::{run_repl, ChatSession, TurnOutcome};
pub use transcript::Transcript;
