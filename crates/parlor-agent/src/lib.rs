//! Session orchestration for the Parlor voice agent.
//!
//! The orchestrator is configuration glue around the remote voice pipeline:
//! it resolves the provider selection and prompt material at startup,
//! prepares the LiveKit room (creation and a join token for the pipeline
//! participant), and drives the recording manager at the session
//! boundaries. The conversation itself — speech recognition, language-model
//! turns, synthesis — runs inside the remote pipeline and is out of scope
//! here.

pub mod config;
pub mod error;
pub mod prompts;
pub mod room;
pub mod session;

pub use config::{load_config, Config, ConfigError};
pub use error::AgentError;
pub use prompts::{load_prompts, PromptSet};
pub use room::RoomService;
pub use session::SessionRuntime;
