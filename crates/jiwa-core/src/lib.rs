//! Session state, answer orchestration, streaming display, and the chat loop.

pub mod agent;
pub mod channel;
pub mod config;
pub mod orchestrator;
pub mod session;
pub mod streaming;
#[cfg(test)]
pub(crate) mod testing;
pub mod vault;

pub use agent::Agent;
pub use agent::error::AgentError;
pub use channel::{Channel, ChannelError, ChannelPreview};
pub use config::Config;
pub use orchestrator::{Answer, AnswerSource, Orchestrator, OrchestratorConfig, StreamSink};
pub use session::Session;
pub use streaming::{Clock, Frame, PreviewDisplay, StreamController, StreamState, SystemClock};
