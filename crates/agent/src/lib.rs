//! Conversational orchestration for the Tontouma engine
//!
//! Ties the whole pipeline together: language routing, the translation
//! bridge, retrieval, the bounded tool-calling dialogue loop, and speech
//! synthesis, behind two entry points consumed by the transport layer:
//! [`Orchestrator::handle_text_message`] and
//! [`Orchestrator::handle_voice_message`].

pub mod bootstrap;
pub mod engine;
pub mod orchestrator;
pub mod store;

pub use bootstrap::{build_orchestrator, BootstrapError, EngineStores};
pub use engine::{DialogueEngine, DialogueRequest, EngineConfig, FALLBACK_REPLY, NO_CONTEXT_MARKER};
pub use orchestrator::{AgentError, ChatReply, Orchestrator, OrchestratorDeps};
pub use store::{MemoryEntityDirectory, MemorySessionStore};
