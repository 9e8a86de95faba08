//! Classify → route → respond pipeline.
//!
//! Each user turn flows through:
//! 1. `Classifier::classify()` — LLM labels the latest message
//! 2. `RoutingPolicy::route()` — pure label → handler mapping
//! 3. `ResponseHandler::respond()` — persona reply over the full history
//!
//! `Orchestrator` sequences the steps and commits the result to the
//! `ConversationState` only once the whole turn has succeeded.

pub mod category;
pub mod classifier;
pub mod handlers;
pub mod orchestrator;
pub mod router;

pub use category::{Category, HandlerId};
pub use classifier::Classifier;
pub use handlers::{HandlerSet, Persona, ResponseHandler};
pub use orchestrator::{Orchestrator, TurnOutcome, TurnPhase};
pub use router::{RoutingPolicy, route, route_label};
