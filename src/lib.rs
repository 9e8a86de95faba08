//! Intent router: classify each user turn and answer it with a matching persona.

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod routing;
pub mod session;
