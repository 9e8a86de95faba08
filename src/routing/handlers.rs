//! Category-specific response handlers.
//!
//! A handler prepends its persona instruction to the conversation and asks the
//! model for a reply. The instruction is rebuilt on every call and only ever
//! lives in the outgoing request, so switching handlers between turns cannot
//! leak one persona into the other's context.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::RouterConfig;
use crate::error::{LlmError, TurnError};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider, Role, TokenUsage};
use crate::routing::category::HandlerId;

const EMOTIONAL_INSTRUCTIONS: &str = "You are a compassionate therapist. \
Focus on the emotional aspects of the user's message. \
Show empathy, validate their feelings, and help them process their emotions. \
Ask thoughtful questions to help them explore their feelings more deeply. \
Avoid giving logical solutions unless explicitly asked.\n\n\
Start every answer with: As a therapist Assistant...";

const LOGICAL_INSTRUCTIONS: &str = "You are a purely logical assistant. \
Focus only on facts and information. \
Provide clear, concise answers based on logic and evidence. \
Do not address emotions or provide emotional support. \
Be direct and straightforward in your responses.\n\n\
Start every answer with: As a logical Assistant...";

/// Fixed instruction context for one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    pub handler: HandlerId,
    pub instructions: &'static str,
}

impl Persona {
    pub fn for_handler(handler: HandlerId) -> Self {
        let instructions = match handler {
            HandlerId::Emotional => EMOTIONAL_INSTRUCTIONS,
            HandlerId::Logical => LOGICAL_INSTRUCTIONS,
        };
        Self {
            handler,
            instructions,
        }
    }

    /// Instruction + history, as sent to the model.
    ///
    /// System messages already in the history are dropped so that exactly one
    /// instruction reaches the model.
    pub fn build_context(&self, history: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.instructions));
        messages.extend(
            history
                .iter()
                .filter(|m| m.role != Role::System)
                .cloned(),
        );
        messages
    }
}

/// A generated reply, not yet part of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerReply {
    pub message: ChatMessage,
    pub usage: TokenUsage,
}

/// Generates replies in one persona.
pub struct ResponseHandler {
    persona: Persona,
    llm: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl ResponseHandler {
    pub fn new(handler: HandlerId, llm: Arc<dyn LlmProvider>, config: &RouterConfig) -> Self {
        Self {
            persona: Persona::for_handler(handler),
            llm,
            temperature: config.generate_temperature,
            max_tokens: config.generate_max_tokens,
            timeout: config.generate_timeout,
        }
    }

    pub fn id(&self) -> HandlerId {
        self.persona.handler
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Generate the next assistant message for `history`.
    ///
    /// Reads the history, never modifies it.
    pub async fn respond(&self, history: &[ChatMessage]) -> Result<HandlerReply, TurnError> {
        let handler = self.id();
        let request = CompletionRequest::new(self.persona.build_context(history))
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let response = tokio::time::timeout(self.timeout, self.llm.complete(request))
            .await
            .map_err(|_| TurnError::GenerationFailure {
                handler,
                source: LlmError::Timeout {
                    provider: self.llm.model_name().to_string(),
                    after: self.timeout,
                },
            })?
            .map_err(|source| TurnError::GenerationFailure { handler, source })?;

        let content = response.content.trim();
        if content.is_empty() {
            return Err(TurnError::GenerationFailure {
                handler,
                source: LlmError::EmptyResponse {
                    provider: self.llm.model_name().to_string(),
                },
            });
        }

        debug!(
            handler = %handler,
            reply_len = content.len(),
            "Generated reply"
        );

        Ok(HandlerReply {
            message: ChatMessage::assistant(content),
            usage: response.usage(),
        })
    }
}

/// One handler per [`HandlerId`].
pub struct HandlerSet {
    emotional: ResponseHandler,
    logical: ResponseHandler,
}

impl HandlerSet {
    /// Both handlers sharing one provider.
    pub fn new(llm: Arc<dyn LlmProvider>, config: &RouterConfig) -> Self {
        Self {
            emotional: ResponseHandler::new(HandlerId::Emotional, llm.clone(), config),
            logical: ResponseHandler::new(HandlerId::Logical, llm, config),
        }
    }

    pub fn get(&self, id: HandlerId) -> &ResponseHandler {
        match id {
            HandlerId::Emotional => &self.emotional,
            HandlerId::Logical => &self.logical,
        }
    }
}
