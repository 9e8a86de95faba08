//! Turn orchestrator: fixed classify → route → respond graph.
//!
//! Phases: `Start → Classified → Routed → Responded → Terminal`. The only fork
//! is the handler picked by the router. Results are held locally and written
//! to the [`ConversationState`] in a single commit after the handler succeeds,
//! so an error or a dropped turn future leaves the state untouched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, info, info_span, warn};

use crate::config::RouterConfig;
use crate::conversation::ConversationState;
use crate::error::TurnError;
use crate::llm::{LlmProvider, TokenUsage};
use crate::routing::category::{Category, HandlerId};
use crate::routing::classifier::Classifier;
use crate::routing::handlers::HandlerSet;
use crate::routing::router::RoutingPolicy;

/// Phase of a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Start,
    Classified,
    Routed,
    Responded,
    Terminal,
}

impl TurnPhase {
    /// Each phase has exactly one successor; nothing is skipped or revisited.
    pub fn can_transition_to(&self, target: TurnPhase) -> bool {
        use TurnPhase::*;

        matches!(
            (self, target),
            (Start, Classified) | (Classified, Routed) | (Routed, Responded) | (Responded, Terminal)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::Classified => "classified",
            Self::Routed => "routed",
            Self::Responded => "responded",
            Self::Terminal => "terminal",
        };
        write!(f, "{s}")
    }
}

/// A phase transition event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: TurnPhase,
    pub to: TurnPhase,
    pub timestamp: DateTime<Utc>,
}

/// Phase history of one turn.
#[derive(Debug, Clone)]
struct TurnTrace {
    phase: TurnPhase,
    transitions: Vec<PhaseTransition>,
}

impl TurnTrace {
    fn new() -> Self {
        Self {
            phase: TurnPhase::Start,
            transitions: Vec::with_capacity(4),
        }
    }

    fn advance(&mut self, to: TurnPhase) {
        debug_assert!(
            self.phase.can_transition_to(to),
            "invalid turn transition {} -> {}",
            self.phase,
            to
        );
        self.transitions.push(PhaseTransition {
            from: self.phase,
            to,
            timestamp: Utc::now(),
        });
        self.phase = to;
    }
}

/// Result of a successful turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub category: Category,
    pub handler: HandlerId,
    /// The reply that was appended to the conversation.
    pub reply: String,
    /// Classifier and handler usage combined.
    pub usage: TokenUsage,
    /// Estimated USD cost of the turn.
    pub cost: Decimal,
    pub transitions: Vec<PhaseTransition>,
}

/// Runs turns against a conversation.
///
/// Holds no per-conversation state, so one orchestrator can serve many
/// conversations; each conversation's turns must still run one at a time,
/// which `&mut ConversationState` enforces.
pub struct Orchestrator {
    llm: Arc<dyn LlmProvider>,
    classifier: Classifier,
    policy: RoutingPolicy,
    handlers: HandlerSet,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self::from_config(llm, &RouterConfig::default())
    }

    pub fn from_config(llm: Arc<dyn LlmProvider>, config: &RouterConfig) -> Self {
        Self {
            classifier: Classifier::from_config(llm.clone(), config),
            policy: RoutingPolicy::new(config.default_category),
            handlers: HandlerSet::new(llm.clone(), config),
            llm,
        }
    }

    /// Append `content` as a user message, then run a turn on it.
    ///
    /// On failure the user message stays in history so the turn can be retried
    /// with [`Orchestrator::run_turn`] without re-adding it.
    pub async fn handle_message(
        &self,
        state: &mut ConversationState,
        content: impl Into<String>,
    ) -> Result<TurnOutcome, TurnError> {
        state.push_user(content);
        self.run_turn(state).await
    }

    /// Run one turn against the latest message in `state`.
    pub async fn run_turn(&self, state: &mut ConversationState) -> Result<TurnOutcome, TurnError> {
        let span = info_span!(
            "turn",
            conversation_id = %state.id,
            turn = state.turns() + 1
        );
        self.execute(state)
            .instrument(span)
            .await
            .inspect_err(|e| {
                warn!(
                    conversation_id = %state.id,
                    kind = e.kind(),
                    error = %e,
                    "Turn failed, conversation left unchanged"
                );
            })
    }

    async fn execute(&self, state: &mut ConversationState) -> Result<TurnOutcome, TurnError> {
        let mut trace = TurnTrace::new();
        let len_before = state.len();

        // Start → Classified
        let classification = self.classifier.classify(state.messages()).await?;
        trace.advance(TurnPhase::Classified);

        // Classified → Routed
        let handler_id = self.policy.route(Some(classification.category));
        trace.advance(TurnPhase::Routed);

        // Routed → Responded
        let reply = self.handlers.get(handler_id).respond(state.messages()).await?;
        trace.advance(TurnPhase::Responded);

        // Responded → Terminal: nothing has been written before this point.
        let reply_text = reply.message.content.clone();
        state.commit_turn(classification.category, handler_id, reply.message);
        trace.advance(TurnPhase::Terminal);
        debug_assert_eq!(state.len(), len_before + 1);

        let usage = classification.usage + reply.usage;
        let cost = usage.cost(self.llm.cost_per_token());

        info!(
            category = %classification.category,
            handler = %handler_id,
            tokens = usage.total(),
            cost = %cost,
            "Turn complete"
        );

        Ok(TurnOutcome {
            category: classification.category,
            handler: handler_id,
            reply: reply_text,
            usage,
            cost,
            transitions: trace.transitions,
        })
    }
}
