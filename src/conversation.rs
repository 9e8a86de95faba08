//! Conversation state threaded through each turn.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::{ChatMessage, Role};
use crate::routing::{Category, HandlerId};

/// Message history plus the routing metadata of the latest turn.
///
/// Owned by exactly one session. History is append-only: the orchestrator adds
/// one assistant message per successful turn and the caller adds user
/// messages. System instructions never land here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Conversation ID, for log correlation.
    pub id: Uuid,
    messages: Vec<ChatMessage>,
    category: Option<Category>,
    target_handler: Option<HandlerId>,
    turns: u64,
}

impl ConversationState {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            ..Default::default()
        }
    }

    /// Full history, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Category assigned by the last successful turn.
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// Handler chosen by the last successful turn.
    pub fn target_handler(&self) -> Option<HandlerId> {
        self.target_handler
    }

    /// Number of successfully completed turns.
    pub fn turns(&self) -> u64 {
        self.turns
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a new user message, starting the next turn.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Most recent assistant reply, if any.
    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }

    /// Apply the results of a finished turn in one step.
    ///
    /// Category is written before the handler it routes to, and the reply is
    /// appended last. Nothing else in the crate writes these fields.
    pub(crate) fn commit_turn(&mut self, category: Category, handler: HandlerId, reply: ChatMessage) {
        debug_assert_eq!(reply.role, Role::Assistant);
        self.category = Some(category);
        self.target_handler = Some(handler);
        self.messages.push(reply);
        self.turns += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_empty_and_unrouted() {
        let state = ConversationState::new();
        assert!(state.is_empty());
        assert!(state.category().is_none());
        assert!(state.target_handler().is_none());
        assert_eq!(state.turns(), 0);
        assert!(state.last_message().is_none());
    }

    #[test]
    fn push_user_appends_in_order() {
        let mut state = ConversationState::new();
        state.push_user("first");
        state.push_user("second");
        assert_eq!(state.len(), 2);
        assert_eq!(state.messages()[0].content, "first");
        assert_eq!(state.last_message().unwrap().content, "second");
        assert_eq!(state.last_message().unwrap().role, Role::User);
    }

    #[test]
    fn commit_turn_sets_fields_and_appends() {
        let mut state = ConversationState::new();
        state.push_user("I feel anxious about my exam");
        state.commit_turn(
            Category::Emotional,
            HandlerId::Emotional,
            ChatMessage::assistant("That sounds hard."),
        );

        assert_eq!(state.len(), 2);
        assert_eq!(state.category(), Some(Category::Emotional));
        assert_eq!(state.target_handler(), Some(HandlerId::Emotional));
        assert_eq!(state.turns(), 1);
        assert_eq!(state.last_reply().unwrap().content, "That sounds hard.");
    }

    #[test]
    fn last_reply_skips_trailing_user_message() {
        let mut state = ConversationState::new();
        state.push_user("q1");
        state.commit_turn(
            Category::Logical,
            HandlerId::Logical,
            ChatMessage::assistant("a1"),
        );
        state.push_user("q2");
        assert_eq!(state.last_reply().unwrap().content, "a1");
    }

    #[test]
    fn state_serializes_with_lowercase_labels() {
        let mut state = ConversationState::new();
        state.push_user("hi");
        state.commit_turn(
            Category::Logical,
            HandlerId::Logical,
            ChatMessage::assistant("hello"),
        );
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["category"], "logical");
        assert_eq!(json["target_handler"], "logical");
        assert_eq!(json["messages"][1]["role"], "assistant");

        let back: ConversationState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
