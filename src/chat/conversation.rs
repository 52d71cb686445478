//! Rolling conversation state
//!
//! The context is the ordered message list sent to the completion service on
//! every turn; index 0 is always the active persona's system message. The
//! history is an append-only audit trail of raw request/response pairs, never
//! replayed. Both live for the process and are cleared together on reset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::persona::Persona;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single conversation message, immutable once appended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// The exact payload sent to the completion service
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

/// One audited exchange: the request sent and the raw payload received
#[derive(Debug)]
pub struct HistoryEntry {
    pub request: ChatRequest,
    pub response: serde_json::Value,
}

/// Context plus history for the active conversation
#[derive(Debug)]
pub struct Conversation {
    context: Vec<Message>,
    history: Vec<HistoryEntry>,
}

impl Conversation {
    /// Create a conversation seeded with the persona's system message
    #[must_use]
    pub fn new(persona: Persona, today: NaiveDate) -> Self {
        let mut conversation = Self {
            context: Vec::new(),
            history: Vec::new(),
        };
        conversation.reset(persona, today);
        conversation
    }

    /// Reset to a fresh conversation: one system message, empty history
    pub fn reset(&mut self, persona: Persona, today: NaiveDate) {
        self.context = vec![Message {
            role: Role::System,
            content: persona.system_prompt(today),
        }];
        self.history.clear();
    }

    /// Append the user message and build the request for this turn
    #[must_use]
    pub fn begin_turn(&mut self, model: &str, query: &str) -> ChatRequest {
        self.context.push(Message {
            role: Role::User,
            content: query.to_string(),
        });

        ChatRequest {
            model: model.to_string(),
            messages: self.context.clone(),
        }
    }

    /// Record a successful turn: append the assistant reply and audit the
    /// raw exchange
    pub fn complete_turn(&mut self, request: ChatRequest, reply: &str, raw: serde_json::Value) {
        self.context.push(Message {
            role: Role::Assistant,
            content: reply.to_string(),
        });
        self.history.push(HistoryEntry {
            request,
            response: raw,
        });
    }

    /// Roll back a failed turn so the context holds no dangling user message
    pub fn abort_turn(&mut self) {
        if matches!(self.context.last(), Some(m) if m.role == Role::User) {
            self.context.pop();
        }
    }

    /// The ordered message list for the next turn
    #[must_use]
    pub fn context(&self) -> &[Message] {
        &self.context
    }

    /// The audit trail of raw exchanges
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    #[test]
    fn new_conversation_holds_one_system_message() {
        let conversation = Conversation::new(Persona::Default, today());

        assert_eq!(conversation.context().len(), 1);
        assert_eq!(conversation.context()[0].role, Role::System);
        assert!(conversation.history().is_empty());
    }

    #[test]
    fn successful_turn_grows_context_by_two() {
        let mut conversation = Conversation::new(Persona::Default, today());

        let request = conversation.begin_turn("gpt-3.5-turbo", "Hello");
        conversation.complete_turn(request, "Hi there!", serde_json::json!({}));

        let context = conversation.context();
        assert_eq!(context.len(), 3);
        assert_eq!(context[1].role, Role::User);
        assert_eq!(context[1].content, "Hello");
        assert_eq!(context[2].role, Role::Assistant);
        assert_eq!(context[2].content, "Hi there!");
        assert_eq!(conversation.history().len(), 1);
    }

    #[test]
    fn request_carries_model_and_full_context() {
        let mut conversation = Conversation::new(Persona::Laconic, today());

        let request = conversation.begin_turn("gpt-4", "ping");

        assert_eq!(request.model, "gpt-4");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].content, "ping");
    }

    #[test]
    fn aborted_turn_leaves_state_unchanged() {
        let mut conversation = Conversation::new(Persona::Default, today());

        let _ = conversation.begin_turn("gpt-3.5-turbo", "Hello");
        conversation.abort_turn();

        assert_eq!(conversation.context().len(), 1);
        assert!(conversation.history().is_empty());
    }

    #[test]
    fn abort_without_pending_user_is_a_no_op() {
        let mut conversation = Conversation::new(Persona::Default, today());

        conversation.abort_turn();

        assert_eq!(conversation.context().len(), 1);
        assert_eq!(conversation.context()[0].role, Role::System);
    }

    #[test]
    fn reset_clears_prior_state() {
        let mut conversation = Conversation::new(Persona::Default, today());

        let request = conversation.begin_turn("gpt-3.5-turbo", "Hello");
        conversation.complete_turn(request, "Hi!", serde_json::json!({}));
        conversation.reset(Persona::Default, today());

        assert_eq!(conversation.context().len(), 1);
        assert_eq!(conversation.context()[0].role, Role::System);
        assert!(conversation.history().is_empty());
    }

    #[test]
    fn reset_is_idempotent_in_shape() {
        let mut conversation = Conversation::new(Persona::Default, today());
        let first = conversation.context()[0].content.clone();

        conversation.reset(Persona::Default, today());

        assert_eq!(conversation.context().len(), 1);
        assert_eq!(conversation.context()[0].content, first);
    }

    #[test]
    fn messages_serialize_with_lowercase_roles() {
        let message = Message {
            role: Role::Assistant,
            content: "hi".to_string(),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
