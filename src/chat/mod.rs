//! Conversation state and the chat-completions client

mod client;
mod conversation;

pub use client::ChatClient;
pub use conversation::{ChatRequest, Conversation, HistoryEntry, Message, Role};
