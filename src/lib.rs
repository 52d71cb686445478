//! Confab - voice-driven chat client for the terminal
//!
//! Records microphone audio, transcribes it via the Whisper API, sends the
//! transcript to the chat-completions API, and prints the reply, keeping a
//! rolling conversation context across turns.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                  Repl loop                      │
//! │   voice / text input  →  commands  →  print    │
//! └───────────┬────────────────────┬───────────────┘
//!             │                    │
//! ┌───────────▼──────────┐ ┌───────▼───────────────┐
//! │       Recorder        │ │      ChatClient       │
//! │  capture → WAV → STT  │ │  context → completion │
//! └───────────────────────┘ └───────────────────────┘
//! ```

pub mod chat;
pub mod config;
pub mod error;
pub mod persona;
pub mod repl;
pub mod voice;

pub use chat::{ChatClient, Conversation, HistoryEntry, Message, Role};
pub use config::{Config, Overrides};
pub use error::{Error, Result};
pub use persona::Persona;
pub use repl::{Command, Repl};
pub use voice::{AudioCapture, Recorder, SpeechToText};
