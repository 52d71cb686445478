//! Interactive conversation loop
//!
//! Drives AwaitingInput → Processing turns until the user exits. Queries come
//! either from the recorder (voice mode) or straight from stdin (text mode);
//! the mode is fixed at startup. Besides the two reserved commands there is
//! no invalid input: everything else goes to the model as-is.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

use crate::chat::{ChatClient, Conversation};
use crate::persona::Persona;
use crate::voice::Recorder;
use crate::Result;

/// What to do with a line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a new conversation
    Reset,
    /// Leave the loop
    Terminate,
    /// An ordinary query for the model
    Query(String),
}

impl Command {
    /// Interpret user input
    ///
    /// Matching is case-insensitive and tolerates a single trailing `.` or
    /// `!` on the reserved words; anything else is a query.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "new" | "new." | "new!" => Self::Reset,
            "exit" | "exit." | "exit!" => Self::Terminate,
            _ => Self::Query(trimmed.to_string()),
        }
    }
}

/// The interactive loop
///
/// Holds the single stdin reader for the whole session: building a fresh
/// buffered reader per line would discard whatever the previous read
/// buffered past its newline, losing typed-ahead input between turns.
pub struct Repl {
    chat: ChatClient,
    recorder: Option<Recorder>,
    conversation: Conversation,
    persona: Persona,
    input: BufReader<Stdin>,
}

impl Repl {
    /// Create a loop over a freshly seeded conversation
    ///
    /// `recorder` selects voice mode; `None` reads queries from stdin.
    #[must_use]
    pub fn new(chat: ChatClient, recorder: Option<Recorder>, persona: Persona) -> Self {
        Self {
            chat,
            recorder,
            conversation: Conversation::new(persona, today()),
            persona,
            input: BufReader::new(tokio::io::stdin()),
        }
    }

    /// Run until the user exits or stdin closes
    ///
    /// # Errors
    ///
    /// Service failures propagate out unhandled; there is no retry.
    pub async fn run(&mut self) -> Result<()> {
        print_banner();

        loop {
            let Some(input) = self.next_input().await? else {
                tracing::debug!("input closed, leaving loop");
                break;
            };

            match Command::parse(&input) {
                Command::Reset => {
                    self.conversation.reset(self.persona, today());
                    print_banner();
                }
                Command::Terminate => break,
                Command::Query(query) => {
                    if query.is_empty() {
                        continue;
                    }
                    let reply = self.chat.ask(&mut self.conversation, &query).await?;
                    println!("\nAssistant: {reply}\n");
                }
            }
        }

        Ok(())
    }

    /// Obtain the next query, or `None` once stdin is closed
    async fn next_input(&mut self) -> Result<Option<String>> {
        if let Some(recorder) = &self.recorder {
            println!("User: ");
            let transcript = recorder.record_query(&mut self.input).await?;
            println!("{}", transcript.trim());
            return Ok(Some(transcript));
        }

        print!("User: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        let bytes = self.input.read_line(&mut line).await?;
        if bytes == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    /// The live conversation state
    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

/// Today's date for persona prompt substitution
fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn print_banner() {
    println!();
    println!("Starting a new conversation.");
    println!("Input \"new\" to begin a new conversation.");
    println!("Input \"exit\" to terminate the conversation.");
    println!();
}
