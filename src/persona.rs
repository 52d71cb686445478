//! Persona presets
//!
//! A persona is a preset system-role instruction string that establishes the
//! assistant's behavior and tone. It is resolved once at startup (flag, env,
//! or config file) and seeds the context on every conversation reset.

use chrono::NaiveDate;
use serde::Deserialize;

/// Knowledge cutoff date substituted into the default prompt
pub const KNOWLEDGE_CUTOFF: &str = "2021-09-01";

/// Selectable persona presets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Persona {
    /// Concise general-purpose assistant
    #[default]
    Default,
    /// Plain helpful assistant
    Helpful,
    /// Teaching assistant that explains at length and checks understanding
    GreatDepth,
    /// Brief, to-the-point answers with no elaboration
    Laconic,
}

impl Persona {
    /// Build the system message for this persona
    ///
    /// The prompt is a fixed template collapsed to a single line; the default
    /// persona embeds the knowledge cutoff and the supplied date.
    #[must_use]
    pub fn system_prompt(self, today: NaiveDate) -> String {
        match self {
            Self::Default => collapse(&format!(
                "You are ChatGPT, a large language model trained by OpenAI.
                 Answer as concisely as possible.
                 Knowledge cutoff: {KNOWLEDGE_CUTOFF}
                 Current date: {today}"
            )),
            Self::Helpful => collapse("You are a helpful assistant."),
            Self::GreatDepth => collapse(
                "You are a friendly and helpful teaching assistant.
                 You explain concepts in great depth using simple terms, and you
                 give examples to help people learn.
                 At the end of each explanation, you ask a question to check for
                 understanding.",
            ),
            Self::Laconic => collapse(
                "You are a laconic assistant. You reply with brief, to-the-point
                 answers with no elaboration.",
            ),
        }
    }
}

/// Collapse a multi-line template into a single space-separated line
fn collapse(template: &str) -> String {
    template.split_whitespace().collect::<Vec<_>>().join(" ")
}
