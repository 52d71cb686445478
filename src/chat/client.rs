//! Chat-completions client

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::chat::conversation::Conversation;
use crate::{Error, Result};

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODELS_URL: &str = "https://api.openai.com/v1/models";

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Drives conversation turns against the completion service
pub struct ChatClient {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
}

impl ChatClient {
    /// Create a new chat client
    #[must_use]
    pub fn new(api_key: SecretString, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// Perform one lightweight authenticated call to validate the API key
    ///
    /// # Errors
    ///
    /// Returns `Error::Chat` if the service rejects the key
    pub async fn probe(&self) -> Result<()> {
        let response = self
            .client
            .get(MODELS_URL)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "authentication probe failed");
            return Err(Error::Chat(format!("authentication failed ({status})")));
        }

        tracing::debug!("authentication probe succeeded");
        Ok(())
    }

    /// Run one conversation turn and return the assistant's reply
    ///
    /// Appends the user message, submits the full context, and appends the
    /// reply plus the audit entry. On failure the user message is rolled
    /// back so the conversation is exactly as it was before the call.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, a non-success API status, or a
    /// completion with no choices.
    pub async fn ask(&self, conversation: &mut Conversation, query: &str) -> Result<String> {
        let request = conversation.begin_turn(&self.model, query);
        tracing::debug!(model = %request.model, turns = request.messages.len(), "sending completion request");

        match self.complete(&request).await {
            Ok((reply, raw)) => {
                conversation.complete_turn(request, &reply, raw);
                Ok(reply)
            }
            Err(e) => {
                conversation.abort_turn();
                Err(e)
            }
        }
    }

    /// Submit a completion request and extract the first choice's content
    async fn complete(
        &self,
        request: &crate::chat::ChatRequest,
    ) -> Result<(String, serde_json::Value)> {
        let response = self
            .client
            .post(COMPLETIONS_URL)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "completion request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "completion API error");
            return Err(Error::Chat(format!("completion API error {status}: {body}")));
        }

        let raw: serde_json::Value = response.json().await?;
        let parsed: ChatCompletionResponse = serde_json::from_value(raw.clone())?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Chat("completion returned no choices".to_string()))?;

        Ok((reply, raw))
    }
}
