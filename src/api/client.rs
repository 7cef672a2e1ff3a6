// src/api/client.rs

use super::errors::CompletionError;
use crate::models::{ChatMessage, CompletionOptions, ParsedResult};
use crate::parser;
use reqwest::Client;
use serde_json::{json, Value};

/// Client for an OpenAI-style chat completions endpoint.
pub struct CompletionClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CompletionClient {
    /// Creates a new `CompletionClient`.
    pub fn new(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Sends the messages and returns the raw text of the first choice.
    pub async fn send(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        log::debug!(
            "Sending {} message(s) to {} with model {}",
            messages.len(),
            self.base_url,
            options.model
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": options.model,
                "messages": messages,
                "max_tokens": options.max_tokens,
                "temperature": options.temperature,
                "top_p": options.top_p,
                "frequency_penalty": options.frequency_penalty,
                "presence_penalty": options.presence_penalty,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(CompletionError::Api(format!("{}: {}", status, error_text)));
        }

        let raw_response = response.text().await?;
        let json_response: Value = serde_json::from_str(&raw_response)?;

        if let Some(error) = json_response.get("error") {
            return Err(CompletionError::Api(error.to_string()));
        }

        let content = json_response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(CompletionError::EmptyResponse)?
            .to_string();

        log::info!("Completion response: {} chars", content.len());
        Ok(content)
    }

    /// Sends the messages and parses the reply.
    ///
    /// Transport failures are folded into a failed [`ParsedResult`] and the
    /// reply is never partially parsed.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> ParsedResult {
        match self.send(messages, options).await {
            Ok(text) => parser::parse(&text),
            Err(e) => {
                log::warn!("Completion request failed: {}", e);
                ParsedResult::failure(e.to_string())
            }
        }
    }
}
