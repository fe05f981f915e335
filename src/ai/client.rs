//! OpenAI-compatible chat completions client

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::{RetryConfig, with_retry_if};

/// Retry policy for LLM requests
fn default_retry_config() -> RetryConfig {
    RetryConfig::new(3, Duration::from_millis(500), Duration::from_secs(10))
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    #[error("no response content from model")]
    EmptyResponse,
}

impl ChatError {
    /// Network failures, rate limits and server errors are worth retrying.
    /// Other client errors (bad key, bad request) are not.
    fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::EmptyResponse => false,
        }
    }
}

/// Chat completions client
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    retry: RetryConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
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

impl ChatClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint.into(),
            retry: default_retry_config(),
        })
    }

    #[cfg(test)]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a chat completion request, retrying transient failures
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_content: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ChatError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: user_content,
                },
            ],
            max_tokens,
            temperature,
        };

        with_retry_if(
            &self.retry,
            || self.send(&request),
            ChatError::is_transient,
        )
        .await
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<String, ChatError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api { status, body });
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ChatError::EmptyResponse)
    }
}
