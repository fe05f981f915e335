//! LLM-backed thread summaries through an OpenAI-compatible chat API.

mod client;
mod prompts;

use std::time::Duration;

pub use client::{ChatClient, ChatError};

use crate::config::AiConfig;
use crate::mail::ParsedEmail;
use crate::summary::SummaryType;

/// Summarizes parsed threads with a chat model
#[derive(Clone)]
pub struct AiSummarizer {
    client: ChatClient,
    temperature: f32,
    short_max_tokens: u32,
    max_tokens: u32,
}

impl AiSummarizer {
    /// Build a summarizer from the `[ai]` settings and an explicit key
    pub fn new(config: &AiConfig, api_key: &str) -> Result<Self, ChatError> {
        let client = ChatClient::new(
            api_key,
            config.model.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self {
            client,
            temperature: config.temperature,
            short_max_tokens: config.short_max_tokens,
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    fn max_tokens_for(&self, kind: SummaryType) -> u32 {
        match kind {
            SummaryType::Short => self.short_max_tokens,
            SummaryType::Medium | SummaryType::Long => self.max_tokens,
        }
    }

    pub async fn summarize(
        &self,
        emails: &[ParsedEmail],
        kind: SummaryType,
    ) -> Result<String, ChatError> {
        let prompt = prompts::build_thread_prompt(emails, kind);
        tracing::debug!(
            "Requesting {} summary of {} email(s) from {} ({} prompt chars)",
            kind,
            emails.len(),
            self.client.model(),
            prompt.chars().count()
        );
        self.client
            .complete(
                prompts::SYSTEM,
                &prompt,
                self.max_tokens_for(kind),
                self.temperature,
            )
            .await
    }
}

#[cfg(test)]
pub(crate) use client::tests::{completion, mock_server};
