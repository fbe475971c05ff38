//! OpenAI chat-completions summarizer for the daily brief.

use super::{BoxFuture, Summarizer};
use crate::error::{AppError, Result};
use crate::services::report::format_summary_prompt;
use crate::types::MarketBrief;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are a professional trading analysis engine. \
Assess the market phase (trending, range-bound, breakout or reversal) and the \
volatility regime from the VIX. Use moving averages, RSI, MACD, volume and \
support/resistance to describe the setup, and keep risk management explicit: \
1-2% capital risk per trade, a defined stop and at least 2R reward. \
Flag high-impact news and warn against counter-trend trades without a tight stop. \
When VIX is above 30 weight volume and levels more heavily; below 15 favour \
mean-reversion setups.";

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    content: Option<String>,
}

pub struct OpenAiSummarizer {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiSummarizer {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.3,
            max_tokens: 2000,
        })
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!("OpenAI status {}: {}", status, text)));
        }

        let body: ChatResponse = response.json().await?;
        let content = extract_content(body)?;
        debug!("OpenAI summary: {} chars", content.chars().count());
        Ok(content)
    }
}

fn extract_content(body: ChatResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::ExternalApi("Missing content in response".to_string()))
}

impl Summarizer for OpenAiSummarizer {
    fn summarize<'a>(&'a self, brief: &'a MarketBrief) -> BoxFuture<'a, String> {
        Box::pin(async move {
            let prompt = format_summary_prompt(brief);
            self.complete(&prompt).await
        })
    }
}
