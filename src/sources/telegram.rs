//! Telegram Bot API messenger.
//!
//! Text goes through `sendMessage`, images through a multipart `sendPhoto`.
//! Telegram rejects messages whose Markdown does not parse, so a rejected
//! message is retried as HTML and finally as plain text.

use super::{BoxFuture, Messenger};
use crate::error::{AppError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

const API_BASE: &str = "https://api.telegram.org";

/// Parse modes tried in order.
const PARSE_MODES: [Option<&str>; 3] = [Some("Markdown"), Some("HTML"), None];

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    disable_web_page_preview: bool,
}

pub struct TelegramMessenger {
    client: Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramMessenger {
    pub fn new(
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let bot_token = bot_token.into();
        let chat_id = chat_id.into();
        if bot_token.is_empty() || chat_id.is_empty() {
            return Err(AppError::Config(
                "Telegram bot token and chat id are required".to_string(),
            ));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: API_BASE.to_string(),
            bot_token,
            chat_id,
        })
    }

    /// Point the client at another Bot API server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }

    async fn post_message(&self, text: &str, parse_mode: Option<&str>) -> Result<()> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode,
            disable_web_page_preview: true,
        };
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .form(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Delivery(format!("Telegram error {}: {}", status, body)))
    }

    /// Send one message, falling back through the parse modes.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let mut last_error = None;
        for mode in PARSE_MODES {
            match self.post_message(text, mode).await {
                Ok(()) => {
                    debug!(
                        "Telegram message sent ({} chars, parse mode {})",
                        text.chars().count(),
                        mode.unwrap_or("plain")
                    );
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        "Telegram rejected message with parse mode {}: {}",
                        mode.unwrap_or("plain"),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }
        Err(match last_error {
            Some(AppError::Delivery(msg)) => AppError::Delivery(msg),
            Some(other) => AppError::Delivery(other.to_string()),
            None => AppError::Delivery("no parse mode attempted".to_string()),
        })
    }

    pub async fn send_photo(&self, image: &[u8], caption: &str) -> Result<()> {
        let photo = Part::bytes(image.to_vec())
            .file_name("market_chart.png")
            .mime_str("image/png")?;
        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .part("photo", photo);

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Delivery(format!(
                "Telegram photo error {}: {}",
                status, body
            )));
        }
        debug!("Telegram photo sent ({} bytes)", image.len());
        Ok(())
    }
}

impl Messenger for TelegramMessenger {
    fn send_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(self.send_message(text))
    }

    fn send_image<'a>(&'a self, image: &'a [u8], caption: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(self.send_photo(image, caption))
    }
}
