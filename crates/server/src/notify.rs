use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::warn;

use crate::config::Settings;

const TELEGRAM_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait Notifier: Send + Sync {
    fn is_configured(&self) -> bool;
    async fn send(&self, text: &str) -> Result<()>;
}

/// Stand-in when no bot credentials are configured. Every send fails.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    fn is_configured(&self) -> bool {
        false
    }

    async fn send(&self, _text: &str) -> Result<()> {
        bail!("telegram notifier is not configured")
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Delivers HTML-formatted messages through the Telegram Bot API.
pub struct TelegramNotifier {
    http: Client,
    send_message_url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(api_base: &str, bot_token: &str, chat_id: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(TELEGRAM_TIMEOUT)
            .build()
            .context("failed to build telegram http client")?;
        Ok(Self {
            http,
            send_message_url: format!(
                "{}/bot{bot_token}/sendMessage",
                api_base.trim_end_matches('/')
            ),
            chat_id: chat_id.into(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn is_configured(&self) -> bool {
        true
    }

    async fn send(&self, text: &str) -> Result<()> {
        let response = self
            .http
            .post(&self.send_message_url)
            .json(&SendMessageRequest {
                chat_id: &self.chat_id,
                text,
                parse_mode: "HTML",
            })
            .send()
            .await
            .context("telegram request failed")?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            bail!("telegram api error {status}: {body}");
        }
        Ok(())
    }
}

pub fn notifier_from_settings(settings: &Settings) -> Result<Arc<dyn Notifier>> {
    match settings.telegram_credentials() {
        Some((token, chat_id)) => Ok(Arc::new(TelegramNotifier::new(
            &settings.telegram_api_base,
            token,
            chat_id,
        )?)),
        None => {
            warn!("telegram credentials not set (TELEGRAM_BOT_TOKEN, TELEGRAM_CHAT_ID); notifications disabled");
            Ok(Arc::new(DisabledNotifier))
        }
    }
}

pub fn order_message(name: &str, telegram: &str, city: &str, time: &str) -> String {
    format!(
        "<b>New order</b>\n\n<b>Name:</b> {}\n<b>Telegram:</b> {}\n<b>City:</b> {}\n<b>Time:</b> {}\n\n#order",
        escape_html(name),
        escape_html(telegram),
        escape_html(city),
        escape_html(time),
    )
}

pub fn lead_message(name: &str, phone: &str, email: &str, time: &str) -> String {
    format!(
        "<b>New lead</b>\n\n<b>Name:</b> {}\n<b>Phone:</b> {}\n<b>Email:</b> {}\n<b>Time:</b> {}\n\n#lead",
        escape_html(name),
        escape_html(phone),
        escape_html(email),
        escape_html(time),
    )
}

// Telegram's HTML parse mode only needs these three.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/notify_tests.rs"]
mod tests;
