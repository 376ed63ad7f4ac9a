pub mod format;

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::api::endpoints;
use crate::config::TelegramConfig;
use crate::error::NotifyError;

/// Where formatted alerts go. One call per message; failures are per message.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Telegram notification client. Without token/chat_id every send fails with
/// [`NotifyError::NotConfigured`] instead of stopping the bot.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot_token: Option<String>,
    chat_id: Option<String>,
    api_url: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> anyhow::Result<Self> {
        let bot_token = config.bot_token.clone().filter(|s| !s.is_empty());
        let chat_id = config.chat_id.clone().filter(|s| !s.is_empty());

        if bot_token.is_some() && chat_id.is_some() {
            info!("Telegram notifications enabled");
        } else {
            info!("Telegram notifications disabled (missing TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID)");
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("Failed to create Telegram HTTP client")?;

        Ok(Self {
            bot_token,
            chat_id,
            api_url: endpoints::TELEGRAM_API.to_string(),
            client,
        })
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            return Err(NotifyError::NotConfigured);
        };

        let url = format!("{}/bot{}/sendMessage", self.api_url, token);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true
        });

        let resp = self.client.post(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(NotifyError::Rejected(resp.status()));
        }
        debug!("Telegram message delivered ({} chars)", text.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credentials_fail_the_send() {
        let notifier = TelegramNotifier::new(&TelegramConfig {
            bot_token: Some("123:abc".to_string()),
            chat_id: None,
        })
        .unwrap();
        assert!(matches!(notifier.send("hi").await, Err(NotifyError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_empty_credentials_count_as_missing() {
        let notifier = TelegramNotifier::new(&TelegramConfig {
            bot_token: Some(String::new()),
            chat_id: Some("42".to_string()),
        })
        .unwrap();
        assert!(matches!(notifier.send("hi").await, Err(NotifyError::NotConfigured)));
    }

    #[test]
    fn test_configured_notifier_builds() {
        let notifier = TelegramNotifier::new(&TelegramConfig {
            bot_token: Some("123:abc".to_string()),
            chat_id: Some("42".to_string()),
        })
        .unwrap();
        assert_eq!(notifier.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(notifier.api_url, endpoints::TELEGRAM_API);
    }
}
