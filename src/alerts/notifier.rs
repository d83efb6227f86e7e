//! Notification delivery

use async_trait::async_trait;
use std::time::Duration;

use crate::config::TelegramConfig;

/// Outbound notification channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a plain-text message
    async fn send(&self, text: &str) -> Result<(), NotifierError>;

    /// Short name for log lines
    fn name(&self) -> &'static str;
}

/// Sends messages through the Telegram Bot API
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig, timeout: Duration) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifierError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                config.token
            ),
            chat_id: config.chat_id.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifierError> {
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        // reqwest errors can embed the URL, which carries the bot token
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifierError::Transport(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifierError::Status(status.as_u16(), body));
        }

        tracing::debug!(chat_id = %self.chat_id, "Telegram notification sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

/// Writes notifications to the log only
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifierError> {
        tracing::warn!(target: "unitwatch::notify", "{}", text);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Send a message without letting a failure escape.
///
/// On failure one follow-up message describing the failure is attempted,
/// provided `notice_allowed` still holds once the failed send returns; a
/// failure of that follow-up is only logged. Returns whether the original
/// message was delivered.
pub async fn send_best_effort(
    notifier: &dyn Notifier,
    text: &str,
    notice_allowed: impl FnOnce() -> bool,
) -> bool {
    let err = match notifier.send(text).await {
        Ok(()) => return true,
        Err(e) => e,
    };

    tracing::error!(
        notifier = notifier.name(),
        error = %err,
        "Failed to send notification"
    );

    if !notice_allowed() {
        tracing::warn!(
            notifier = notifier.name(),
            "No budget left for a delivery-failure notice, skipping"
        );
        return false;
    }

    let notice = super::message::delivery_failure(&err);
    if let Err(e) = notifier.send(&notice).await {
        tracing::error!(
            notifier = notifier.name(),
            error = %e,
            "Failed to send delivery-failure notice"
        );
    }
    false
}

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Notification rejected with status {0}: {1}")]
    Status(u16, String),
}
