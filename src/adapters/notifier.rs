use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::domain::events::WatchEvent;

const TELEGRAM_TIMEOUT_SECONDS: u64 = 5;

pub trait Notifier {
    fn notify(&self, event: &WatchEvent) -> Result<(), NotifyError>;
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, event: &WatchEvent) -> Result<(), NotifyError> {
        (**self).notify(event)
    }
}

impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn notify(&self, event: &WatchEvent) -> Result<(), NotifyError> {
        (**self).notify(event)
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, event: &WatchEvent) -> Result<(), NotifyError> {
        tracing::debug!(kind = event.kind(), "notifications disabled, event dropped");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: reqwest::blocking::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(api_base: &str, token: &str, chat_id: &str) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(TELEGRAM_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{token}/sendMessage", api_base.trim_end_matches('/')),
            chat_id: chat_id.to_string(),
        })
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, event: &WatchEvent) -> Result<(), NotifyError> {
        let text = event.message();
        self.client
            .post(&self.endpoint)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text: &text,
            })
            .send()?
            .error_for_status()?;
        Ok(())
    }
}
