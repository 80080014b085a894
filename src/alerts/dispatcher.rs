use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::models::AlertEvent;

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Best-effort outbound delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotifyError>;
}

/// Addresses alerts and hands them to the notifier. Nothing is queued for retry.
#[derive(Clone)]
pub struct AlertDispatcher {
    notifier: Arc<dyn Notifier>,
    sender: String,
    recipient: String,
    timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            notifier,
            sender: sender.into(),
            recipient: recipient.into(),
            timeout,
        }
    }

    pub fn message_for(&self, alert: &AlertEvent) -> OutboundMessage {
        OutboundMessage {
            from: self.sender.clone(),
            to: self.recipient.clone(),
            subject: alert.subject.clone(),
            html_body: alert.body.clone(),
        }
    }

    pub async fn dispatch(&self, alert: &AlertEvent) -> Result<(), NotifyError> {
        let message = self.message_for(alert);
        match tokio::time::timeout(self.timeout, self.notifier.send(&message)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout(self.timeout)),
        }
    }
}
