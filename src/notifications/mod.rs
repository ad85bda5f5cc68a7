pub mod gmail;
pub mod summary;

pub use gmail::GmailChannel;
pub use summary::{MailMessage, Summary};

use async_trait::async_trait;

use crate::pipeline::Outcome;
use crate::remote::RemoteError;

/// A way of delivering the run summary.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, subject: &str, body: &str) -> Result<(), RemoteError>;
}

/// Delivers the run summary to every configured channel.
pub struct NotificationManager {
    subject: String,
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl NotificationManager {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            channels: Vec::new(),
        }
    }

    pub fn with_channel(mut self, channel: Box<dyn NotificationChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    /// Check if there are any notification targets
    pub fn has_targets(&self) -> bool {
        !self.channels.is_empty()
    }

    /// Send the summary of a run.
    /// Delivery errors are logged but not propagated.
    pub async fn report(&self, outcomes: &[Outcome], log_lines: Vec<String>) {
        let Some(summary) = Summary::build(outcomes, log_lines) else {
            tracing::debug!("Nothing to report");
            return;
        };
        if !self.has_targets() {
            tracing::debug!("No notification channel configured, summary not sent");
            return;
        }

        let body = summary.render();
        for channel in &self.channels {
            match channel.send(&self.subject, &body).await {
                Ok(()) => tracing::info!("Sent run summary via {}", channel.name()),
                Err(e) => tracing::warn!("Failed to send summary via {}: {}", channel.name(), e),
            }
        }
    }
}
