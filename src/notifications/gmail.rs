use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::Local;
use serde_json::json;

use crate::config::MailConfig;
use crate::remote::{GoogleApi, RemoteError};

use super::summary::MailMessage;
use super::NotificationChannel;

const SERVICE: &str = "gmail";

/// Sends the summary through the Gmail API as the authorized user.
pub struct GmailChannel {
    api: GoogleApi,
    base_url: String,
    from: String,
    to: String,
}

impl GmailChannel {
    pub fn new(api: GoogleApi, base_url: &str, config: &MailConfig) -> Self {
        Self {
            api,
            base_url: base_url.trim_end_matches('/').to_string(),
            from: config.from.clone(),
            to: config.to.clone(),
        }
    }

    /// Encoded form expected in the `raw` field of a send request.
    pub fn encode(message: &MailMessage<'_>) -> String {
        URL_SAFE.encode(message.to_rfc5322())
    }
}

#[async_trait]
impl NotificationChannel for GmailChannel {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), RemoteError> {
        let message = MailMessage {
            from: &self.from,
            to: &self.to,
            subject,
            date: Local::now().fixed_offset(),
            body,
        };

        let request = self
            .api
            .post(&format!("{}/users/me/messages/send", self.base_url))
            .json(&json!({ "raw": Self::encode(&message) }));
        self.api.send(request, SERVICE).await?;
        Ok(())
    }
}
