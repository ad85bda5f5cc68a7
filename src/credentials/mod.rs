//! Credential lifecycle.
//!
//! A run obtains its OAuth credential exactly once, before any provisioning
//! task starts:
//!
//! 1. [`CredentialManager::acquire`] loads the stored token, or runs the
//!    interactive consent flow when there is none.
//! 2. [`CredentialManager::ensure_valid`] refreshes an expired token.
//!
//! The result is shared read-only for the rest of the run. Tasks never
//! refresh, so there is nothing to race on.

mod oauth;
mod store;

pub use oauth::{AuthorizationPrompt, ClientSecret, ConsolePrompt, OAuthClient};
pub use store::TokenStore;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Scopes for broadcasts, the thumbnail queue and the summary mail.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/youtube",
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/gmail.send",
];

/// A token counts as expired this long before its nominal expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The credential cannot be used and cannot be renewed.
    #[error("Credential invalid: {0}")]
    Invalid(String),

    #[error("Token endpoint rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Can't read OAuth client secret {path:?}: {message}")]
    ClientSecret { path: PathBuf, message: String },

    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unable to read authorization code: {0}")]
    Prompt(#[from] std::io::Error),
}

/// OAuth access and refresh token pair.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// `None` means the token does not expire
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,

    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Credential {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - TimeDelta::seconds(EXPIRY_SKEW_SECS) <= now,
            None => false,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expiry", &self.expiry)
            .field("scopes", &self.scopes)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Loads, creates, refreshes and persists the run's credential.
pub struct CredentialManager {
    store: TokenStore,
    oauth: OAuthClient,
    prompt: Box<dyn AuthorizationPrompt>,
}

impl CredentialManager {
    pub fn new(store: TokenStore, oauth: OAuthClient, prompt: Box<dyn AuthorizationPrompt>) -> Self {
        Self {
            store,
            oauth,
            prompt,
        }
    }

    /// Load the stored credential or authorize interactively.
    ///
    /// An unreadable store is treated like an empty one.
    pub async fn acquire(&self) -> Result<Credential, CredentialError> {
        match self.store.load() {
            Ok(Some(credential)) => {
                debug!("Loaded credential from {:?}", self.store.path());
                return Ok(credential);
            }
            Ok(None) => info!("No stored credential at {:?}", self.store.path()),
            Err(e) => warn!(
                "Ignoring unreadable credential store {:?}: {}",
                self.store.path(),
                e
            ),
        }

        let url = self.oauth.authorization_url()?;
        let code = self.prompt.authorization_code(&url)?;
        let credential = self.oauth.exchange_code(&code, Utc::now()).await?;
        info!("Authorization granted");

        self.persist(&credential);
        Ok(credential)
    }

    /// Return a credential that is valid now, refreshing it if needed.
    pub async fn ensure_valid(&self, credential: Credential) -> Result<Credential, CredentialError> {
        self.ensure_valid_at(credential, Utc::now()).await
    }

    pub async fn ensure_valid_at(
        &self,
        credential: Credential,
        now: DateTime<Utc>,
    ) -> Result<Credential, CredentialError> {
        if !credential.is_expired_at(now) {
            debug!(expiry = ?credential.expiry, "Credential is valid");
            return Ok(credential);
        }

        if credential.refresh_token.is_none() {
            return Err(CredentialError::Invalid(
                "access token expired and no refresh token is stored".to_string(),
            ));
        }

        info!(expiry = ?credential.expiry, "Credential expired, refreshing");
        let refreshed = match self.oauth.refresh(&credential, now).await {
            Ok(refreshed) => refreshed,
            Err(CredentialError::Rejected { status, body }) => {
                return Err(CredentialError::Invalid(format!(
                    "refresh rejected ({}): {}",
                    status, body
                )))
            }
            Err(e) => return Err(e),
        };

        self.persist(&refreshed);
        Ok(refreshed)
    }

    /// Persist a credential; failure only costs a new consent next run.
    fn persist(&self, credential: &Credential) {
        match self.store.save(credential) {
            Ok(()) => debug!("Saved credential to {:?}", self.store.path()),
            Err(e) => warn!(
                "Unable to cache OAuth token in {:?}: {}",
                self.store.path(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn credential(expiry: Option<DateTime<Utc>>) -> Credential {
        Credential {
            access_token: "secret-access".to_string(),
            refresh_token: Some("secret-refresh".to_string()),
            expiry,
            scopes: vec![],
            token_type: "Bearer".to_string(),
        }
    }

    #[test]
    fn test_expiry_with_skew() {
        let expiry = Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap();
        let c = credential(Some(expiry));

        assert!(!c.is_expired_at(expiry - TimeDelta::minutes(5)));
        assert!(c.is_expired_at(expiry - TimeDelta::seconds(30)));
        assert!(c.is_expired_at(expiry));
        assert!(!credential(None).is_expired_at(expiry));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let printed = format!("{:?}", credential(None));
        assert!(!printed.contains("secret-access"));
        assert!(!printed.contains("secret-refresh"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_stored_json_without_optional_fields() {
        let c: Credential = serde_json::from_str(r#"{"access_token": "a"}"#).unwrap();
        assert_eq!(c.token_type, "Bearer");
        assert!(c.refresh_token.is_none());
        assert!(c.expiry.is_none());
    }
}
