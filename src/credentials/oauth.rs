//! OAuth 2.0 installed-application flow against Google's endpoints.

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::io::{BufRead, Write};
use std::path::Path;

use super::{Credential, CredentialError};

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_REDIRECT_URI: &str = "http://localhost";

/// Client id and secret as downloaded from the Google Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The console wraps the secret in `installed` or `web`.
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    pub fn from_json(content: &[u8]) -> Result<Self, String> {
        let file: ClientSecretFile = serde_json::from_slice(content).map_err(|e| e.to_string())?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "expected an \"installed\" or \"web\" section".to_string())
    }

    pub fn from_file(path: &Path) -> Result<Self, CredentialError> {
        let secret_error = |message: String| CredentialError::ClientSecret {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read(path).map_err(|e| secret_error(e.to_string()))?;
        Self::from_json(&content).map_err(secret_error)
    }

    fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_REDIRECT_URI)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

impl TokenResponse {
    /// Build a credential, inheriting what the endpoint left out from the
    /// credential being refreshed.
    fn into_credential(self, now: DateTime<Utc>, previous: Option<&Credential>) -> Credential {
        let scopes = match self.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => previous.map(|p| p.scopes.clone()).unwrap_or_default(),
        };

        Credential {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous.and_then(|p| p.refresh_token.clone())),
            expiry: self
                .expires_in
                .and_then(TimeDelta::try_seconds)
                .map(|lifetime| now + lifetime),
            scopes,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
        }
    }
}

/// Talks to the authorization and token endpoints.
pub struct OAuthClient {
    client: Client,
    secret: ClientSecret,
    scopes: Vec<String>,
}

impl OAuthClient {
    pub fn new(secret: ClientSecret, scopes: &[&str]) -> Self {
        Self {
            client: Client::new(),
            secret,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Consent page the user opens to grant access.
    pub fn authorization_url(&self) -> Result<String, CredentialError> {
        let scope = self.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.secret.auth_uri,
            &[
                ("client_id", self.secret.client_id.as_str()),
                ("redirect_uri", self.secret.redirect_uri()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", "state-token"),
            ],
        )
        .map_err(|e| CredentialError::Invalid(format!("bad auth_uri: {}", e)))?;
        Ok(url.to_string())
    }

    /// Exchange an authorization code for a credential.
    pub async fn exchange_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Credential, CredentialError> {
        let response = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
                ("redirect_uri", self.secret.redirect_uri()),
            ])
            .await?;
        Ok(response.into_credential(now, None))
    }

    /// Obtain a new access token with the credential's refresh token.
    pub async fn refresh(
        &self,
        credential: &Credential,
        now: DateTime<Utc>,
    ) -> Result<Credential, CredentialError> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or_else(|| CredentialError::Invalid("no refresh token".to_string()))?;

        let response = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
            ])
            .await?;
        Ok(response.into_credential(now, Some(credential)))
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, CredentialError> {
        let response = self
            .client
            .post(&self.secret.token_uri)
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CredentialError::Rejected { status, body });
        }

        Ok(response.json().await?)
    }
}

/// Asks the user for the authorization code after they granted consent.
pub trait AuthorizationPrompt: Send + Sync {
    fn authorization_code(&self, url: &str) -> std::io::Result<String>;
}

/// Prints the consent URL and reads the code from stdin.
pub struct ConsolePrompt;

impl AuthorizationPrompt for ConsolePrompt {
    fn authorization_code(&self, url: &str) -> std::io::Result<String> {
        let mut stdout = std::io::stdout();
        writeln!(
            stdout,
            "Go to the following link in your browser then type the authorization code:\n{}",
            url
        )?;
        stdout.flush()?;

        let mut code = String::new();
        std::io::stdin().lock().read_line(&mut code)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no authorization code entered",
            ));
        }
        Ok(code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = r#"{
        "installed": {
            "client_id": "id.apps.googleusercontent.com",
            "client_secret": "shh",
            "redirect_uris": ["http://localhost"]
        }
    }"#;

    #[test]
    fn test_client_secret_sections() {
        let secret = ClientSecret::from_json(SECRET.as_bytes()).unwrap();
        assert_eq!(secret.client_id, "id.apps.googleusercontent.com");
        assert_eq!(secret.token_uri, DEFAULT_TOKEN_URI);

        let web = SECRET.replace("installed", "web");
        assert!(ClientSecret::from_json(web.as_bytes()).is_ok());

        let other = SECRET.replace("installed", "desktop");
        assert!(ClientSecret::from_json(other.as_bytes()).is_err());
    }

    #[test]
    fn test_authorization_url() {
        let secret = ClientSecret::from_json(SECRET.as_bytes()).unwrap();
        let client = OAuthClient::new(secret, &["scope-a", "scope-b"]);
        let url = Url::parse(&client.authorization_url().unwrap()).unwrap();

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "id.apps.googleusercontent.com");
        assert_eq!(params["scope"], "scope-a scope-b");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["response_type"], "code");
    }

    #[test]
    fn test_refresh_response_keeps_refresh_token() {
        let now = Utc::now();
        let previous = Credential {
            access_token: "old".to_string(),
            refresh_token: Some("keep-me".to_string()),
            expiry: None,
            scopes: vec!["scope-a".to_string()],
            token_type: "Bearer".to_string(),
        };
        let response = TokenResponse {
            access_token: "new".to_string(),
            expires_in: Some(3600),
            refresh_token: None,
            scope: None,
            token_type: None,
        };

        let credential = response.into_credential(now, Some(&previous));
        assert_eq!(credential.access_token, "new");
        assert_eq!(credential.refresh_token.as_deref(), Some("keep-me"));
        assert_eq!(credential.scopes, vec!["scope-a"]);
        assert_eq!(credential.expiry, Some(now + TimeDelta::seconds(3600)));
    }
}
