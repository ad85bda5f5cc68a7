//! Credential acquisition and refresh against a mock token endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{TimeDelta, TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use livestream_scheduler::credentials::{
    AuthorizationPrompt, ClientSecret, Credential, CredentialError, CredentialManager,
    OAuthClient, TokenStore, SCOPES,
};

/// Answers the consent prompt with a fixed code and counts how often it was asked.
struct FixedPrompt {
    asked: Arc<AtomicUsize>,
}

impl AuthorizationPrompt for FixedPrompt {
    fn authorization_code(&self, url: &str) -> std::io::Result<String> {
        assert!(url.contains("access_type=offline"));
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok("auth-code".to_string())
    }
}

struct Setup {
    _dir: TempDir,
    store: TokenStore,
    manager: CredentialManager,
    asked: Arc<AtomicUsize>,
}

fn secret(server: &MockServer) -> ClientSecret {
    let content = json!({
        "installed": {
            "client_id": "client-1.apps.googleusercontent.com",
            "client_secret": "shh",
            "token_uri": format!("{}/token", server.uri()),
            "redirect_uris": ["http://localhost"]
        }
    });
    ClientSecret::from_json(content.to_string().as_bytes()).unwrap()
}

fn setup(server: &MockServer) -> Setup {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    let asked = Arc::new(AtomicUsize::new(0));
    let manager = CredentialManager::new(
        store.clone(),
        OAuthClient::new(secret(server), SCOPES),
        Box::new(FixedPrompt {
            asked: asked.clone(),
        }),
    );

    Setup {
        _dir: dir,
        store,
        manager,
        asked,
    }
}

fn stored(expires_in: TimeDelta, refresh_token: Option<&str>) -> Credential {
    Credential {
        access_token: "old-access".to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expiry: Some(Utc::now() + expires_in),
        scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
        token_type: "Bearer".to_string(),
    }
}

// ---------------------------------------------------------------------------
// acquire
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_run_asks_for_consent_and_stores_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let s = setup(&server);
    let credential = s.manager.acquire().await.unwrap();

    assert_eq!(s.asked.load(Ordering::SeqCst), 1);
    assert_eq!(credential.access_token, "new-access");
    assert_eq!(credential.refresh_token.as_deref(), Some("new-refresh"));
    assert!(!credential.is_expired_at(Utc::now()));
    assert_eq!(s.store.load().unwrap(), Some(credential));
}

#[tokio::test]
async fn stored_token_is_reused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let s = setup(&server);
    let existing = stored(TimeDelta::hours(1), Some("refresh"));
    s.store.save(&existing).unwrap();

    let credential = s.manager.acquire().await.unwrap();
    assert_eq!(credential, existing);
    assert_eq!(s.asked.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreadable_store_asks_again() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    let s = setup(&server);
    std::fs::write(s.store.path(), "{not json").unwrap();

    let credential = s.manager.acquire().await.unwrap();
    assert_eq!(s.asked.load(Ordering::SeqCst), 1);
    assert_eq!(credential.access_token, "new-access");
    assert_eq!(credential.token_type, "Bearer");
}

#[tokio::test]
async fn rejected_code_exchange_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let s = setup(&server);
    let err = s.manager.acquire().await.unwrap_err();
    assert_matches!(err, CredentialError::Rejected { status: 400, .. });
    assert_eq!(s.store.load().unwrap(), None);
}

// ---------------------------------------------------------------------------
// ensure_valid
// ---------------------------------------------------------------------------

#[tokio::test]
async fn valid_token_is_returned_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let s = setup(&server);
    let credential = stored(TimeDelta::hours(1), Some("refresh"));
    let checked = s.manager.ensure_valid(credential.clone()).await.unwrap();
    assert_eq!(checked, credential);
}

#[tokio::test]
async fn expired_token_is_refreshed_and_keeps_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=keep-me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-access",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let s = setup(&server);
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let mut expired = stored(TimeDelta::zero(), Some("keep-me"));
    expired.expiry = Some(now - TimeDelta::minutes(5));

    let refreshed = s.manager.ensure_valid_at(expired, now).await.unwrap();

    assert_eq!(refreshed.access_token, "fresh-access");
    assert_eq!(refreshed.refresh_token.as_deref(), Some("keep-me"));
    assert_eq!(refreshed.expiry, Some(now + TimeDelta::hours(1)));
    assert_eq!(refreshed.scopes.len(), SCOPES.len());
    assert_eq!(s.store.load().unwrap(), Some(refreshed));
}

#[tokio::test]
async fn token_inside_skew_is_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-access",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let s = setup(&server);
    let almost = stored(TimeDelta::seconds(20), Some("refresh"));
    let refreshed = s.manager.ensure_valid(almost).await.unwrap();
    assert_eq!(refreshed.access_token, "fresh-access");
}

#[tokio::test]
async fn expired_without_refresh_token_is_invalid() {
    let server = MockServer::start().await;
    let s = setup(&server);

    let expired = stored(TimeDelta::hours(-1), None);
    let err = s.manager.ensure_valid(expired).await.unwrap_err();
    assert_matches!(err, CredentialError::Invalid(_));
}

#[tokio::test]
async fn rejected_refresh_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .mount(&server)
        .await;

    let s = setup(&server);
    let expired = stored(TimeDelta::hours(-1), Some("revoked"));
    let err = s.manager.ensure_valid(expired).await.unwrap_err();
    assert_matches!(err, CredentialError::Invalid(msg) if msg.contains("invalid_grant"));
}

// ---------------------------------------------------------------------------
// Client secret
// ---------------------------------------------------------------------------

#[test]
fn missing_client_secret_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("credentials.json");

    let err = ClientSecret::from_file(&path).unwrap_err();
    assert_matches!(err, CredentialError::ClientSecret { path: p, .. } if p == path);
}

#[test]
fn client_secret_requires_a_section() {
    assert!(ClientSecret::from_json(br#"{"other": {}}"#).is_err());

    let web = ClientSecret::from_json(
        br#"{"web": {"client_id": "id", "client_secret": "s"}}"#,
    )
    .unwrap();
    assert_eq!(web.client_id, "id");
    assert_eq!(web.token_uri, "https://oauth2.googleapis.com/token");
}

#[tokio::test]
async fn consent_url_requests_offline_access() {
    let server = MockServer::start().await;
    let client = OAuthClient::new(secret(&server), SCOPES);
    let url = client.authorization_url().unwrap();

    assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
    assert!(url.contains("client_id=client-1.apps.googleusercontent.com"));
    assert!(url.contains("access_type=offline"));
    assert!(url.contains("state=state-token"));
    assert!(url.contains("gmail.send"));
}
