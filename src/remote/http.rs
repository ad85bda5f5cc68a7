use reqwest::{Client, RequestBuilder, Response};

use super::RemoteError;

/// Authorized HTTP access shared by every Google API client.
///
/// Holds the access token validated at startup. The token never changes
/// during a run, so clones can be handed to concurrent tasks freely.
#[derive(Clone)]
pub struct GoogleApi {
    client: Client,
    access_token: String,
}

impl GoogleApi {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.into(),
        }
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url).bearer_auth(&self.access_token)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url).bearer_auth(&self.access_token)
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        self.client.put(url).bearer_auth(&self.access_token)
    }

    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.client.patch(url).bearer_auth(&self.access_token)
    }

    /// Send a request and turn a non-success status into [`RemoteError::Api`].
    pub async fn send(
        &self,
        request: RequestBuilder,
        service: &'static str,
    ) -> Result<Response, RemoteError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                service,
                status,
                body,
            });
        }

        Ok(response)
    }

    /// Send a request and decode the JSON body.
    pub async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        service: &'static str,
    ) -> Result<T, RemoteError> {
        let response = self.send(request, service).await?;
        response.json::<T>().await.map_err(|e| RemoteError::Decode {
            service,
            message: e.to_string(),
        })
    }
}

/// Base URL without a trailing slash.
pub(crate) fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
