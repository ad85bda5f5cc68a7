//! Google Drive (v2) asset source.
//!
//! The queue and done locations are folder ids. Relocation swaps the parent
//! folder of the file, so the file id stays stable.

use async_trait::async_trait;
use bytes::Bytes;
use livestream_common::AssetId;
use serde::Deserialize;
use tracing::debug;

use super::http::{trim_base, GoogleApi};
use super::{Asset, AssetSource, RemoteError};

const SERVICE: &str = "Drive";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    items: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    title: String,
}

impl From<DriveFile> for Asset {
    fn from(file: DriveFile) -> Self {
        Asset {
            id: AssetId::from(file.id),
            name: file.title,
        }
    }
}

pub struct DriveSource {
    api: GoogleApi,
    base_url: String,
}

impl DriveSource {
    pub fn new(api: GoogleApi, base_url: &str) -> Self {
        Self {
            api,
            base_url: trim_base(base_url),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Run a file query, following every result page.
    async fn query(&self, q: &str) -> Result<Vec<DriveFile>, RemoteError> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.api.get(&self.url("/files")).query(&[("q", q)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: FileList = self.api.send_json(request, SERVICE).await?;
            files.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(files)
    }
}

/// Quote a value for a Drive query string.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[async_trait]
impl AssetSource for DriveSource {
    async fn list(&self, queue: &str) -> Result<Vec<Asset>, RemoteError> {
        let q = format!(
            "{} in parents and (mimeType = 'image/jpeg' or mimeType = 'image/png') and trashed = false",
            quote(queue)
        );
        let files = self.query(&q).await?;
        debug!("Drive folder {} holds {} images", queue, files.len());
        Ok(files.into_iter().map(Asset::from).collect())
    }

    async fn download(&self, id: &AssetId) -> Result<Bytes, RemoteError> {
        let request = self
            .api
            .get(&self.url(&format!("/files/{}", id)))
            .query(&[("alt", "media")]);
        let response = self.api.send(request, SERVICE).await?;
        Ok(response.bytes().await?)
    }

    async fn relocate(&self, id: &AssetId, from: &str, to: &str) -> Result<(), RemoteError> {
        let request = self
            .api
            .patch(&self.url(&format!("/files/{}", id)))
            .query(&[("addParents", to), ("removeParents", from)])
            .json(&serde_json::json!({}));
        self.api.send(request, SERVICE).await?;
        Ok(())
    }

    async fn find_document(&self, name: &str) -> Result<Option<Asset>, RemoteError> {
        let q = format!("title = {} and trashed = false", quote(name));
        let files = self.query(&q).await?;
        Ok(files.into_iter().next().map(Asset::from))
    }
}
