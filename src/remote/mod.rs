//! Remote collaborators: the asset source holding the queue and the video
//! platform the broadcasts are created on.
//!
//! Both sit behind traits so the pipeline can run against Google APIs, a
//! local directory, or in-memory fakes in tests.

mod drive;
mod http;
mod local;
mod youtube;

pub use drive::DriveSource;
pub use http::GoogleApi;
pub use local::LocalFolderSource;
pub use youtube::YoutubeClient;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use livestream_common::{AssetId, BroadcastId, PrivacyStatus};
use std::collections::HashMap;

/// One queued image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
}

/// Error from a remote call.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} request failed ({status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Unexpected {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error(transparent)]
    Local(#[from] livestream_common::Error),
}

/// Source of queued thumbnails.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// List the images in a queue location.
    async fn list(&self, queue: &str) -> Result<Vec<Asset>, RemoteError>;

    /// Download an asset's content.
    async fn download(&self, id: &AssetId) -> Result<Bytes, RemoteError>;

    /// Move an asset from one location to another.
    async fn relocate(&self, id: &AssetId, from: &str, to: &str) -> Result<(), RemoteError>;

    /// Find a document by exact name anywhere in the source.
    async fn find_document(&self, name: &str) -> Result<Option<Asset>, RemoteError>;
}

/// Fields written to a broadcast once it exists.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub category_id: &'a str,
    pub privacy: PrivacyStatus,
}

/// Broadcast operations on the video platform.
#[async_trait]
pub trait BroadcastClient: Send + Sync {
    /// Create a broadcast and return its id.
    async fn create_broadcast(
        &self,
        title: &str,
        scheduled_start: &DateTime<FixedOffset>,
        privacy: PrivacyStatus,
    ) -> Result<BroadcastId, RemoteError>;

    /// Upload the thumbnail of a broadcast.
    async fn set_thumbnail(
        &self,
        id: &BroadcastId,
        image: Bytes,
        mime_type: &str,
    ) -> Result<(), RemoteError>;

    /// Update title, description, category and privacy.
    async fn update_metadata(
        &self,
        id: &BroadcastId,
        update: &MetadataUpdate<'_>,
    ) -> Result<(), RemoteError>;

    /// Append a broadcast to a playlist.
    async fn add_to_playlist(&self, playlist_id: &str, id: &BroadcastId)
        -> Result<(), RemoteError>;

    /// Category label to category id for a region.
    async fn list_categories(&self, region_code: &str)
        -> Result<HashMap<String, String>, RemoteError>;
}
