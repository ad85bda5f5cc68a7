//! YouTube Data API (v3) broadcast client.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use livestream_common::{BroadcastId, PrivacyStatus};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

use super::http::{trim_base, GoogleApi};
use super::{BroadcastClient, MetadataUpdate, RemoteError};

const SERVICE: &str = "YouTube";

#[derive(Debug, Deserialize)]
struct Resource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CategoryList {
    #[serde(default)]
    items: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct Category {
    id: String,
    snippet: CategorySnippet,
}

#[derive(Debug, Deserialize)]
struct CategorySnippet {
    title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoUpdate<'a> {
    id: &'a str,
    snippet: VideoSnippet<'a>,
    status: VideoStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet<'a> {
    title: &'a str,
    description: &'a str,
    category_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatus {
    privacy_status: PrivacyStatus,
}

pub struct YoutubeClient {
    api: GoogleApi,
    base_url: String,
    upload_url: String,
}

impl YoutubeClient {
    pub fn new(api: GoogleApi, base_url: &str, upload_url: &str) -> Self {
        Self {
            api,
            base_url: trim_base(base_url),
            upload_url: trim_base(upload_url),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl BroadcastClient for YoutubeClient {
    async fn create_broadcast(
        &self,
        title: &str,
        scheduled_start: &DateTime<FixedOffset>,
        privacy: PrivacyStatus,
    ) -> Result<BroadcastId, RemoteError> {
        let body = json!({
            "snippet": {
                "title": title,
                "scheduledStartTime": scheduled_start.to_rfc3339_opts(SecondsFormat::Secs, false),
            },
            "status": {
                "privacyStatus": privacy,
            },
            "contentDetails": {
                "enableAutoStart": true,
                "enableAutoStop": true,
            },
        });

        let request = self
            .api
            .post(&self.url("/liveBroadcasts"))
            .query(&[("part", "snippet,status,contentDetails")])
            .json(&body);

        let created: Resource = self.api.send_json(request, SERVICE).await?;
        Ok(BroadcastId::from(created.id))
    }

    async fn set_thumbnail(
        &self,
        id: &BroadcastId,
        image: Bytes,
        mime_type: &str,
    ) -> Result<(), RemoteError> {
        let request = self
            .api
            .post(&format!("{}/thumbnails/set", self.upload_url))
            .query(&[("videoId", id.as_str()), ("uploadType", "media")])
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(image);
        self.api.send(request, SERVICE).await?;
        Ok(())
    }

    async fn update_metadata(
        &self,
        id: &BroadcastId,
        update: &MetadataUpdate<'_>,
    ) -> Result<(), RemoteError> {
        let body = VideoUpdate {
            id: id.as_str(),
            snippet: VideoSnippet {
                title: update.title,
                description: update.description,
                category_id: update.category_id,
            },
            status: VideoStatus {
                privacy_status: update.privacy,
            },
        };

        let request = self
            .api
            .put(&self.url("/videos"))
            .query(&[("part", "id,snippet,status")])
            .json(&body);
        self.api.send(request, SERVICE).await?;
        Ok(())
    }

    async fn add_to_playlist(
        &self,
        playlist_id: &str,
        id: &BroadcastId,
    ) -> Result<(), RemoteError> {
        let body = json!({
            "snippet": {
                "playlistId": playlist_id,
                "resourceId": {
                    "kind": "youtube#video",
                    "videoId": id.as_str(),
                },
            },
        });

        let request = self
            .api
            .post(&self.url("/playlistItems"))
            .query(&[("part", "snippet")])
            .json(&body);
        self.api.send(request, SERVICE).await?;
        Ok(())
    }

    async fn list_categories(
        &self,
        region_code: &str,
    ) -> Result<HashMap<String, String>, RemoteError> {
        let request = self
            .api
            .get(&self.url("/videoCategories"))
            .query(&[("part", "snippet"), ("regionCode", region_code)]);

        let categories: CategoryList = self.api.send_json(request, SERVICE).await?;
        Ok(categories
            .items
            .into_iter()
            .map(|c| (c.snippet.title, c.id))
            .collect())
    }
}
