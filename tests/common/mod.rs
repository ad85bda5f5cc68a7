//! In-memory fakes for the remote collaborators.
//!
//! Every call is appended to a shared [`CallLog`] so tests can assert which
//! remote operations ran and in which order.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use parking_lot::Mutex;

use livestream_common::{AssetId, BroadcastId, PrivacyStatus};
use livestream_scheduler::remote::{
    Asset, AssetSource, BroadcastClient, MetadataUpdate, RemoteError,
};
use livestream_scheduler::run::{QueueLocations, RunContext};
use livestream_scheduler::template::Template;

pub const QUEUE: &str = "queue-folder";
pub const DONE: &str = "done-folder";

pub type CallLog = Arc<Mutex<Vec<String>>>;

fn refused(what: &str) -> RemoteError {
    RemoteError::Api {
        service: "fake",
        status: 500,
        body: format!("{} refused", what),
    }
}

#[derive(Default)]
pub struct FakeAssets {
    pub assets: Vec<Asset>,
    pub documents: HashMap<String, Asset>,
    pub content: HashMap<AssetId, Bytes>,
    pub fail_list: bool,
    pub fail_relocate: bool,
    pub calls: CallLog,
}

impl FakeAssets {
    pub fn with_names(names: &[&str], calls: CallLog) -> Self {
        let mut fake = Self {
            calls,
            ..Self::default()
        };
        for name in names {
            let id = AssetId::new(format!("id:{}", name));
            fake.content
                .insert(id.clone(), Bytes::from(format!("image {}", name)));
            fake.assets.push(Asset {
                id,
                name: name.to_string(),
            });
        }
        fake
    }

    pub fn with_document(mut self, name: &str, content: &str) -> Self {
        let asset = Asset {
            id: AssetId::new(format!("doc:{}", name)),
            name: name.to_string(),
        };
        self.content
            .insert(asset.id.clone(), Bytes::from(content.to_string()));
        self.documents.insert(name.to_string(), asset);
        self
    }
}

#[async_trait]
impl AssetSource for FakeAssets {
    async fn list(&self, queue: &str) -> Result<Vec<Asset>, RemoteError> {
        self.calls.lock().push(format!("list {}", queue));
        if self.fail_list {
            return Err(refused("list"));
        }
        Ok(self.assets.clone())
    }

    async fn download(&self, id: &AssetId) -> Result<Bytes, RemoteError> {
        self.calls.lock().push(format!("download {}", id));
        self.content.get(id).cloned().ok_or_else(|| refused("download"))
    }

    async fn relocate(&self, id: &AssetId, from: &str, to: &str) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .push(format!("relocate {} {} -> {}", id, from, to));
        if self.fail_relocate {
            return Err(refused("relocate"));
        }
        Ok(())
    }

    async fn find_document(&self, name: &str) -> Result<Option<Asset>, RemoteError> {
        self.calls.lock().push(format!("find {}", name));
        Ok(self.documents.get(name).cloned())
    }
}

#[derive(Default)]
pub struct FakeBroadcasts {
    pub fail_create: bool,
    pub fail_thumbnail: bool,
    pub fail_metadata: bool,
    pub fail_playlists: HashSet<String>,
    pub fail_categories: bool,
    /// Titles that make the task panic on create
    pub panic_on: HashSet<String>,
    pub categories: HashMap<String, String>,
    pub calls: CallLog,
    pub updates: Mutex<Vec<(String, String, String, PrivacyStatus)>>,
    pub created: Mutex<Vec<(String, DateTime<FixedOffset>, PrivacyStatus)>>,
}

impl FakeBroadcasts {
    pub fn new(calls: CallLog) -> Self {
        Self {
            calls,
            categories: HashMap::from([("Music".to_string(), "10".to_string())]),
            ..Self::default()
        }
    }
}

#[async_trait]
impl BroadcastClient for FakeBroadcasts {
    async fn create_broadcast(
        &self,
        title: &str,
        scheduled_start: &DateTime<FixedOffset>,
        privacy: PrivacyStatus,
    ) -> Result<BroadcastId, RemoteError> {
        if self.panic_on.contains(title) {
            panic!("create_broadcast blew up for {}", title);
        }
        self.calls.lock().push(format!("create {}", title));
        if self.fail_create {
            return Err(refused("create"));
        }

        let mut created = self.created.lock();
        created.push((title.to_string(), *scheduled_start, privacy));
        Ok(BroadcastId::new(format!("b{}", created.len())))
    }

    async fn set_thumbnail(
        &self,
        id: &BroadcastId,
        image: Bytes,
        mime_type: &str,
    ) -> Result<(), RemoteError> {
        self.calls.lock().push(format!(
            "thumbnail {} {} {}",
            id,
            mime_type,
            String::from_utf8_lossy(&image)
        ));
        if self.fail_thumbnail {
            return Err(refused("thumbnail"));
        }
        Ok(())
    }

    async fn update_metadata(
        &self,
        id: &BroadcastId,
        update: &MetadataUpdate<'_>,
    ) -> Result<(), RemoteError> {
        self.calls.lock().push(format!("metadata {}", id));
        self.updates.lock().push((
            update.title.to_string(),
            update.description.to_string(),
            update.category_id.to_string(),
            update.privacy,
        ));
        if self.fail_metadata {
            return Err(refused("metadata"));
        }
        Ok(())
    }

    async fn add_to_playlist(&self, playlist_id: &str, id: &BroadcastId) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .push(format!("playlist {} {}", playlist_id, id));
        if self.fail_playlists.contains(playlist_id) {
            return Err(refused("playlist"));
        }
        Ok(())
    }

    async fn list_categories(
        &self,
        _region_code: &str,
    ) -> Result<HashMap<String, String>, RemoteError> {
        self.calls.lock().push("categories".to_string());
        if self.fail_categories {
            return Err(RemoteError::Api {
                service: "fake",
                status: 503,
                body: "backend error".to_string(),
            });
        }
        Ok(self.categories.clone())
    }
}

pub fn template() -> Template {
    Template {
        title: "TITLE_DATE Stream".to_string(),
        description: "Live on TITLE_DATE".to_string(),
        category: "Music".to_string(),
        playlist_ids: vec!["PL1".to_string(), "PL2".to_string()],
        privacy_status: PrivacyStatus::Unlisted,
        thumbnail: None,
    }
}

pub fn context(
    template: Template,
    assets: Arc<FakeAssets>,
    broadcasts: Arc<FakeBroadcasts>,
    dry_run: bool,
) -> Arc<RunContext> {
    Arc::new(RunContext {
        template,
        category_id: "10".to_string(),
        assets,
        broadcasts,
        locations: QueueLocations {
            queue: QUEUE.to_string(),
            done: DONE.to_string(),
        },
        dry_run,
    })
}

/// Calls that start with `prefix`.
pub fn calls_starting(calls: &CallLog, prefix: &str) -> Vec<String> {
    calls
        .lock()
        .iter()
        .filter(|c| c.starts_with(prefix))
        .cloned()
        .collect()
}
