//! Asset source backed by local directories.
//!
//! Useful for dry runs and for installations that sync the queue folder to
//! disk. Asset ids are full file paths.

use async_trait::async_trait;
use bytes::Bytes;
use livestream_common::{paths::is_queue_image, AssetId, Error};
use std::path::{Path, PathBuf};

use super::{Asset, AssetSource, RemoteError};

pub struct LocalFolderSource {
    /// Directory searched by [`AssetSource::find_document`]
    documents: PathBuf,
}

impl LocalFolderSource {
    pub fn new(documents: impl Into<PathBuf>) -> Self {
        Self {
            documents: documents.into(),
        }
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}

#[async_trait]
impl AssetSource for LocalFolderSource {
    async fn list(&self, queue: &str) -> Result<Vec<Asset>, RemoteError> {
        let mut entries = tokio::fs::read_dir(queue).await.map_err(Error::from)?;
        let mut assets = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(Error::from)? {
            let path = entry.path();
            if !entry.file_type().await.map_err(Error::from)?.is_file() {
                continue;
            }
            let Some(name) = file_name(&path) else {
                continue;
            };
            if is_queue_image(&name) {
                assets.push(Asset {
                    id: AssetId::new(path.to_string_lossy()),
                    name,
                });
            }
        }

        assets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(assets)
    }

    async fn download(&self, id: &AssetId) -> Result<Bytes, RemoteError> {
        let content = tokio::fs::read(id.as_str()).await.map_err(Error::from)?;
        Ok(Bytes::from(content))
    }

    async fn relocate(&self, id: &AssetId, from: &str, to: &str) -> Result<(), RemoteError> {
        let source = Path::new(id.as_str());
        if source.parent() != Some(Path::new(from)) {
            return Err(Error::not_found(format!("{} is not in {}", id, from)).into());
        }
        let name = file_name(source)
            .ok_or_else(|| Error::invalid_input(format!("{} has no file name", id)))?;

        tokio::fs::create_dir_all(to).await.map_err(Error::from)?;
        tokio::fs::rename(source, Path::new(to).join(name))
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn find_document(&self, name: &str) -> Result<Option<Asset>, RemoteError> {
        let path = self.documents.join(name);
        if tokio::fs::try_exists(&path).await.map_err(Error::from)? {
            Ok(Some(Asset {
                id: AssetId::new(path.to_string_lossy()),
                name: name.to_string(),
            }))
        } else {
            Ok(None)
        }
    }
}
