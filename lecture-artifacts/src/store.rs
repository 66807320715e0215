use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::error::{ArtifactError, ArtifactResult};

/// Metadata returned by `head` without fetching the body.
#[derive(Debug, Clone)]
pub struct ObjectHead {
    pub size_bytes: u64,
    pub content_type: Option<String>,
}

/// Core artifact storage operations (SPEC_FULL.md §4.1).
///
/// Guarantees expected of every implementation: strong read-after-write for
/// a freshly written key, and a `head` that distinguishes "not found" from
/// every other failure via [`ArtifactError::NotFound`].
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put(&self, key: &str, content_type: Option<&str>, bytes: Bytes) -> ArtifactResult<()>;

    async fn get(&self, key: &str) -> ArtifactResult<Bytes>;

    async fn head(&self, key: &str) -> ArtifactResult<ObjectHead>;

    /// Server-side copy. Grounded on S3's `CopyObject`: a get-then-put is an
    /// acceptable implementation for stores without a native copy op.
    async fn copy(&self, src: &str, dst: &str) -> ArtifactResult<()>;

    async fn delete(&self, key: &str) -> ArtifactResult<()>;

    /// `true` if `head` would succeed, without surfacing `NotFound` as an error.
    async fn exists(&self, key: &str) -> ArtifactResult<bool> {
        match self.head(key).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

struct StoredObject {
    bytes: Bytes,
    content_type: Option<String>,
}

/// In-memory store used for tests and the default local-dev backend.
#[derive(Default, Clone)]
pub struct InMemoryArtifactStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn put(&self, key: &str, content_type: Option<&str>, bytes: Bytes) -> ArtifactResult<()> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> ArtifactResult<Bytes> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.bytes.clone())
            .ok_or_else(|| ArtifactError::not_found(key))
    }

    async fn head(&self, key: &str) -> ArtifactResult<ObjectHead> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| ObjectHead {
                size_bytes: o.bytes.len() as u64,
                content_type: o.content_type.clone(),
            })
            .ok_or_else(|| ArtifactError::not_found(key))
    }

    async fn copy(&self, src: &str, dst: &str) -> ArtifactResult<()> {
        let mut objects = self.objects.write().await;
        let source = objects
            .get(src)
            .map(|o| StoredObject {
                bytes: o.bytes.clone(),
                content_type: o.content_type.clone(),
            })
            .ok_or_else(|| ArtifactError::not_found(src))?;
        objects.insert(dst.to_string(), source);
        Ok(())
    }

    async fn delete(&self, key: &str) -> ArtifactResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }
}

/// Filesystem-backed store: a single root directory, keys map to relative paths.
#[derive(Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn put(&self, key: &str, _content_type: Option<&str>, bytes: Bytes) -> ArtifactResult<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> ArtifactResult<Bytes> {
        let bytes = tokio::fs::read(self.path_for(key)).await?;
        Ok(Bytes::from(bytes))
    }

    async fn head(&self, key: &str) -> ArtifactResult<ObjectHead> {
        let meta = tokio::fs::metadata(self.path_for(key)).await?;
        Ok(ObjectHead {
            size_bytes: meta.len(),
            content_type: None,
        })
    }

    async fn copy(&self, src: &str, dst: &str) -> ArtifactResult<()> {
        let dst_path = self.path_for(dst);
        if let Some(parent) = dst_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(self.path_for(src), &dst_path).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> ArtifactResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let store = InMemoryArtifactStore::new();
        store
            .put("assets/E1/Notes.md", Some("text/markdown"), Bytes::from("hi"))
            .await
            .unwrap();
        assert_eq!(store.get("assets/E1/Notes.md").await.unwrap(), Bytes::from("hi"));
    }

    #[tokio::test]
    async fn head_missing_key_is_not_found() {
        let store = InMemoryArtifactStore::new();
        let err = store.head("nope").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn copy_then_delete_renames() {
        let store = InMemoryArtifactStore::new();
        store
            .put("Audio-.task1.mp3", None, Bytes::from("mp3-bytes"))
            .await
            .unwrap();
        store.copy("Audio-.task1.mp3", "Audio.mp3").await.unwrap();
        store.delete("Audio-.task1.mp3").await.unwrap();
        assert_eq!(store.get("Audio.mp3").await.unwrap(), Bytes::from("mp3-bytes"));
        assert!(!store.exists("Audio-.task1.mp3").await.unwrap());
    }
}
