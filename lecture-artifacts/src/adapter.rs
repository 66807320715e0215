use std::sync::Arc;

use bytes::Bytes;

use crate::error::ArtifactResult;
use crate::store::{ArtifactStore, ObjectHead};

/// Thin convenience wrapper over an [`ArtifactStore`]. Services embed this
/// rather than talking to the store trait object directly, so the
/// deterministic key scheme and the provisional-to-final rename dance stay
/// in one place.
#[derive(Clone)]
pub struct ArtifactAdapter {
    store: Arc<dyn ArtifactStore>,
}

impl ArtifactAdapter {
    pub fn new<S: ArtifactStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn from_arc(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    pub async fn put(&self, key: &str, content_type: Option<&str>, bytes: Bytes) -> ArtifactResult<()> {
        self.store.put(key, content_type, bytes).await
    }

    pub async fn get(&self, key: &str) -> ArtifactResult<Bytes> {
        self.store.get(key).await
    }

    pub async fn head(&self, key: &str) -> ArtifactResult<ObjectHead> {
        self.store.head(key).await
    }

    pub async fn exists(&self, key: &str) -> ArtifactResult<bool> {
        self.store.exists(key).await
    }

    pub async fn delete(&self, key: &str) -> ArtifactResult<()> {
        self.store.delete(key).await
    }

    /// Promote a provisional artifact to its final key once the owning
    /// operation has confirmed the write is good, then remove the
    /// provisional copy. Used by the speech synthesis driver to canonicalize
    /// a finished narration (SPEC_FULL.md §4.4) and by the video stage to
    /// publish a finished render (§4.6).
    pub async fn finalize(&self, provisional_key: &str, final_key: &str) -> ArtifactResult<()> {
        self.store.copy(provisional_key, final_key).await?;
        self.store.delete(provisional_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{audio_key, provisional_audio_key};
    use crate::store::InMemoryArtifactStore;

    #[tokio::test]
    async fn finalize_renames_provisional_into_final_key() {
        let adapter = ArtifactAdapter::new(InMemoryArtifactStore::new());
        let provisional = provisional_audio_key("task-1");
        let final_key = audio_key("E1");

        adapter
            .put(&provisional, Some("audio/mpeg"), Bytes::from("narration"))
            .await
            .unwrap();
        adapter.finalize(&provisional, &final_key).await.unwrap();

        assert!(!adapter.exists(&provisional).await.unwrap());
        assert_eq!(adapter.get(&final_key).await.unwrap(), Bytes::from("narration"));
    }
}
