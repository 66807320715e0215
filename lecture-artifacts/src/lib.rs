//! lecture-artifacts: storage for derived transcript artifacts.
//!
//! Notes, narration audio, subtitle files, and rendered videos all live
//! behind the same narrow [`store::ArtifactStore`] contract: put, get,
//! head, copy, delete. Callers address artifacts through the deterministic
//! key scheme in [`keys`] rather than inventing their own naming.
//!
//! ```rust
//! use lecture_artifacts::{ArtifactAdapter, InMemoryArtifactStore, keys};
//! use bytes::Bytes;
//!
//! # #[tokio::main]
//! # async fn main() -> lecture_artifacts::ArtifactResult<()> {
//! let adapter = ArtifactAdapter::new(InMemoryArtifactStore::new());
//! let key = keys::notes_key("E1");
//! adapter.put(&key, Some("text/markdown"), Bytes::from("# Notes")).await?;
//! assert!(adapter.exists(&key).await?);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod error;
pub mod keys;
pub mod store;

pub use adapter::ArtifactAdapter;
pub use error::{ArtifactError, ArtifactResult};
pub use store::{ArtifactStore, FsArtifactStore, InMemoryArtifactStore, ObjectHead};

pub mod prelude {
    pub use crate::{
        error::{ArtifactError, ArtifactResult},
        store::{ArtifactStore, ObjectHead},
        ArtifactAdapter,
    };
}
