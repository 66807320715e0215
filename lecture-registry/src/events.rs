//! The registry's change stream (SPEC_FULL.md §4.8): every conditional
//! write that succeeds publishes one of these through [`lecture_core::EventHub`].
//! The Event Bridge is the only consumer, but nothing here is bridge-specific.

use std::collections::HashSet;

use lecture_core::UserId;

use crate::model::VideoRequest;

/// Topic names used when publishing to the hub, exposed so subscribers can
/// pick a specific stream instead of `on_any`.
pub mod topics {
    pub const VIDEO_REQUEST_CREATED: &str = "video_request_created";
    pub const VIDEOS_AVAILABLE_CHANGED: &str = "videos_available_changed";
}

/// Payload carried on the registry change stream.
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// A new `(entryID, theme)` row was created via `createVideoRequest`.
    VideoRequestCreated(VideoRequest),

    /// `addVideoAvailable` changed a job's `videosAvailable` set.
    /// `before`/`after` let the bridge compute the set-difference itself
    /// (§4.8: first addition is `high` priority, subsequent ones `low`).
    VideosAvailableChanged {
        entry_id: String,
        owner: UserId,
        before: HashSet<String>,
        after: HashSet<String>,
    },
}

impl RegistryEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            RegistryEvent::VideoRequestCreated(_) => topics::VIDEO_REQUEST_CREATED,
            RegistryEvent::VideosAvailableChanged { .. } => topics::VIDEOS_AVAILABLE_CHANGED,
        }
    }
}
