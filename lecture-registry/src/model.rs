//! Row shapes for the three entities the registry owns (SPEC_FULL.md §3).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use lecture_core::UserId;
use serde::{Deserialize, Serialize};

/// A lecture entry and the derived artifacts it has (or hasn't) produced.
///
/// Flags only ever flip `false -> true`; `videosAvailable` only ever grows.
/// Both invariants are enforced by the backend, not by this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub entry_id: String,
    pub title: String,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub notes_generated: bool,
    pub summary_generated: bool,
    pub subtitles_generated: bool,
    pub videos_available: HashSet<String>,
}

impl Job {
    pub fn new(entry_id: impl Into<String>, title: impl Into<String>, owner: UserId) -> Self {
        Self {
            entry_id: entry_id.into(),
            title: title.into(),
            owner,
            created_at: Utc::now(),
            notes_generated: false,
            summary_generated: false,
            subtitles_generated: false,
            videos_available: HashSet::new(),
        }
    }
}

/// A caller identified by the subject string derived from their identity token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub permitted_generations: u32,
    pub scheduled_jobs: HashSet<String>,
}

impl User {
    pub fn new(user_id: UserId, display_name: impl Into<String>, permitted_generations: u32) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            created_at: Utc::now(),
            permitted_generations,
            scheduled_jobs: HashSet::new(),
        }
    }
}

/// A `(entryID, theme)` row recording a request for a particular background
/// variant. Creating one is how a caller asks the Event Bridge to build it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoRequest {
    pub entry_id: String,
    pub theme: String,
    pub requester: UserId,
    pub created_at: DateTime<Utc>,
    pub ttl: std::time::Duration,
}
