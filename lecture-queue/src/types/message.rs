use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::JobPriority;

/// Default retention window for a completed/archived task before it's
/// eligible for cleanup (SPEC_FULL.md §3/§4.3: "retention (>= 1h)").
pub const MIN_RETENTION: Duration = Duration::from_secs(3600);

/// Job message - immutable submission data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMessage {
    /// Job type identifier for dispatch
    pub job_type: String,

    /// Serialized job payload (opaque bytes)
    pub payload_bytes: Vec<u8>,

    /// Codec used for serialization
    pub codec: String,

    /// Target queue name
    pub queue: String,

    /// Job priority for ordering
    pub priority: JobPriority,

    /// Maximum retry attempts
    pub max_retries: u32,

    /// When the job should be eligible for processing
    pub run_at: DateTime<Utc>,

    /// Optional idempotency key (scoped by tenant/queue/job_type)
    pub idempotency_key: Option<String>,

    /// How long a terminal task record is kept around for status queries
    /// before it is eligible for deletion (SPEC_FULL.md §3/§4.3).
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

fn default_retention_secs() -> u64 {
    MIN_RETENTION.as_secs()
}

impl JobMessage {
    /// Create a new job message
    pub fn new(
        job_type: String,
        payload_bytes: Vec<u8>,
        codec: String,
        queue: String,
    ) -> Self {
        Self {
            job_type,
            payload_bytes,
            codec,
            queue,
            priority: JobPriority::default(),
            max_retries: 3,
            run_at: Utc::now(),
            idempotency_key: None,
            retention_secs: default_retention_secs(),
        }
    }

    /// Set the retention window, floored at the spec's one-hour minimum.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention_secs = retention.max(MIN_RETENTION).as_secs();
        self
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    /// Set the job priority
    pub fn with_priority(mut self, priority: JobPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the maximum retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set when the job should run
    pub fn with_run_at(mut self, run_at: DateTime<Utc>) -> Self {
        self.run_at = run_at;
        self
    }

    /// Set the idempotency key
    pub fn with_idempotency_key(mut self, key: String) -> Self {
        self.idempotency_key = Some(key);
        self
    }

    /// Check if the job is eligible to run now
    pub fn is_eligible(&self) -> bool {
        self.run_at <= Utc::now()
    }

    /// Get the payload size in bytes
    pub fn payload_size(&self) -> usize {
        self.payload_bytes.len()
    }
}
