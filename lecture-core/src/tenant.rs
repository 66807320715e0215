//! Request-scoped identity carried through admission, stage handlers, and the bridge.

/// The queue partition this deployment runs under. `lecture-queue`'s
/// `QueueCtx` carries a `tenant_id` because its backend segregates queues
/// per tenant, but this pipeline serves a single organization — every
/// enqueue, dequeue, and worker pool startup needs to agree on the same
/// value or jobs land in a partition nothing ever drains.
pub const QUEUE_TENANT: &str = "lecture-pipeline";

/// A stable subject string derived from the identity token (§3 User).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserId(pub String);

/// Context carried with every pipeline operation that needs to know who's asking.
#[derive(Debug, Clone)]
pub struct EntryContext {
    pub user_id: UserId,
    pub request_id: Option<String>,
}

impl EntryContext {
    pub fn new<S: Into<String>>(user: S) -> Self {
        Self {
            user_id: UserId(user.into()),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}
