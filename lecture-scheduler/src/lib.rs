//! Submission admission gateway and registry-change event bridge
//! (SPEC_FULL.md §4.7/§4.8): the two request-scoped, stateless entry points
//! that turn an HTTP submission or a registry mutation into a queued task.

pub mod admission;
pub mod bridge;
pub mod error;

pub use admission::{JobScheduler, Planned, Submission, THEMES};
pub use bridge::{BridgeFailure, EventBridge};
pub use error::{SchedulerError, SchedulerResult};
