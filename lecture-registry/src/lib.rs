//! lecture-registry: the Job/User/VideoRequest store (SPEC_FULL.md §3/§4.2).
//!
//! Every mutation is a single-row conditional write — there are no
//! cross-row transactions. [`RegistryBackend`] is the contract; there are
//! no multi-statement transactions to hide behind a generic query builder,
//! so the trait exposes exactly the nine operations the spec names instead
//! of a generic CRUD surface. [`InMemoryRegistry`] is the only backend
//! shipped here, and doubles as the default test double (§10.4).

pub mod backend;
pub mod error;
pub mod events;
pub mod memory;
pub mod model;

pub use backend::RegistryBackend;
pub use error::{RegistryError, RegistryResult};
pub use events::{topics, RegistryEvent};
pub use memory::InMemoryRegistry;
pub use model::{Job, User, VideoRequest};
