//! Resizer Worker Library
//!
//! Rendered images are returned to the client before they are stored. This crate owns what
//! happens afterwards: a bounded queue of persist jobs drained by a fixed pool of workers,
//! each of which uploads the blob and then records it in the metadata index.

pub mod context;
pub mod persist;
pub mod queue;

pub use context::PersistHandler;
pub use persist::{PersistJob, StoreAndIndex};
pub use queue::{PersistQueue, PersistQueueConfig, SubmitOutcome};
