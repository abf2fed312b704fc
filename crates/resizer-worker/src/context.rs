//! Persist handler trait
//!
//! The queue calls `handle` once per job on a worker task. The production implementation is
//! [`crate::StoreAndIndex`]; tests substitute their own.

use anyhow::Result;
use async_trait::async_trait;

use crate::persist::PersistJob;

#[async_trait]
pub trait PersistHandler: Send + Sync {
    async fn handle(&self, job: PersistJob) -> Result<()>;
}
