//! Collection pipeline: aggregate upstream matches, reconcile them against
//! the store and keep a run history, on a fixed schedule.

use thiserror::Error;

use battletrack_shared::{errors::UpstreamError, traits::StoreError};

pub mod aggregate;
pub mod reconcile;
pub mod scheduler;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}
