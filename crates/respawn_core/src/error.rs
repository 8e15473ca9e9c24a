//! # Pool Error Types
//!
//! All errors that can surface from the pooling engine.

use thiserror::Error;

use crate::handle::{InstanceId, PoolKey};
use crate::pool::PoolId;

/// Errors that can occur in the pooling engine.
///
/// Recoverable conditions (misdirected despawns, unmanaged instances, stale
/// free-list entries) are absorbed by the engine and never show up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// No pool is registered under the requested prototype or id.
    #[error("pool not found: {0}")]
    PoolNotFound(String),

    /// A different prototype already owns this pool id.
    #[error("pool id already registered to another prototype: {0}")]
    DuplicatePoolId(PoolId),

    /// The handle refers to an instance that no longer exists.
    #[error("stale instance handle: {0}")]
    StaleHandle(InstanceId),

    /// The instance is already sitting on a free list.
    #[error("instance {0} is already inactive")]
    AlreadyInactive(InstanceId),

    /// The instance was handed to a pool that does not own it.
    #[error("instance {instance} belongs to pool {owner}, not {pool}")]
    WrongPool {
        /// The instance being despawned.
        instance: InstanceId,
        /// The pool that received the despawn.
        pool: PoolId,
        /// The pool recorded in the instance's membership.
        owner: PoolKey,
    },

    /// The instance was never produced by a pool.
    #[error("instance {0} was never pooled")]
    NotPooled(InstanceId),

    /// The pool was cleared and no longer produces instances.
    #[error("pool {0} has been cleared")]
    PoolCleared(PoolId),

    /// Every addressable instance slot is in use.
    #[error("instance table exhausted")]
    SlotsExhausted,
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
