//! # Shared Registry
//!
//! A cloneable handle for hosts that spawn from more than one thread.
//!
//! One lock guards the whole registry: the maps, the pools and the instance
//! table move together, so there is nothing finer-grained worth locking.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use respawn_shared::Placement;

use crate::error::PoolResult;
use crate::handle::{InstanceId, PoolKey};
use crate::pool::{Anchor, Poolable, Prototype};

use super::{DespawnOutcome, PoolLookup, PoolRegistry};

/// Thread-safe handle to a [`PoolRegistry`].
///
/// Clones share the same registry. Every call takes the lock for its own
/// duration only; use [`lock`](Self::lock) to batch several operations.
pub struct SharedRegistry<R> {
    inner: Arc<Mutex<PoolRegistry<R>>>,
}

impl<R> SharedRegistry<R> {
    /// Wraps an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::from_registry(PoolRegistry::new())
    }

    /// Wraps an existing registry.
    #[must_use]
    pub fn from_registry(registry: PoolRegistry<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Locks the registry.
    pub fn lock(&self) -> MutexGuard<'_, PoolRegistry<R>> {
        self.inner.lock()
    }

    /// Runs `f` with the registry locked.
    pub fn with<T>(&self, f: impl FnOnce(&mut PoolRegistry<R>) -> T) -> T {
        f(&mut self.inner.lock())
    }

    /// Registers a pool. See [`PoolRegistry::init`].
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::init`].
    pub fn init(
        &self,
        prototype: &Arc<Prototype<R>>,
        pool_id: Option<&str>,
        start_capacity: usize,
        anchor: Option<Anchor>,
    ) -> PoolResult<PoolKey> {
        self.inner.lock().init(prototype, pool_id, start_capacity, anchor)
    }

    /// Clears every pool. See [`PoolRegistry::clear_all`].
    pub fn clear_all(&self) {
        self.inner.lock().clear_all();
    }

    /// Number of registered pools.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.inner.lock().pool_count()
    }
}

impl<R: Poolable> SharedRegistry<R> {
    /// Registers and fills a pool. See [`PoolRegistry::preload`].
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::preload`].
    pub fn preload(
        &self,
        prototype: &Arc<Prototype<R>>,
        pool_id: Option<&str>,
        amount: usize,
        anchor: Option<Anchor>,
    ) -> PoolResult<PoolKey> {
        self.inner.lock().preload(prototype, pool_id, amount, anchor)
    }

    /// Spawns from a pool. See [`PoolRegistry::spawn`].
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::spawn`].
    pub fn spawn<'a>(&self, lookup: impl Into<PoolLookup<'a>>, placement: &Placement) -> PoolResult<InstanceId> {
        self.inner.lock().spawn(lookup, placement)
    }

    /// Despawns an instance. See [`PoolRegistry::despawn`].
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::despawn`].
    pub fn despawn(&self, id: InstanceId) -> PoolResult<DespawnOutcome> {
        self.inner.lock().despawn(id)
    }

    /// Despawns to an assumed pool. See [`PoolRegistry::despawn_to`].
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::despawn_to`].
    pub fn despawn_to<'a>(&self, lookup: impl Into<PoolLookup<'a>>, id: InstanceId) -> PoolResult<DespawnOutcome> {
        self.inner.lock().despawn_to(lookup, id)
    }
}

impl<R> Clone for SharedRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Default for SharedRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for SharedRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRegistry").finish_non_exhaustive()
    }
}
