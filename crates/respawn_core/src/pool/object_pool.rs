//! # Object Pool
//!
//! LIFO free list of deactivated instances produced from one prototype.

use std::sync::Arc;

use respawn_shared::Placement;

use crate::error::{PoolError, PoolResult};
use crate::handle::{InstanceId, PoolKey};
use crate::memory::InstanceSlots;

use super::member::Membership;
use super::prototype::{Anchor, PoolId, Poolable, Prototype};

/// Counters kept per pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances constructed by the prototype factory.
    pub created: u64,
    /// Spawns served from the free list.
    pub reused: u64,
    /// Free-list entries thrown away because they were no longer valid.
    pub stale_discarded: u64,
    /// Despawns that were addressed to another pool and rerouted here.
    pub redirects_received: u64,
    /// Instances currently handed out.
    pub active: usize,
}

/// A pool of recyclable instances sharing one prototype.
///
/// The pool keeps handles only; instances live in the registry's
/// [`InstanceSlots`]. The most recently despawned instance is the next one
/// spawned.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It is mutated only through its registry.
pub struct Pool<R> {
    /// Registry key, recorded in every instance's membership.
    key: PoolKey,
    /// Human-readable id.
    id: PoolId,
    /// Factory. `None` once the pool is cleared.
    prototype: Option<Arc<Prototype<R>>>,
    /// Free list - handles of inactive instances, top is last.
    inactive: Vec<InstanceId>,
    /// Placement target for spawned instances.
    anchor: Option<Anchor>,
    stats: PoolStats,
}

impl<R> Pool<R> {
    /// Creates an empty pool.
    ///
    /// `capacity_hint` only sizes the free list; no instance is created. An
    /// absent or empty `pool_id` falls back to the prototype's derived id.
    pub(crate) fn new(
        key: PoolKey,
        prototype: Arc<Prototype<R>>,
        capacity_hint: usize,
        pool_id: Option<&str>,
        anchor: Option<Anchor>,
    ) -> Self {
        let id = match pool_id {
            Some(id) if !id.is_empty() => PoolId::from(id),
            _ => prototype.derived_pool_id(),
        };

        Self {
            key,
            id,
            prototype: Some(prototype),
            inactive: Vec::with_capacity(capacity_hint),
            anchor,
            stats: PoolStats::default(),
        }
    }

    /// The registry key of this pool.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> PoolKey {
        self.key
    }

    /// The pool id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> &PoolId {
        &self.id
    }

    /// The placement target, if any.
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    /// Number of handles on the free list, stale ones included.
    ///
    /// See [`reusable_count`](Self::reusable_count) for what a spawn can
    /// actually hand out.
    #[inline]
    #[must_use]
    pub fn inactive_count(&self) -> usize {
        self.inactive.len()
    }

    /// Number of free-list entries that still name a live, inactive
    /// instance of this pool.
    #[must_use]
    pub fn reusable_count(&self, slots: &InstanceSlots<R>) -> usize {
        self.inactive
            .iter()
            .filter(|&&id| self.is_reusable(slots, id))
            .count()
    }

    /// Free-list contents, bottom first. The next spawn pops the last entry.
    #[inline]
    #[must_use]
    pub fn free_list(&self) -> &[InstanceId] {
        &self.inactive
    }

    /// Snapshot of the pool counters.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Checks whether the pool was cleared.
    #[inline]
    #[must_use]
    pub const fn is_cleared(&self) -> bool {
        self.prototype.is_none()
    }

    pub(crate) fn record_redirect(&mut self) {
        self.stats.redirects_received += 1;
    }

    /// Accounts for an active instance destroyed out of band.
    pub(crate) fn forget_active(&mut self) {
        self.stats.active = self.stats.active.saturating_sub(1);
    }

    /// Empties the pool.
    ///
    /// Inactive instances are destroyed. Instances still handed out are left
    /// alone; their membership no longer resolves once the registry forgets
    /// this pool. Returns the number of instances destroyed.
    pub(crate) fn clear(&mut self, slots: &mut InstanceSlots<R>) -> usize {
        let mut destroyed = 0;
        for id in self.inactive.drain(..) {
            let owned = slots.membership(id).is_some_and(|m| m.belongs_to(self.key));
            if owned && slots.is_active(id) == Some(false) && slots.remove(id).is_some() {
                destroyed += 1;
            }
        }
        self.prototype = None;
        self.anchor = None;
        destroyed
    }

    /// Pops free-list entries until one is still a valid candidate.
    ///
    /// An entry is valid while its instance is alive, inactive, and owned by
    /// this pool. Anything else was destroyed or recycled out of band.
    fn is_reusable(&self, slots: &InstanceSlots<R>, id: InstanceId) -> bool {
        slots.membership(id).is_some_and(|m| m.belongs_to(self.key)) && slots.is_active(id) == Some(false)
    }

    fn pop_valid(&mut self, slots: &InstanceSlots<R>) -> Option<InstanceId> {
        while let Some(candidate) = self.inactive.pop() {
            if self.is_reusable(slots, candidate) {
                return Some(candidate);
            }
            self.stats.stale_discarded += 1;
            tracing::debug!(pool = %self.id, instance = %candidate, "discarding stale free-list entry");
        }
        None
    }
}

impl<R: Poolable> Pool<R> {
    /// Hands out an active instance at `placement`.
    ///
    /// Reuses the top of the free list, or constructs a new instance through
    /// the prototype when the list is exhausted.
    pub(crate) fn spawn(&mut self, slots: &mut InstanceSlots<R>, placement: &Placement) -> PoolResult<InstanceId> {
        let id = if let Some(id) = self.pop_valid(slots) {
            self.stats.reused += 1;
            id
        } else {
            let prototype = self
                .prototype
                .as_ref()
                .ok_or_else(|| PoolError::PoolCleared(self.id.clone()))?;
            let id = slots
                .insert(prototype.instantiate(), Membership::Managed(self.key), false)
                .ok_or(PoolError::SlotsExhausted)?;
            self.stats.created += 1;
            tracing::trace!(pool = %self.id, instance = %id, "constructed new instance");
            id
        };

        slots.activate(id, placement, self.anchor.as_ref());
        self.stats.active += 1;
        Ok(id)
    }

    /// Deactivates `id` and pushes it onto the free list.
    ///
    /// The instance must be active and owned by this pool.
    pub(crate) fn despawn(&mut self, slots: &mut InstanceSlots<R>, id: InstanceId) -> PoolResult<()> {
        match slots.membership(id) {
            None => return Err(PoolError::StaleHandle(id)),
            Some(Membership::Managed(owner)) if owner == self.key => {}
            Some(Membership::Managed(owner)) => {
                return Err(PoolError::WrongPool {
                    instance: id,
                    pool: self.id.clone(),
                    owner,
                })
            }
            Some(Membership::Unmanaged) => return Err(PoolError::NotPooled(id)),
        }

        if slots.is_active(id) != Some(true) {
            return Err(PoolError::AlreadyInactive(id));
        }

        slots.deactivate(id);
        self.inactive.push(id);
        self.stats.active = self.stats.active.saturating_sub(1);
        Ok(())
    }
}
