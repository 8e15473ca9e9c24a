//! # Pool Registry
//!
//! The namespace for every pool, plus the despawn routing that makes
//! mis-addressed releases safe.
//!
//! ## Maps
//!
//! ```text
//!   PrototypeId ──┐
//!                 ├──> PoolKey ──> Pool<R>
//!   PoolId ───────┘
//! ```
//!
//! Both maps always hold the same set of pools. Instances point back at
//! their pool through [`Membership`], which stores a `PoolKey` and nothing
//! more.

mod shared;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use respawn_shared::{Placement, DEFAULT_START_CAPACITY};

use crate::error::{PoolError, PoolResult};
use crate::handle::{InstanceId, PoolKey};
use crate::memory::InstanceSlots;
use crate::pool::{Anchor, Membership, Pool, PoolId, PoolStats, Poolable, Prototype, PrototypeId};

pub use shared::SharedRegistry;

/// How a caller names a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolLookup<'a> {
    /// By the prototype the pool was created for.
    Prototype(PrototypeId),
    /// By pool id.
    Id(&'a str),
    /// By registry key.
    Key(PoolKey),
}

impl fmt::Display for PoolLookup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prototype(id) => write!(f, "prototype {id}"),
            Self::Id(id) => write!(f, "id {id:?}"),
            Self::Key(key) => write!(f, "{key}"),
        }
    }
}

impl<'a, R> From<&'a Prototype<R>> for PoolLookup<'a> {
    fn from(prototype: &'a Prototype<R>) -> Self {
        Self::Prototype(prototype.id())
    }
}

impl<'a, R> From<&'a Arc<Prototype<R>>> for PoolLookup<'a> {
    fn from(prototype: &'a Arc<Prototype<R>>) -> Self {
        Self::Prototype(prototype.id())
    }
}

impl<'a> From<&'a str> for PoolLookup<'a> {
    fn from(id: &'a str) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<&'a PoolId> for PoolLookup<'a> {
    fn from(id: &'a PoolId) -> Self {
        Self::Id(id.as_str())
    }
}

impl From<PrototypeId> for PoolLookup<'_> {
    fn from(id: PrototypeId) -> Self {
        Self::Prototype(id)
    }
}

impl From<PoolKey> for PoolLookup<'_> {
    fn from(key: PoolKey) -> Self {
        Self::Key(key)
    }
}

/// What happened to a despawned instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DespawnOutcome {
    /// Deactivated and pushed onto its pool's free list.
    Recycled {
        /// The owning pool.
        pool: PoolId,
    },
    /// Addressed to the wrong pool, recycled into its real owner.
    Redirected {
        /// The pool the caller named.
        requested: String,
        /// The pool that received the instance.
        owner: PoolId,
    },
    /// Never pooled, destroyed.
    Destroyed,
    /// Its pool had been cleared, destroyed.
    DestroyedOrphan,
}

/// Registry of pools over one resource type.
///
/// Owns every instance (through an [`InstanceSlots`] table) and every pool.
/// Construct one per session and hand it to whoever spawns; there is no
/// global instance. Use [`SharedRegistry`] when several threads need it.
///
/// # Example
///
/// ```rust,ignore
/// let trail = Arc::new(Prototype::new("trail", Effect::trail));
///
/// let mut registry = PoolRegistry::new();
/// registry.preload(&trail, Some("MissileTrail"), 20, None)?;
///
/// let id = registry.spawn("MissileTrail", &Placement::at(pos))?;
/// registry.despawn(id)?;
/// ```
pub struct PoolRegistry<R> {
    /// Every live instance.
    slots: InstanceSlots<R>,
    /// Every pool, by key.
    pools: HashMap<PoolKey, Pool<R>>,
    /// Prototype identity -> pool.
    by_prototype: HashMap<PrototypeId, PoolKey>,
    /// Pool id -> pool.
    by_id: HashMap<PoolId, PoolKey>,
    /// Next key to hand out. Never reused.
    next_key: u64,
}

impl<R> PoolRegistry<R> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: InstanceSlots::default(),
            pools: HashMap::new(),
            by_prototype: HashMap::new(),
            by_id: HashMap::new(),
            next_key: 0,
        }
    }

    /// Number of registered pools.
    #[inline]
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Checks whether no pool is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Ids of all registered pools, in no particular order.
    pub fn pool_ids(&self) -> impl Iterator<Item = &PoolId> {
        self.by_id.keys()
    }

    /// Number of live instances, active or not, pooled or not.
    #[inline]
    #[must_use]
    pub const fn live_instances(&self) -> usize {
        self.slots.live_count()
    }

    /// Resolves a lookup to a registered pool key.
    #[must_use]
    pub fn resolve<'a>(&self, lookup: impl Into<PoolLookup<'a>>) -> Option<PoolKey> {
        match lookup.into() {
            PoolLookup::Prototype(id) => self.by_prototype.get(&id).copied(),
            PoolLookup::Id(id) => self.by_id.get(id).copied(),
            PoolLookup::Key(key) => self.pools.contains_key(&key).then_some(key),
        }
    }

    /// Checks whether a pool is registered under `lookup`.
    #[must_use]
    pub fn contains_pool<'a>(&self, lookup: impl Into<PoolLookup<'a>>) -> bool {
        self.resolve(lookup).is_some()
    }

    /// Gets a registered pool.
    #[must_use]
    pub fn pool<'a>(&self, lookup: impl Into<PoolLookup<'a>>) -> Option<&Pool<R>> {
        self.pools.get(&self.resolve(lookup)?)
    }

    /// Counters of a registered pool.
    #[must_use]
    pub fn pool_stats<'a>(&self, lookup: impl Into<PoolLookup<'a>>) -> Option<PoolStats> {
        self.pool(lookup).map(Pool::stats)
    }

    /// Instances a registered pool can hand out without constructing.
    ///
    /// Free-list entries invalidated by [`destroy`](Self::destroy) are not
    /// counted.
    #[must_use]
    pub fn inactive_count<'a>(&self, lookup: impl Into<PoolLookup<'a>>) -> Option<usize> {
        self.pool(lookup).map(|pool| pool.reusable_count(&self.slots))
    }

    /// Gets a reference to an instance.
    #[inline]
    #[must_use]
    pub fn get(&self, id: InstanceId) -> Option<&R> {
        self.slots.get(id)
    }

    /// Gets a mutable reference to an instance.
    #[inline]
    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut R> {
        self.slots.get_mut(id)
    }

    /// Checks whether `id` refers to a live instance.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: InstanceId) -> bool {
        self.slots.contains(id)
    }

    /// Returns whether an instance is handed out (`Some(true)`), on a free
    /// list (`Some(false)`), or gone (`None`).
    #[inline]
    #[must_use]
    pub fn is_active(&self, id: InstanceId) -> Option<bool> {
        self.slots.is_active(id)
    }

    /// Returns the membership marker of an instance.
    #[inline]
    #[must_use]
    pub fn membership(&self, id: InstanceId) -> Option<Membership> {
        self.slots.membership(id)
    }

    /// Returns the id of the pool that owns `id`.
    ///
    /// `None` for unmanaged instances, orphans, and stale handles.
    #[must_use]
    pub fn owner_of(&self, id: InstanceId) -> Option<&PoolId> {
        let key = self.slots.membership(id)?.pool()?;
        self.pools.get(&key).map(Pool::id)
    }

    /// Registers a pool for `prototype`.
    ///
    /// Idempotent per prototype: if a pool already exists the call returns its
    /// key and ignores the other arguments. An absent or empty `pool_id`
    /// falls back to the prototype's derived id.
    ///
    /// # Errors
    ///
    /// [`PoolError::DuplicatePoolId`] if another prototype already owns the id.
    pub fn init(
        &mut self,
        prototype: &Arc<Prototype<R>>,
        pool_id: Option<&str>,
        start_capacity: usize,
        anchor: Option<Anchor>,
    ) -> PoolResult<PoolKey> {
        if let Some(&key) = self.by_prototype.get(&prototype.id()) {
            tracing::debug!(prototype = prototype.name(), %key, "pool already registered");
            return Ok(key);
        }

        let key = PoolKey::new(self.next_key);
        let pool = Pool::new(key, Arc::clone(prototype), start_capacity, pool_id, anchor);
        if self.by_id.contains_key(pool.id()) {
            return Err(PoolError::DuplicatePoolId(pool.id().clone()));
        }
        self.next_key += 1;

        tracing::info!(
            pool = %pool.id(),
            prototype = prototype.name(),
            capacity = start_capacity,
            "pool registered"
        );

        self.by_prototype.insert(prototype.id(), key);
        self.by_id.insert(pool.id().clone(), key);
        self.pools.insert(key, pool);
        Ok(key)
    }

    /// Destroys an instance out of band.
    ///
    /// If it sat on a free list, that entry turns stale and is skipped by the
    /// next spawn. Returns the destroyed resource.
    pub fn destroy(&mut self, id: InstanceId) -> Option<R> {
        let (resource, membership, active) = self.slots.remove(id)?;
        if active {
            if let Some(pool) = membership.pool().and_then(|key| self.pools.get_mut(&key)) {
                pool.forget_active();
            }
        }
        Some(resource)
    }

    /// Tracks a caller-constructed instance that never came from a pool.
    ///
    /// It counts as active, and despawning it destroys it.
    ///
    /// # Errors
    ///
    /// [`PoolError::SlotsExhausted`] if no slot is left.
    pub fn adopt(&mut self, resource: R) -> PoolResult<InstanceId> {
        self.slots
            .insert(resource, Membership::Unmanaged, true)
            .ok_or(PoolError::SlotsExhausted)
    }

    /// Clears every pool and forgets them all.
    ///
    /// Instances still handed out become orphans: their membership no longer
    /// resolves, and despawning them destroys them.
    pub fn clear_all(&mut self) {
        let pools = self.pools.len();
        let mut destroyed = 0;
        for pool in self.pools.values_mut() {
            destroyed += pool.clear(&mut self.slots);
        }
        let orphans = self
            .pools
            .values()
            .map(|pool| pool.stats().active)
            .sum::<usize>();

        self.pools.clear();
        self.by_prototype.clear();
        self.by_id.clear();

        tracing::info!(pools, destroyed, orphans, "all pools cleared");
    }
}

impl<R: Poolable> PoolRegistry<R> {
    /// Registers a pool and fills its free list with `amount` instances.
    ///
    /// Each instance is spawned at [`Placement::ORIGIN`] and despawned again,
    /// so construction cost is paid now rather than on first use.
    ///
    /// # Errors
    ///
    /// Whatever [`init`](Self::init) or spawning reports. Instances spawned
    /// before a failure are returned to the pool.
    pub fn preload(
        &mut self,
        prototype: &Arc<Prototype<R>>,
        pool_id: Option<&str>,
        amount: usize,
        anchor: Option<Anchor>,
    ) -> PoolResult<PoolKey> {
        let key = self.init(prototype, pool_id, amount, anchor)?;

        let mut warmed = Vec::with_capacity(amount);
        let mut failure = None;
        for _ in 0..amount {
            match self.spawn(key, &Placement::ORIGIN) {
                Ok(id) => warmed.push(id),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        for id in warmed {
            self.despawn(id)?;
        }

        match failure {
            Some(err) => Err(err),
            None => {
                tracing::debug!(prototype = prototype.name(), amount, "pool preloaded");
                Ok(key)
            }
        }
    }

    /// Registers a pool with the default capacity, no id and no anchor.
    ///
    /// # Errors
    ///
    /// See [`init`](Self::init).
    pub fn init_default(&mut self, prototype: &Arc<Prototype<R>>) -> PoolResult<PoolKey> {
        self.init(prototype, None, DEFAULT_START_CAPACITY, None)
    }

    /// Hands out an active instance from the pool named by `lookup`.
    ///
    /// Never creates a pool.
    ///
    /// # Errors
    ///
    /// [`PoolError::PoolNotFound`] if nothing is registered under `lookup`.
    pub fn spawn<'a>(&mut self, lookup: impl Into<PoolLookup<'a>>, placement: &Placement) -> PoolResult<InstanceId> {
        let lookup = lookup.into();
        let pool = self
            .resolve(lookup)
            .and_then(|key| self.pools.get_mut(&key))
            .ok_or_else(|| PoolError::PoolNotFound(lookup.to_string()))?;
        pool.spawn(&mut self.slots, placement)
    }

    /// Returns an instance to wherever it belongs.
    ///
    /// - pooled: deactivated and pushed onto its owner's free list
    /// - never pooled: destroyed
    /// - orphaned by `clear_all`: destroyed
    ///
    /// # Errors
    ///
    /// [`PoolError::StaleHandle`] for a destroyed instance,
    /// [`PoolError::AlreadyInactive`] for a double despawn.
    pub fn despawn(&mut self, id: InstanceId) -> PoolResult<DespawnOutcome> {
        match self.slots.membership(id) {
            None => Err(PoolError::StaleHandle(id)),
            Some(Membership::Unmanaged) => {
                self.slots.remove(id);
                tracing::debug!(instance = %id, "destroyed unmanaged instance");
                Ok(DespawnOutcome::Destroyed)
            }
            Some(Membership::Managed(key)) => {
                if let Some(pool) = self.pools.get_mut(&key) {
                    pool.despawn(&mut self.slots, id)?;
                    return Ok(DespawnOutcome::Recycled { pool: pool.id().clone() });
                }
                if self.slots.is_active(id) != Some(true) {
                    return Err(PoolError::AlreadyInactive(id));
                }
                self.slots.remove(id);
                tracing::warn!(instance = %id, %key, "despawned an orphan of a cleared pool, destroying it");
                Ok(DespawnOutcome::DestroyedOrphan)
            }
        }
    }

    /// Returns an instance to the pool the caller believes owns it.
    ///
    /// The instance's membership is authoritative: if it names a different
    /// pool the despawn is redirected there, with a warning.
    ///
    /// # Errors
    ///
    /// As [`despawn`](Self::despawn).
    pub fn despawn_to<'a>(&mut self, lookup: impl Into<PoolLookup<'a>>, id: InstanceId) -> PoolResult<DespawnOutcome> {
        let lookup = lookup.into();
        let requested = self.resolve(lookup);
        let owner = self.slots.membership(id).and_then(Membership::pool);

        match owner {
            Some(owner) if requested != Some(owner) && self.pools.contains_key(&owner) => {
                tracing::warn!(
                    instance = %id,
                    requested = %lookup,
                    "despawning an instance to the wrong pool, redirecting"
                );
                match self.despawn(id)? {
                    DespawnOutcome::Recycled { pool } => {
                        if let Some(owner_pool) = self.pools.get_mut(&owner) {
                            owner_pool.record_redirect();
                        }
                        Ok(DespawnOutcome::Redirected {
                            requested: lookup.to_string(),
                            owner: pool,
                        })
                    }
                    other => Ok(other),
                }
            }
            _ => self.despawn(id),
        }
    }
}

impl<R> Default for PoolRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for PoolRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("pools", &self.pools.len())
            .field("live_instances", &self.slots.live_count())
            .finish_non_exhaustive()
    }
}
