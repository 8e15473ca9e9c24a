//! # RESPAWN Core Engine
//!
//! Keyed object pools for short-lived, frequently recycled resources:
//! effects, projectiles, trail particles.
//!
//! ## Architecture Rules
//!
//! 1. **Construct once, recycle forever** - Instances leave a pool only when
//!    the pool is cleared or they are destroyed on purpose
//! 2. **Handles, not references** - Callers hold [`InstanceId`]s; the registry
//!    owns the instances
//! 3. **The marker is authoritative** - Every instance records its pool, and
//!    despawns are routed by that record
//!
//! ## Example
//!
//! ```rust,ignore
//! use respawn_core::{PoolRegistry, Prototype};
//!
//! let missile = Arc::new(Prototype::new("missile", Effect::missile));
//! let mut registry = PoolRegistry::new();
//! registry.preload(&missile, None, 10, None)?;
//!
//! let id = registry.spawn(&missile, &Placement::at(muzzle))?;
//! // ... later
//! registry.despawn(id)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod handle;
pub mod memory;
pub mod pool;
pub mod registry;

pub use error::{PoolError, PoolResult};
pub use handle::{InstanceId, PoolKey};
pub use memory::InstanceSlots;
pub use pool::{Anchor, Membership, Pool, PoolId, PoolStats, Poolable, Prototype, PrototypeId};
pub use registry::{DespawnOutcome, PoolLookup, PoolRegistry, SharedRegistry};
