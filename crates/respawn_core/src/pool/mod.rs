//! # Pools
//!
//! Per-prototype free lists and the marker that ties instances to them.
//!
//! ## Reuse Order
//!
//! Free lists are stacks: the most recently despawned instance is the next
//! one handed out.

mod member;
mod object_pool;
mod prototype;

pub use member::Membership;
pub use object_pool::{Pool, PoolStats};
pub use prototype::{Anchor, PoolId, Poolable, Prototype, PrototypeId};
