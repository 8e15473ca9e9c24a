//! # Instance Memory
//!
//! Storage for every instance the engine knows about.
//!
//! ## Design Philosophy
//!
//! Instances are constructed rarely and recycled often:
//! - One slot table owns all of them
//! - Pools keep handles, never the instances themselves
//! - Stale handles are caught by generation checks

mod slots;

pub use slots::InstanceSlots;
