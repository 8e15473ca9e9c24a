//! # RESPAWN Shared
//!
//! Common types used by both the pooling engine and the game.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on game logic or the pooling engine.
//! Only plain data lives here.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{DEFAULT_PRELOAD_AMOUNT, DEFAULT_START_CAPACITY, DERIVED_POOL_ID_PREFIX};
pub use math::{Placement, Quaternion, Transform, Vec3};
