//! # Pool Constants
//!
//! Defaults shared by the engine and the pool manifest.

// =============================================================================
// POOL SIZING
// =============================================================================

/// Capacity hint used when a pool is declared without one.
pub const DEFAULT_START_CAPACITY: usize = 5;

/// Instances created by `preload` when no amount is given.
pub const DEFAULT_PRELOAD_AMOUNT: usize = 5;

// =============================================================================
// POOL IDENTIFIERS
// =============================================================================

/// Prefix of pool ids derived from a prototype when none is supplied.
pub const DERIVED_POOL_ID_PREFIX: &str = "proto";
