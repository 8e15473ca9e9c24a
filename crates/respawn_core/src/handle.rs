//! # Handles
//!
//! Instances are addressed by lightweight identifiers consisting of:
//! - An index into the instance slot table
//! - A generation counter for safe slot reuse
//!
//! Pools are addressed by a [`PoolKey`] that is never handed out twice.

use std::fmt;

/// Unique identifier for a pooled (or adopted) instance.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into the slot table
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Creates a new instance ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The index into the slot table
    /// * `generation` - The generation counter
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the instance ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the instance ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid instance ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this instance ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

/// Registry-assigned key of a pool.
///
/// Keys are never reused, so a key recorded before `clear_all` can never
/// resolve to a pool created afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct PoolKey(u64);

impl PoolKey {
    #[inline]
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_id_roundtrip() {
        let id = InstanceId::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
        assert!(!id.is_null());
    }

    #[test]
    fn test_instance_id_default_is_null() {
        assert!(InstanceId::default().is_null());
        assert_eq!(InstanceId::new(3, 1).to_string(), "3v1");
    }
}
