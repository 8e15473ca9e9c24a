//! # Pool Membership
//!
//! The marker every instance carries once the engine knows about it.

use crate::handle::PoolKey;

/// Which pool, if any, an instance belongs to.
///
/// This is a relation, not ownership: the key does not keep the pool alive,
/// and a key whose pool has been cleared simply stops resolving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Membership {
    /// Never pooled. Despawning destroys it.
    #[default]
    Unmanaged,
    /// Produced by the pool with this key.
    Managed(PoolKey),
}

impl Membership {
    /// Returns the owning pool key, if managed.
    #[inline]
    #[must_use]
    pub const fn pool(self) -> Option<PoolKey> {
        match self {
            Self::Unmanaged => None,
            Self::Managed(key) => Some(key),
        }
    }

    /// Checks whether this marker names `key`.
    #[inline]
    #[must_use]
    pub fn belongs_to(self, key: PoolKey) -> bool {
        self == Self::Managed(key)
    }
}
