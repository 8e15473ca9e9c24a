//! # Prototypes
//!
//! A prototype is the template a pool instantiates from. Its identity is the
//! primary key of the registry; its name is only for humans.

use std::borrow::Borrow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use respawn_shared::{Placement, Vec3, DERIVED_POOL_ID_PREFIX};

/// Contract every pooled resource fulfils.
///
/// The engine never inspects a resource beyond these two calls. Resetting
/// resource-specific state between reuses is the resource's own job.
pub trait Poolable {
    /// Brings the resource into play at `placement`.
    ///
    /// `anchor` is the pool's placement target, if one was configured; the
    /// resource should attach itself to it.
    fn activate(&mut self, placement: &Placement, anchor: Option<&Anchor>);

    /// Takes the resource out of play. It stays alive on a free list.
    fn deactivate(&mut self);
}

/// A placement target that spawned instances are attached to.
///
/// Stands in for a parent node. A resource activated with an anchor treats
/// the spawn placement as relative to [`origin`](Self::origin).
#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    name: String,
    origin: Vec3,
}

impl Anchor {
    /// Creates a named anchor at `origin`.
    #[must_use]
    pub fn new(name: impl Into<String>, origin: Vec3) -> Self {
        Self {
            name: name.into(),
            origin,
        }
    }

    /// The anchor's name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The anchor's world origin.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }
}

/// Process-unique prototype identity, stable for the prototype's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct PrototypeId(u64);

impl PrototypeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PrototypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

type Factory<R> = Box<dyn Fn() -> R + Send + Sync>;

/// Template plus factory for one family of resources.
///
/// Share it behind an `Arc`; every clone of the `Arc` is the same prototype.
pub struct Prototype<R> {
    id: PrototypeId,
    name: String,
    factory: Factory<R>,
}

impl<R> Prototype<R> {
    /// Creates a prototype with a fresh identity.
    #[must_use]
    pub fn new(name: impl Into<String>, factory: impl Fn() -> R + Send + Sync + 'static) -> Self {
        Self {
            id: PrototypeId::next(),
            name: name.into(),
            factory: Box::new(factory),
        }
    }

    /// The prototype's identity.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> PrototypeId {
        self.id
    }

    /// The human-readable name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Produces one fresh instance.
    #[must_use]
    pub fn instantiate(&self) -> R {
        (self.factory)()
    }

    /// Pool id used when a pool for this prototype is declared without one.
    ///
    /// Depends only on the identity, so repeated derivations agree.
    #[must_use]
    pub fn derived_pool_id(&self) -> PoolId {
        PoolId(format!("{DERIVED_POOL_ID_PREFIX}-{}", self.id))
    }
}

impl<R> fmt::Debug for Prototype<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prototype")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Human-assigned (or derived) pool identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(String);

impl PoolId {
    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PoolId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for PoolId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for PoolId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prototype_ids_are_unique() {
        let a = Prototype::new("a", || 0_u8);
        let b = Prototype::new("a", || 0_u8);
        assert_ne!(a.id(), b.id());
        assert_ne!(a.derived_pool_id(), b.derived_pool_id());
    }

    #[test]
    fn test_derived_pool_id_is_stable() {
        let proto = Prototype::new("trail", || 1_u32);
        assert_eq!(proto.derived_pool_id(), proto.derived_pool_id());
        assert!(proto.derived_pool_id().as_str().starts_with("proto-"));
        assert_eq!(proto.instantiate(), 1);
    }
}
