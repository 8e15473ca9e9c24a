//! # Instance Slot Table
//!
//! Owns every live instance, pooled or not, behind a generational index.
//!
//! Callers and pools only ever hold [`InstanceId`]s. Removing an instance
//! bumps its slot's generation, so a handle kept past removal is detected
//! instead of silently aliasing whatever reuses the slot.

use respawn_shared::Placement;

use crate::handle::InstanceId;
use crate::pool::{Anchor, Membership, Poolable};

/// A live instance plus the bookkeeping the engine keeps alongside it.
struct Occupant<R> {
    resource: R,
    membership: Membership,
    active: bool,
}

/// One slot of the table.
struct Slot<R> {
    /// Generation of the current (or next) occupant.
    generation: u32,
    occupant: Option<Occupant<R>>,
}

/// Generational storage for instances.
///
/// # Thread Safety
///
/// This table is NOT thread-safe. It is owned by a single registry.
pub struct InstanceSlots<R> {
    /// All slots ever allocated.
    slots: Vec<Slot<R>>,
    /// Indices of vacant slots, reused LIFO.
    vacant: Vec<u32>,
    /// Number of occupied slots.
    live_count: usize,
}

impl<R> InstanceSlots<R> {
    /// Creates an empty table with room for `capacity` instances.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            vacant: Vec::new(),
            live_count: 0,
        }
    }

    /// Returns the number of live instances.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live_count
    }

    /// Stores `resource`, returning its handle.
    ///
    /// Returns `None` once every 32-bit index is taken.
    pub fn insert(&mut self, resource: R, membership: Membership, active: bool) -> Option<InstanceId> {
        let occupant = Occupant {
            resource,
            membership,
            active,
        };

        let index = match self.vacant.pop() {
            Some(index) => index,
            None => {
                let index = u32::try_from(self.slots.len()).ok().filter(|&i| i < u32::MAX)?;
                self.slots.push(Slot {
                    generation: 0,
                    occupant: None,
                });
                index
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.occupant = Some(occupant);
        self.live_count += 1;

        Some(InstanceId::new(index, slot.generation))
    }

    /// Removes an instance, returning it with its membership.
    ///
    /// Returns `None` if the handle is null or stale.
    pub fn remove(&mut self, id: InstanceId) -> Option<(R, Membership, bool)> {
        let slot = self.slot_mut(id)?;
        let occupant = slot.occupant.take()?;
        // Invalidate every outstanding handle to this slot.
        slot.generation = slot.generation.wrapping_add(1);

        self.vacant.push(id.index());
        self.live_count -= 1;

        Some((occupant.resource, occupant.membership, occupant.active))
    }

    /// Checks whether `id` refers to a live instance.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: InstanceId) -> bool {
        self.occupant(id).is_some()
    }

    /// Gets a reference to an instance.
    #[inline]
    #[must_use]
    pub fn get(&self, id: InstanceId) -> Option<&R> {
        self.occupant(id).map(|o| &o.resource)
    }

    /// Gets a mutable reference to an instance.
    #[inline]
    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut R> {
        self.occupant_mut(id).map(|o| &mut o.resource)
    }

    /// Returns the membership recorded for an instance.
    #[inline]
    #[must_use]
    pub fn membership(&self, id: InstanceId) -> Option<Membership> {
        self.occupant(id).map(|o| o.membership)
    }

    /// Returns whether an instance is currently handed out.
    #[inline]
    #[must_use]
    pub fn is_active(&self, id: InstanceId) -> Option<bool> {
        self.occupant(id).map(|o| o.active)
    }

    fn slot_mut(&mut self, id: InstanceId) -> Option<&mut Slot<R>> {
        if id.is_null() {
            return None;
        }
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
    }

    fn occupant(&self, id: InstanceId) -> Option<&Occupant<R>> {
        if id.is_null() {
            return None;
        }
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())?
            .occupant
            .as_ref()
    }

    fn occupant_mut(&mut self, id: InstanceId) -> Option<&mut Occupant<R>> {
        self.slot_mut(id)?.occupant.as_mut()
    }
}

impl<R: Poolable> InstanceSlots<R> {
    /// Activates an instance at `placement`, attaching it to `anchor`.
    ///
    /// Returns `false` if the handle is stale.
    pub fn activate(&mut self, id: InstanceId, placement: &Placement, anchor: Option<&Anchor>) -> bool {
        let Some(occupant) = self.occupant_mut(id) else {
            return false;
        };
        occupant.resource.activate(placement, anchor);
        occupant.active = true;
        true
    }

    /// Deactivates an instance.
    ///
    /// Returns `false` if the handle is stale.
    pub fn deactivate(&mut self, id: InstanceId) -> bool {
        let Some(occupant) = self.occupant_mut(id) else {
            return false;
        };
        occupant.resource.deactivate();
        occupant.active = false;
        true
    }
}

impl<R> Default for InstanceSlots<R> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::PoolKey;

    #[test]
    fn test_slots_insert_remove() {
        let mut slots: InstanceSlots<u32> = InstanceSlots::with_capacity(4);

        let id = slots.insert(42, Membership::Unmanaged, true).unwrap();
        assert_eq!(slots.get(id), Some(&42));
        assert_eq!(slots.live_count(), 1);

        let (value, membership, active) = slots.remove(id).unwrap();
        assert_eq!(value, 42);
        assert_eq!(membership, Membership::Unmanaged);
        assert!(active);
        assert_eq!(slots.live_count(), 0);
        assert!(!slots.contains(id));
    }

    #[test]
    fn test_slots_reuse_bumps_generation() {
        let mut slots: InstanceSlots<u32> = InstanceSlots::with_capacity(1);

        let first = slots.insert(1, Membership::Unmanaged, false).unwrap();
        slots.remove(first);

        let second = slots.insert(2, Membership::Managed(PoolKey::new(7)), false).unwrap();
        assert_eq!(first.index(), second.index()); // Same slot reused
        assert_ne!(first.generation(), second.generation());

        // The old handle must not see the new occupant.
        assert!(slots.get(first).is_none());
        assert!(slots.remove(first).is_none());
        assert_eq!(slots.membership(second), Some(Membership::Managed(PoolKey::new(7))));
    }

    #[test]
    fn test_slots_null_handle() {
        let mut slots: InstanceSlots<u32> = InstanceSlots::default();
        let _ = slots.insert(1, Membership::Unmanaged, false).unwrap();
        assert!(!slots.contains(InstanceId::NULL));
        assert!(slots.remove(InstanceId::NULL).is_none());
    }
}
