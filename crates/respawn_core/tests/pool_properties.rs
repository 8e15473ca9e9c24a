//! # Pool Behaviour Tests
//!
//! End-to-end checks of the registry through its public API:
//!
//! 1. **Reuse**: identity and LIFO order
//! 2. **Lifecycle**: growth, idempotent init, preload, clear
//! 3. **Routing**: redirected, unmanaged and double despawns
//!
//! Run with: cargo test --package respawn_core --test pool_properties

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use respawn_core::{
    Anchor, DespawnOutcome, Membership, PoolError, PoolRegistry, Poolable, Prototype,
};
use respawn_shared::{Placement, Vec3};

/// Minimal resource that remembers how it was last activated.
#[derive(Debug, Default)]
struct Tracer {
    position: Vec3,
    parent: Option<String>,
    active: bool,
    activations: u32,
}

impl Poolable for Tracer {
    fn activate(&mut self, placement: &Placement, anchor: Option<&Anchor>) {
        self.position = placement.position;
        self.parent = anchor.map(|a| a.name().to_owned());
        self.active = true;
        self.activations += 1;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

fn tracer_prototype(name: &str) -> Arc<Prototype<Tracer>> {
    Arc::new(Prototype::new(name, Tracer::default))
}

// ============================================================================
// REUSE
// ============================================================================

#[test]
fn test_spawn_after_despawn_returns_same_instance() {
    let proto = tracer_prototype("tracer");
    let mut registry = PoolRegistry::new();
    registry.init(&proto, None, 5, None).unwrap();

    let first = registry.spawn(&proto, &Placement::ORIGIN).unwrap();
    registry.despawn(first).unwrap();
    let second = registry.spawn(&proto, &Placement::at(Vec3::Y)).unwrap();

    assert_eq!(first, second);
    let tracer = registry.get(second).unwrap();
    assert_eq!(tracer.activations, 2);
    assert_eq!(tracer.position, Vec3::Y);
}

#[test]
fn test_free_list_is_lifo() {
    let proto = tracer_prototype("tracer");
    let mut registry = PoolRegistry::new();
    registry.init(&proto, Some("tracers"), 0, None).unwrap();

    let a = registry.spawn("tracers", &Placement::ORIGIN).unwrap();
    let b = registry.spawn("tracers", &Placement::ORIGIN).unwrap();
    registry.despawn(a).unwrap();
    registry.despawn(b).unwrap();

    assert_eq!(registry.spawn("tracers", &Placement::ORIGIN).unwrap(), b);
    assert_eq!(registry.spawn("tracers", &Placement::ORIGIN).unwrap(), a);
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[test]
fn test_spawn_on_empty_pool_constructs() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);
    let proto = Arc::new(Prototype::new("counted", move || {
        counter.fetch_add(1, Ordering::Relaxed);
        Tracer::default()
    }));

    let mut registry = PoolRegistry::new();
    let key = registry.init(&proto, None, 0, None).unwrap();
    assert_eq!(built.load(Ordering::Relaxed), 0); // Capacity is only a hint

    let id = registry.spawn(&proto, &Placement::ORIGIN).unwrap();
    assert_eq!(built.load(Ordering::Relaxed), 1);
    assert_eq!(registry.membership(id), Some(Membership::Managed(key)));
    assert_eq!(registry.owner_of(id), Some(&proto.derived_pool_id()));
    assert_eq!(registry.is_active(id), Some(true));
}

#[test]
fn test_init_is_idempotent_per_prototype() {
    let proto = tracer_prototype("tracer");
    let mut registry = PoolRegistry::new();

    let first = registry.init(&proto, Some("original"), 5, None).unwrap();
    let second = registry
        .init(&proto, Some("renamed"), 50, Some(Anchor::new("elsewhere", Vec3::ZERO)))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(registry.pool_count(), 1);
    assert!(registry.contains_pool("original"));
    assert!(!registry.contains_pool("renamed"));

    let id = registry.spawn(&proto, &Placement::ORIGIN).unwrap();
    assert_eq!(registry.owner_of(id).map(|p| p.as_str()), Some("original"));
    assert_eq!(registry.get(id).unwrap().parent, None);
}

#[test]
fn test_preload_fills_free_list() {
    let proto = tracer_prototype("tracer");
    let mut registry = PoolRegistry::new();

    registry.preload(&proto, Some("tracers"), 5, None).unwrap();

    assert_eq!(registry.inactive_count("tracers"), Some(5));
    let stats = registry.pool_stats("tracers").unwrap();
    assert_eq!(stats.created, 5);
    assert_eq!(stats.active, 0);
    assert_eq!(registry.live_instances(), 5);

    let pool = registry.pool("tracers").unwrap();
    for &id in pool.free_list() {
        assert_eq!(registry.is_active(id), Some(false));
    }
}

#[test]
fn test_preload_then_spawn_does_not_construct() {
    let proto = tracer_prototype("tracer");
    let mut registry = PoolRegistry::new();
    registry.preload(&proto, None, 3, None).unwrap();

    for _ in 0..3 {
        registry.spawn(&proto, &Placement::ORIGIN).unwrap();
    }
    assert_eq!(registry.pool_stats(&proto).unwrap().created, 3);
    assert_eq!(registry.inactive_count(&proto), Some(0));
}

#[test]
fn test_spawn_attaches_to_anchor() {
    let proto = tracer_prototype("tracer");
    let mut registry = PoolRegistry::new();
    registry
        .init(&proto, None, 1, Some(Anchor::new("effects", Vec3::new(0.0, 1.0, 0.0))))
        .unwrap();

    let id = registry.spawn(&proto, &Placement::ORIGIN).unwrap();
    assert_eq!(registry.get(id).unwrap().parent.as_deref(), Some("effects"));
}

#[test]
fn test_spawn_without_pool_is_lookup_failure() {
    let proto = tracer_prototype("tracer");
    let mut registry = PoolRegistry::<Tracer>::new();

    assert!(matches!(
        registry.spawn(&proto, &Placement::ORIGIN),
        Err(PoolError::PoolNotFound(_))
    ));
    assert!(matches!(
        registry.spawn("missing", &Placement::ORIGIN),
        Err(PoolError::PoolNotFound(_))
    ));
    // No pool was created on demand.
    assert!(registry.is_empty());
}

#[test]
fn test_clear_all_wipes_namespace() {
    let proto = tracer_prototype("tracer");
    let mut registry = PoolRegistry::new();
    registry.preload(&proto, Some("tracers"), 4, None).unwrap();

    registry.clear_all();

    assert!(registry.is_empty());
    assert_eq!(registry.pool_ids().count(), 0);
    assert_eq!(registry.live_instances(), 0);
    assert!(matches!(
        registry.spawn(&proto, &Placement::ORIGIN),
        Err(PoolError::PoolNotFound(_))
    ));
    assert!(matches!(
        registry.spawn("tracers", &Placement::ORIGIN),
        Err(PoolError::PoolNotFound(_))
    ));

    // Usable again after re-registration.
    registry.init(&proto, Some("tracers"), 0, None).unwrap();
    assert!(registry.spawn("tracers", &Placement::ORIGIN).is_ok());
}

// ============================================================================
// ROUTING
// ============================================================================

#[test]
fn test_misdirected_despawn_is_redirected() {
    let missiles = tracer_prototype("missile");
    let trails = tracer_prototype("trail");
    let mut registry = PoolRegistry::new();
    registry.init(&missiles, Some("missiles"), 0, None).unwrap();
    registry.init(&trails, Some("trails"), 0, None).unwrap();

    let x = registry.spawn("missiles", &Placement::ORIGIN).unwrap();
    let outcome = registry.despawn_to("trails", x).unwrap();

    assert_eq!(
        outcome,
        DespawnOutcome::Redirected {
            requested: "id \"trails\"".to_owned(),
            owner: "missiles".into(),
        }
    );
    assert_eq!(registry.inactive_count("missiles"), Some(1));
    assert_eq!(registry.inactive_count("trails"), Some(0));
    assert_eq!(registry.pool_stats("missiles").unwrap().redirects_received, 1);
}

#[test]
fn test_despawn_to_owner_is_plain_recycle() {
    let proto = tracer_prototype("tracer");
    let mut registry = PoolRegistry::new();
    registry.init(&proto, Some("tracers"), 0, None).unwrap();

    let id = registry.spawn("tracers", &Placement::ORIGIN).unwrap();
    assert_eq!(
        registry.despawn_to("tracers", id),
        Ok(DespawnOutcome::Recycled { pool: "tracers".into() })
    );
}

#[test]
fn test_unmanaged_despawn_destroys() {
    let proto = tracer_prototype("tracer");
    let mut registry = PoolRegistry::new();
    registry.init(&proto, Some("tracers"), 0, None).unwrap();

    let loose = registry.adopt(Tracer::default()).unwrap();
    assert_eq!(registry.membership(loose), Some(Membership::Unmanaged));
    assert_eq!(registry.owner_of(loose), None);

    assert_eq!(registry.despawn(loose), Ok(DespawnOutcome::Destroyed));
    assert!(!registry.contains(loose));
    assert!(!registry.pool("tracers").unwrap().free_list().contains(&loose));

    // Even when the caller names a pool.
    let loose = registry.adopt(Tracer::default()).unwrap();
    assert_eq!(registry.despawn_to("tracers", loose), Ok(DespawnOutcome::Destroyed));
    assert_eq!(registry.inactive_count("tracers"), Some(0));
}

#[test]
fn test_double_despawn_is_rejected() {
    let proto = tracer_prototype("tracer");
    let mut registry = PoolRegistry::new();
    registry.init(&proto, None, 0, None).unwrap();

    let id = registry.spawn(&proto, &Placement::ORIGIN).unwrap();
    registry.despawn(id).unwrap();
    assert_eq!(registry.despawn(id), Err(PoolError::AlreadyInactive(id)));
    assert_eq!(registry.inactive_count(&proto), Some(1));

    // Exactly one caller gets the instance back.
    let again = registry.spawn(&proto, &Placement::ORIGIN).unwrap();
    let fresh = registry.spawn(&proto, &Placement::ORIGIN).unwrap();
    assert_eq!(again, id);
    assert_ne!(fresh, id);
}

#[test]
fn test_destroyed_free_list_entry_is_skipped() {
    let proto = tracer_prototype("tracer");
    let mut registry = PoolRegistry::new();
    registry.preload(&proto, None, 3, None).unwrap();

    let top = *registry.pool(&proto).unwrap().free_list().last().unwrap();
    assert!(registry.destroy(top).is_some());
    assert_eq!(registry.live_instances(), 2);
    assert_eq!(registry.inactive_count(&proto), Some(2));
    assert_eq!(registry.pool(&proto).unwrap().inactive_count(), 3); // Stale entry still listed

    let id = registry.spawn(&proto, &Placement::ORIGIN).unwrap();
    assert_ne!(id, top);
    assert_eq!(registry.pool_stats(&proto).unwrap().stale_discarded, 1);
    assert_eq!(registry.despawn(top), Err(PoolError::StaleHandle(top)));
}
