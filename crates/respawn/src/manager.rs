//! # Pool Manager
//!
//! Lifecycle driver for the registry: preloads every pool declared in the
//! manifest when the session starts, and clears them all when it ends.
//!
//! Bad records never stop a session. A record without a prototype, or with
//! one the catalog does not know, is reported and skipped.

use std::collections::HashMap;
use std::sync::Arc;

use respawn_core::{Anchor, PoolId, PoolResult, Poolable, Prototype, SharedRegistry};

use crate::config::{PoolManifest, PoolRecord};

/// Prototypes the manifest may refer to, by name.
pub struct PrototypeCatalog<R> {
    prototypes: HashMap<String, Arc<Prototype<R>>>,
}

impl<R> PrototypeCatalog<R> {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prototypes: HashMap::new(),
        }
    }

    /// Adds a prototype under its own name, replacing any previous entry.
    pub fn insert(&mut self, prototype: Arc<Prototype<R>>) {
        self.prototypes.insert(prototype.name().to_owned(), prototype);
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, prototype: Arc<Prototype<R>>) -> Self {
        self.insert(prototype);
        self
    }

    /// Looks up a prototype by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Prototype<R>>> {
        self.prototypes.get(name)
    }

    /// Number of prototypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    /// Checks whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }
}

impl<R> Default for PrototypeCatalog<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a manifest record was not turned into a pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The record names no prototype.
    MissingPrototype,
    /// The catalog has no prototype by this name.
    UnknownPrototype(String),
    /// The registry refused the pool.
    Rejected(String),
}

/// What [`PoolManager::start`] did with each record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StartReport {
    /// Pools that were preloaded, in manifest order.
    pub preloaded: Vec<PoolId>,
    /// Records that were skipped, with their position in the manifest.
    pub skipped: Vec<(usize, SkipReason)>,
}

/// Drives the registry through one session.
///
/// Dropping a started manager clears every pool.
pub struct PoolManager<R: Poolable> {
    registry: SharedRegistry<R>,
    catalog: PrototypeCatalog<R>,
    anchors: HashMap<String, Anchor>,
    ready: bool,
}

impl<R: Poolable> PoolManager<R> {
    /// Creates a manager over `registry`.
    #[must_use]
    pub fn new(registry: SharedRegistry<R>, catalog: PrototypeCatalog<R>) -> Self {
        Self {
            registry,
            catalog,
            anchors: HashMap::new(),
            ready: false,
        }
    }

    /// Registers a placement target that records can name as `target`.
    #[must_use]
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchors.insert(anchor.name().to_owned(), anchor);
        self
    }

    /// The registry this manager drives.
    #[must_use]
    pub fn registry(&self) -> &SharedRegistry<R> {
        &self.registry
    }

    /// Whether [`start`](Self::start) has completed and no shutdown happened
    /// since.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Preloads every usable record of `manifest`, in order.
    pub fn start(&mut self, manifest: &PoolManifest) -> StartReport {
        let mut report = StartReport::default();

        for (index, record) in manifest.pools.iter().enumerate() {
            match self.preload_record(record) {
                Ok(id) => report.preloaded.push(id),
                Err(reason) => {
                    tracing::error!(record = index, ?reason, "skipping pool record");
                    report.skipped.push((index, reason));
                }
            }
        }

        tracing::info!(
            preloaded = report.preloaded.len(),
            skipped = report.skipped.len(),
            "pool manager ready"
        );
        self.ready = true;
        report
    }

    /// Clears every pool. Does nothing if the manager is not started.
    pub fn shutdown(&mut self) {
        if !self.ready {
            return;
        }
        self.registry.clear_all();
        self.ready = false;
        tracing::info!("pool manager shut down");
    }

    fn preload_record(&self, record: &PoolRecord) -> Result<PoolId, SkipReason> {
        let name = record.prototype.as_deref().ok_or(SkipReason::MissingPrototype)?;
        let prototype = self
            .catalog
            .get(name)
            .ok_or_else(|| SkipReason::UnknownPrototype(name.to_owned()))?;

        let anchor = record.target.as_deref().and_then(|target| {
            let anchor = self.anchors.get(target).cloned();
            if anchor.is_none() {
                tracing::warn!(spawn_target = target, prototype = name, "unknown spawn target, spawning unattached");
            }
            anchor
        });

        let preloaded = self.registry.with(|registry| -> PoolResult<Option<PoolId>> {
            let key = registry.preload(prototype, record.id.as_deref(), record.start_count, anchor)?;
            Ok(registry.pool(key).map(|pool| pool.id().clone()))
        });

        match preloaded {
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err(SkipReason::Rejected(format!("pool for {name} vanished after preload"))),
            Err(err) => Err(SkipReason::Rejected(err.to_string())),
        }
    }
}

impl<R: Poolable> Drop for PoolManager<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;
    use respawn_shared::Vec3;

    fn catalog() -> PrototypeCatalog<Effect> {
        PrototypeCatalog::new()
            .with(Arc::new(Prototype::new("trail", Effect::trail)))
            .with(Arc::new(Prototype::new("missile", Effect::missile)))
    }

    #[test]
    fn test_start_skips_bad_records() {
        let manifest = PoolManifest::from_toml_str(
            r#"
            [[pool]]
            id = "MissileTrail"
            start_count = 3
            prototype = "trail"

            [[pool]]
            id = "NoPrototype"

            [[pool]]
            id = "Ghost"
            prototype = "ghost"
            "#,
        )
        .unwrap();

        let mut manager = PoolManager::new(SharedRegistry::new(), catalog());
        let report = manager.start(&manifest);

        assert_eq!(report.preloaded, vec![PoolId::from("MissileTrail")]);
        assert_eq!(
            report.skipped,
            vec![
                (1, SkipReason::MissingPrototype),
                (2, SkipReason::UnknownPrototype("ghost".to_owned())),
            ]
        );
        assert!(manager.is_ready());
        assert_eq!(manager.registry().pool_count(), 1);
    }

    #[test]
    fn test_unknown_target_spawns_unattached() {
        let manifest = PoolManifest::from_toml_str(
            "[[pool]]\nid = \"t\"\nstart_count = 1\nprototype = \"trail\"\ntarget = \"nowhere\"\n",
        )
        .unwrap();

        let mut manager = PoolManager::new(SharedRegistry::new(), catalog())
            .with_anchor(Anchor::new("effects", Vec3::ZERO));
        let report = manager.start(&manifest);
        assert_eq!(report.preloaded.len(), 1);

        let guard = manager.registry().lock();
        assert!(guard.pool("t").unwrap().anchor().is_none());
    }

    #[test]
    fn test_shutdown_clears_registry() {
        let manifest = PoolManifest::from_toml_str("[[pool]]\nprototype = \"missile\"\n").unwrap();
        let mut manager = PoolManager::new(SharedRegistry::new(), catalog());
        manager.start(&manifest);
        assert_eq!(manager.registry().pool_count(), 1);

        manager.shutdown();
        assert!(!manager.is_ready());
        assert_eq!(manager.registry().pool_count(), 0);
    }
}
