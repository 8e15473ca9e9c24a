//! # Pool Demo
//!
//! Runs a headless effect session against the pool manifest and prints what
//! the pools did.
//!
//! Usage: `pool_demo [manifest.toml] [frames]`
//!
//! Without a path the bundled manifest is used.

use std::process::ExitCode;
use std::sync::Arc;

use respawn::{
    Effect, PoolManager, PoolManifest, PrototypeCatalog, Session, SessionConfig, BUNDLED_MANIFEST,
};
use respawn::session::{MISSILE_POOL, TRAIL_POOL};
use respawn_core::{Anchor, Prototype, SharedRegistry};
use respawn_shared::{Placement, Vec3};

const DEFAULT_FRAMES: u64 = 600;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let manifest = match args.next() {
        Some(path) => PoolManifest::load(&path),
        None => PoolManifest::from_toml_str(BUNDLED_MANIFEST),
    };
    let manifest = match manifest {
        Ok(manifest) => manifest,
        Err(err) => {
            tracing::error!(%err, "cannot load pool manifest");
            return ExitCode::FAILURE;
        }
    };
    let frames = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                     RESPAWN POOL DEMO                            ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let catalog = PrototypeCatalog::new()
        .with(Arc::new(Prototype::new("missile", Effect::missile)))
        .with(Arc::new(Prototype::new("trail", Effect::trail)))
        .with(Arc::new(Prototype::new("explosion", Effect::explosion)));

    let mut manager = PoolManager::new(SharedRegistry::new(), catalog)
        .with_anchor(Anchor::new("effects", Vec3::ZERO))
        .with_anchor(Anchor::new("projectiles", Vec3::new(0.0, 0.0, -1.0)));

    let report = manager.start(&manifest);
    println!("Preloaded {} pools, skipped {} records", report.preloaded.len(), report.skipped.len());

    let registry = manager.registry().clone();
    let mut session = Session::new(registry.clone(), SessionConfig::default());
    let stats = match session.run(frames) {
        Ok(stats) => stats,
        Err(err) => {
            tracing::error!(%err, "session aborted");
            return ExitCode::FAILURE;
        }
    };

    // A trail handed back to the missile pool still lands in the trail pool.
    match registry.spawn(TRAIL_POOL, &Placement::ORIGIN) {
        Ok(stray) => match registry.despawn_to(MISSILE_POOL, stray) {
            Ok(outcome) => println!("Misdirected despawn: {outcome:?}"),
            Err(err) => tracing::error!(%err, "misdirected despawn failed"),
        },
        Err(err) => tracing::error!(%err, "cannot spawn stray trail"),
    }

    session.drain();

    println!();
    println!("Frames:          {}", stats.frames);
    println!("Missiles fired:  {}", stats.missiles_fired);
    println!("Trails dropped:  {}", stats.trails_dropped);
    println!("Explosions:      {}", stats.explosions);
    println!("Recycled:        {}", stats.recycled);
    println!("Destroyed:       {}", stats.destroyed);
    println!();

    {
        let guard = registry.lock();
        let mut ids: Vec<_> = guard.pool_ids().cloned().collect();
        ids.sort();
        println!("{:<16} {:>8} {:>8} {:>8} {:>10}", "pool", "created", "reused", "free", "redirects");
        for id in ids {
            if let Some(stats) = guard.pool_stats(&id) {
                println!(
                    "{:<16} {:>8} {:>8} {:>8} {:>10}",
                    id.as_str(),
                    stats.created,
                    stats.reused,
                    guard.inactive_count(&id).unwrap_or(0),
                    stats.redirects_received
                );
            }
        }
    }

    manager.shutdown();
    ExitCode::SUCCESS
}
