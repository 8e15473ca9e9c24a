//! # RESPAWN
//!
//! Game-side integration of the pooling engine.
//!
//! ## Modules
//!
//! - [`config`]: the TOML pool manifest
//! - [`manager`]: preloads the manifest at startup, clears the pools at shutdown
//! - [`effects`]: the pooled effect type (missiles, trails, explosions)
//! - [`session`]: headless frame loop that spawns and despawns effects
//!
//! ## Example
//!
//! ```rust,ignore
//! let manifest = PoolManifest::load("data/pools.toml")?;
//! let mut manager = PoolManager::new(SharedRegistry::new(), catalog)
//!     .with_anchor(Anchor::new("effects", Vec3::ZERO));
//! manager.start(&manifest);
//!
//! let mut session = Session::new(manager.registry().clone(), SessionConfig::default());
//! session.run(600)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod effects;
pub mod manager;
pub mod session;

pub use config::{ConfigError, PoolManifest, PoolRecord};
pub use effects::{Effect, EffectKind};
pub use manager::{PoolManager, PrototypeCatalog, SkipReason, StartReport};
pub use session::{Session, SessionConfig, SessionStats};

/// The manifest shipped with the game.
pub const BUNDLED_MANIFEST: &str = include_str!("../data/pools.toml");
