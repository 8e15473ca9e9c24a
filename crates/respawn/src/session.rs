//! # Effect Session
//!
//! A headless stand-in for the game's frame loop. Enemies fire missiles at
//! a fixed rate; each missile drops trail tracers as it flies and turns into
//! an explosion when it leaves the field. Every effect comes from a pool and
//! goes back to it.
//!
//! The session only knows pool ids. Whatever manifest was loaded decides
//! how many instances exist up front.

use respawn_core::{DespawnOutcome, InstanceId, PoolResult, SharedRegistry};
use respawn_shared::{Placement, Vec3};

use crate::effects::Effect;

/// Pool that missiles are spawned from.
pub const MISSILE_POOL: &str = "EnemyMissile";

/// Pool that trail tracers are spawned from.
pub const TRAIL_POOL: &str = "MissileTrail";

/// Pool that explosions are spawned from.
pub const EXPLOSION_POOL: &str = "Explosion";

/// Height missiles are fired from.
const MISSILE_SPAWN_Y: f32 = 5.0;

/// Number of lanes missiles alternate between.
const LANES: u64 = 5;

/// Seconds an explosion stays on screen.
const EXPLOSION_LIFETIME: f32 = 0.5;

/// Frame loop timing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    /// Seconds per frame.
    pub dt: f32,
    /// Seconds between two missile launches.
    pub fire_interval: f32,
    /// Seconds between two trail tracers of the same missile.
    pub trail_interval: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            fire_interval: 0.5,
            trail_interval: 0.05,
        }
    }
}

/// Counters accumulated over a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames stepped.
    pub frames: u64,
    /// Missiles launched.
    pub missiles_fired: u64,
    /// Trail tracers dropped.
    pub trails_dropped: u64,
    /// Explosions spawned.
    pub explosions: u64,
    /// Despawns that went back onto a free list.
    pub recycled: u64,
    /// Despawns that destroyed the instance instead.
    pub destroyed: u64,
}

impl SessionStats {
    fn record(&mut self, outcome: &DespawnOutcome) {
        match outcome {
            DespawnOutcome::Recycled { .. } | DespawnOutcome::Redirected { .. } => self.recycled += 1,
            DespawnOutcome::Destroyed | DespawnOutcome::DestroyedOrphan => self.destroyed += 1,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Missile {
    id: InstanceId,
    trail_timer: f32,
}

#[derive(Clone, Copy, Debug)]
struct Burst {
    id: InstanceId,
    age: f32,
}

/// Frame-by-frame driver over a registry of [`Effect`]s.
pub struct Session {
    registry: SharedRegistry<Effect>,
    config: SessionConfig,
    fire_timer: f32,
    missiles: Vec<Missile>,
    trails: Vec<InstanceId>,
    bursts: Vec<Burst>,
    stats: SessionStats,
}

impl Session {
    /// Creates a session spawning from `registry`.
    #[must_use]
    pub fn new(registry: SharedRegistry<Effect>, config: SessionConfig) -> Self {
        Self {
            registry,
            config,
            fire_timer: 0.0,
            missiles: Vec::new(),
            trails: Vec::new(),
            bursts: Vec::new(),
            stats: SessionStats::default(),
        }
    }

    /// Counters so far.
    #[must_use]
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Effects currently on screen.
    #[must_use]
    pub fn live_effects(&self) -> usize {
        self.missiles.len() + self.trails.len() + self.bursts.len()
    }

    /// Advances every effect by one frame.
    ///
    /// # Errors
    ///
    /// Propagates registry failures, typically a pool missing from the
    /// manifest.
    pub fn step(&mut self) -> PoolResult<()> {
        let dt = self.config.dt;
        let mut registry = self.registry.lock();

        // Launch
        self.fire_timer += dt;
        if self.fire_timer >= self.config.fire_interval {
            self.fire_timer -= self.config.fire_interval;
            #[allow(clippy::cast_precision_loss)]
            let lane = (self.stats.missiles_fired % LANES) as f32 - (LANES / 2) as f32;
            let id = registry.spawn(MISSILE_POOL, &Placement::at(Vec3::new(lane, MISSILE_SPAWN_Y, 0.0)))?;
            self.missiles.push(Missile { id, trail_timer: 0.0 });
            self.stats.missiles_fired += 1;
        }

        // Missiles fly, drop trails, burst when spent
        let mut index = 0;
        while index < self.missiles.len() {
            let id = self.missiles[index].id;
            let Some(missile) = registry.get_mut(id) else {
                self.missiles.swap_remove(index);
                continue;
            };
            let spent = missile.fly(dt);
            let position = missile.transform.position;

            if spent {
                let outcome = registry.despawn(id)?;
                self.stats.record(&outcome);
                self.missiles.swap_remove(index);

                let burst = registry.spawn(EXPLOSION_POOL, &Placement::at(position))?;
                self.bursts.push(Burst { id: burst, age: 0.0 });
                self.stats.explosions += 1;
                continue;
            }

            self.missiles[index].trail_timer += dt;
            if self.missiles[index].trail_timer >= self.config.trail_interval {
                self.missiles[index].trail_timer -= self.config.trail_interval;
                let trail = registry.spawn(TRAIL_POOL, &Placement::at(position))?;
                self.trails.push(trail);
                self.stats.trails_dropped += 1;
            }
            index += 1;
        }

        // Trails fade out in place
        let mut index = 0;
        while index < self.trails.len() {
            let id = self.trails[index];
            let faded = registry.get_mut(id).map_or(true, |trail| trail.fade(dt));
            if faded {
                if registry.contains(id) {
                    let outcome = registry.despawn_to(TRAIL_POOL, id)?;
                    self.stats.record(&outcome);
                }
                self.trails.swap_remove(index);
            } else {
                index += 1;
            }
        }

        // Explosions expire
        let mut index = 0;
        while index < self.bursts.len() {
            self.bursts[index].age += dt;
            if self.bursts[index].age >= EXPLOSION_LIFETIME {
                let id = self.bursts.swap_remove(index).id;
                if registry.contains(id) {
                    let outcome = registry.despawn(id)?;
                    self.stats.record(&outcome);
                }
            } else {
                index += 1;
            }
        }

        self.stats.frames += 1;
        Ok(())
    }

    /// Steps `frames` frames.
    ///
    /// # Errors
    ///
    /// Stops at the first failing frame; see [`step`](Self::step).
    pub fn run(&mut self, frames: u64) -> PoolResult<SessionStats> {
        for _ in 0..frames {
            self.step()?;
        }
        Ok(self.stats)
    }

    /// Despawns everything still on screen.
    ///
    /// Handles invalidated by a `clear_all` in the meantime are dropped
    /// silently.
    pub fn drain(&mut self) {
        let mut registry = self.registry.lock();
        let ids: Vec<InstanceId> = self
            .missiles
            .drain(..)
            .map(|m| m.id)
            .chain(self.trails.drain(..))
            .chain(self.bursts.drain(..).map(|b| b.id))
            .collect();

        for id in ids {
            match registry.despawn(id) {
                Ok(outcome) => self.stats.record(&outcome),
                Err(err) => tracing::debug!(instance = %id, %err, "skipping drain of dead handle"),
            }
        }
    }
}
