//! # Pooled Effects
//!
//! The one resource type the game pools: short-lived visuals and projectiles.
//!
//! Effects reset their own look when activated. A recycled trail comes back
//! at full size and opacity no matter how far it had faded.

use respawn_core::{Anchor, Poolable};
use respawn_shared::{Placement, Transform, Vec3};

/// Vertical bound beyond which a missile is spent.
pub const MISSILE_CONSTRAINT_Y: f32 = 6.0;

/// Opacity below which a trail is finished.
pub const TRAIL_MIN_ALPHA: f32 = 0.01;

/// Scale lost per second by a fading trail.
pub const TRAIL_SCALE_DOWN_SPEED: f32 = 0.2;

/// Opacity lost per second by a fading trail.
pub const TRAIL_FADE_SPEED: f32 = 2.5;

/// What an effect is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// A projectile that flies until it leaves the field.
    Missile,
    /// A tracer left behind a missile; shrinks and fades in place.
    MissileTrail,
    /// A one-shot burst.
    Explosion,
}

/// A pooled visual or projectile.
#[derive(Clone, Debug)]
pub struct Effect {
    kind: EffectKind,
    /// World transform.
    pub transform: Transform,
    /// Units per second, applied by [`fly`](Self::fly).
    pub velocity: Vec3,
    /// Opacity in `0..=1`.
    pub alpha: f32,
    /// Anchor this effect is attached to.
    parent: Option<String>,
    active: bool,
    /// Look restored on every activation.
    base_scale: f32,
    base_alpha: f32,
}

impl Effect {
    fn new(kind: EffectKind, scale: f32, velocity: Vec3) -> Self {
        Self {
            kind,
            transform: Transform::new(Vec3::ZERO, Transform::IDENTITY.rotation, scale),
            velocity,
            alpha: 1.0,
            parent: None,
            active: false,
            base_scale: scale,
            base_alpha: 1.0,
        }
    }

    /// A missile flying downwards, as fired by enemies.
    #[must_use]
    pub fn missile() -> Self {
        Self::new(EffectKind::Missile, 1.0, Vec3::new(0.0, -4.0, 0.0))
    }

    /// A trail tracer.
    #[must_use]
    pub fn trail() -> Self {
        Self::new(EffectKind::MissileTrail, 0.25, Vec3::ZERO)
    }

    /// An explosion burst.
    #[must_use]
    pub fn explosion() -> Self {
        Self::new(EffectKind::Explosion, 2.0, Vec3::ZERO)
    }

    /// What this effect is.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Whether the effect is in play.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Name of the anchor the effect is attached to.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Advances a missile by `dt` seconds.
    ///
    /// Returns `true` once it has left the field and should be despawned.
    pub fn fly(&mut self, dt: f32) -> bool {
        self.transform.position = self.transform.position + self.velocity * dt;
        self.transform.position.y.abs() > MISSILE_CONSTRAINT_Y
    }

    /// Shrinks and fades a trail by `dt` seconds.
    ///
    /// Returns `true` once it is invisible and should be despawned.
    pub fn fade(&mut self, dt: f32) -> bool {
        self.transform.scale = (self.transform.scale - TRAIL_SCALE_DOWN_SPEED * dt).max(0.0);
        self.alpha -= TRAIL_FADE_SPEED * dt;
        self.alpha < TRAIL_MIN_ALPHA
    }
}

impl Poolable for Effect {
    fn activate(&mut self, placement: &Placement, anchor: Option<&Anchor>) {
        self.transform.place(placement);
        self.transform.scale = self.base_scale;
        self.alpha = self.base_alpha;
        if let Some(anchor) = anchor {
            self.transform.position = anchor.origin() + placement.position;
            self.parent = Some(anchor.name().to_owned());
        }
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}
