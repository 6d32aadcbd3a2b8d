//! Timed cosmetic effects
//!
//! Muzzle flashes, hit markers and gore are queued with an expiry time and
//! swept once per tick. Nothing here feeds back into simulation state; a
//! renderer reads `active()` and may ignore it entirely.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::EffectTimings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    MuzzleFlash,
    /// Crosshair feedback for a non-lethal hit
    HitMarker,
    /// Burst at the hit point of a headshot kill
    Gore,
    /// Decal left under the burst
    BloodPool,
}

impl EffectKind {
    pub fn lifetime(&self, timings: &EffectTimings) -> f32 {
        match self {
            EffectKind::MuzzleFlash => timings.muzzle_flash,
            EffectKind::HitMarker => timings.hit_marker,
            EffectKind::Gore => timings.gore,
            EffectKind::BloodPool => timings.blood_pool,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub kind: EffectKind,
    pub position: Vec3,
    pub spawned_at: f32,
    pub expires_at: f32,
}

impl TimedEffect {
    /// 1.0 when fresh, 0.0 at expiry (for fading)
    pub fn life(&self, now: f32) -> f32 {
        let span = self.expires_at - self.spawned_at;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.expires_at - now) / span).clamp(0.0, 1.0)
    }
}

/// Maximum queued effects; the oldest are dropped past this
pub const MAX_EFFECTS: usize = 128;

#[derive(Debug, Clone, Default)]
pub struct EffectQueue {
    entries: Vec<TimedEffect>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: EffectKind, position: Vec3, now: f32, timings: &EffectTimings) {
        if self.entries.len() >= MAX_EFFECTS {
            self.entries.remove(0);
        }
        self.entries.push(TimedEffect {
            kind,
            position,
            spawned_at: now,
            expires_at: now + kind.lifetime(timings),
        });
    }

    /// Remove and return effects whose time is up
    pub fn expire(&mut self, now: f32) -> Vec<TimedEffect> {
        let (expired, live): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| now >= e.expires_at);
        self.entries = live;
        expired
    }

    pub fn active(&self) -> &[TimedEffect] {
        &self.entries
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
