//! Hit-scan shot resolution
//!
//! A shot is one ray from the view origin. Every living hostile contributes a
//! body sphere and (while attached) a head sphere; the globally nearest hit
//! wins. Ties keep the earlier surface, i.e. the older entity, body first.

use glam::Vec3;

use super::collision::{RayHit, ray_sphere};
use super::effects::{EffectKind, EffectQueue};
use super::enemy::{Enemy, HitSphere};
use super::state::GameStateStore;
use crate::config::{EnemyConfig, GameConfig};

/// A shot ray; `dir` is expected to be unit length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// A collider belonging to a living hostile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitSurface {
    pub enemy_id: u32,
    pub sphere: HitSphere,
    /// Collider sits above the owner's headshot line
    pub is_head: bool,
}

/// Collect the colliders of all living hostiles, in entity order
pub fn gather_surfaces(enemies: &[Enemy], config: &EnemyConfig) -> Vec<HitSurface> {
    let mut surfaces = Vec::with_capacity(enemies.len() * 2);
    for enemy in enemies.iter().filter(|e| e.is_alive()) {
        let line = enemy.headshot_line(config);
        let spheres = std::iter::once(enemy.body_sphere(config)).chain(enemy.head_sphere(config));
        for sphere in spheres {
            surfaces.push(HitSurface {
                enemy_id: enemy.id,
                sphere,
                is_head: sphere.center.y > line,
            });
        }
    }
    surfaces
}

/// Nearest surface hit by `ray`
pub fn nearest_hit(ray: &Ray, surfaces: &[HitSurface]) -> Option<(HitSurface, RayHit)> {
    let mut best: Option<(HitSurface, RayHit)> = None;
    for surface in surfaces {
        let sphere = &surface.sphere;
        let Some(hit) = ray_sphere(ray.origin, ray.dir, sphere.center, sphere.radius) else {
            continue;
        };
        if best.is_none_or(|(_, b)| hit.distance < b.distance) {
            best = Some((*surface, hit));
        }
    }
    best
}

/// Outcome of one resolved shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotHit {
    pub enemy_id: u32,
    pub point: Vec3,
    pub distance: f32,
    /// Surface struck was classified as a head collider
    pub head_surface: bool,
    /// Hit point above the owner's headshot line
    pub headshot: bool,
    pub killed: bool,
    pub coins_awarded: u32,
}

/// Resolves permitted shots against the living hostiles
#[derive(Debug, Clone, Copy)]
pub struct HitScanResolver<'a> {
    config: &'a GameConfig,
}

impl<'a> HitScanResolver<'a> {
    pub fn new(config: &'a GameConfig) -> Self {
        Self { config }
    }

    /// Cast without side effects
    pub fn trace(&self, ray: &Ray, enemies: &[Enemy]) -> Option<(HitSurface, RayHit)> {
        let surfaces = gather_surfaces(enemies, &self.config.enemy);
        nearest_hit(ray, &surfaces)
    }

    /// Resolve a shot: damage, rewards, kill count and cosmetic effects
    pub fn resolve(
        &self,
        store: &mut GameStateStore,
        enemies: &mut [Enemy],
        effects: &mut EffectQueue,
        ray: Ray,
        damage: f32,
        now: f32,
    ) -> Option<ShotHit> {
        let timings = &self.config.effects;
        effects.push(EffectKind::MuzzleFlash, ray.origin, now, timings);

        let (surface, hit) = self.trace(&ray, enemies)?;
        let enemy = enemies.iter_mut().find(|e| e.id == surface.enemy_id)?;
        if enemy.is_dead() {
            return None;
        }

        let headshot = hit.point.y > enemy.headshot_line(&self.config.enemy);
        let killed = enemy.take_damage(damage, headshot, now);
        let mut coins_awarded = 0;

        if killed {
            let rewards = &self.config.rewards;
            coins_awarded = if headshot { rewards.headshot } else { rewards.kill };
            log::debug!(
                "Enemy {} killed ({}), +{} coins",
                enemy.id,
                if headshot { "headshot" } else { "body" },
                coins_awarded
            );
            store.add_coins(coins_awarded);
            store.add_kill(headshot);
            if headshot {
                effects.push(EffectKind::Gore, hit.point, now, timings);
                let floor = Vec3::new(hit.point.x, enemy.position.y, hit.point.z);
                effects.push(EffectKind::BloodPool, floor, now, timings);
            }
        } else {
            effects.push(EffectKind::HitMarker, hit.point, now, timings);
        }

        Some(ShotHit {
            enemy_id: surface.enemy_id,
            point: hit.point,
            distance: hit.distance,
            head_surface: surface.is_head,
            headshot,
            killed,
            coins_awarded,
        })
    }
}
