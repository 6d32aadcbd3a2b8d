//! Hostile entity: a two-state (Alive/Dead) walker that chases the player

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Positioned;
use crate::config::EnemyConfig;
use crate::{flatten, yaw_toward};

/// Life state. `Dead` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    Dead {
        /// Sim time of death
        at: f32,
        /// Killed by a head hit (head collider detached)
        headshot: bool,
    },
}

/// What the lifecycle manager should do with an entity after its update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyStatus {
    Active,
    /// Dead longer than the despawn delay; remove it
    Expired,
}

/// Collider shape used by the hit-scan resolver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitSphere {
    pub center: Vec3,
    pub radius: f32,
}

/// One hostile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    /// Base (feet) position
    pub position: Vec3,
    /// Facing (rotation about +Y)
    pub yaw: f32,
    pub health: f32,
    pub state: LifeState,
    /// Sim time of the last attack
    last_attack: Option<f32>,
    /// Walk animation phase (radians, wraps)
    pub walk_phase: f32,
}

impl Positioned for Enemy {
    fn position(&self) -> Vec3 {
        self.position
    }
}

impl Enemy {
    pub fn new(id: u32, position: Vec3, health: f32) -> Self {
        Self {
            id,
            position,
            yaw: 0.0,
            health,
            state: LifeState::Alive,
            last_attack: None,
            walk_phase: 0.0,
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        matches!(self.state, LifeState::Dead { .. })
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    pub fn died_at(&self) -> Option<f32> {
        match self.state {
            LifeState::Dead { at, .. } => Some(at),
            LifeState::Alive => None,
        }
    }

    /// The head collider is gone after a headshot kill
    pub fn has_head(&self) -> bool {
        !matches!(self.state, LifeState::Dead { headshot: true, .. })
    }

    /// World y above which a hit counts as a headshot
    pub fn headshot_line(&self, config: &EnemyConfig) -> f32 {
        self.position.y + config.headshot_threshold
    }

    pub fn body_sphere(&self, config: &EnemyConfig) -> HitSphere {
        HitSphere {
            center: self.position + Vec3::Y * config.body_height,
            radius: config.body_radius,
        }
    }

    pub fn head_sphere(&self, config: &EnemyConfig) -> Option<HitSphere> {
        self.has_head().then(|| HitSphere {
            center: self.position + Vec3::Y * config.head_height,
            radius: config.head_radius,
        })
    }

    /// Ground-plane distance to `target`
    pub fn distance_to(&self, target: Vec3) -> f32 {
        flatten(target - self.position).length()
    }

    pub fn in_attack_range(&self, target: Vec3, config: &EnemyConfig) -> bool {
        self.distance_to(target) <= config.attack_range
    }

    /// Apply damage. Returns true only on the hit that kills.
    pub fn take_damage(&mut self, amount: f32, headshot: bool, now: f32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.state = LifeState::Dead { at: now, headshot };
            return true;
        }
        false
    }

    pub fn can_attack(&self, now: f32, config: &EnemyConfig) -> bool {
        self.is_alive()
            && self
                .last_attack
                .is_none_or(|last| now - last >= config.attack_cooldown)
    }

    /// Strike if allowed; returns the damage dealt (0 when not permitted)
    pub fn attack(&mut self, now: f32, damage: f32, config: &EnemyConfig) -> f32 {
        if !self.can_attack(now, config) {
            return 0.0;
        }
        self.last_attack = Some(now);
        damage
    }

    /// Advance one tick toward `player` and report whether to despawn
    pub fn update(&mut self, player: Vec3, dt: f32, now: f32, config: &EnemyConfig) -> EnemyStatus {
        if let LifeState::Dead { at, .. } = self.state {
            return if now - at > config.despawn_delay {
                EnemyStatus::Expired
            } else {
                EnemyStatus::Active
            };
        }

        let dir = flatten(player - self.position).normalize_or_zero();
        if dir != Vec3::ZERO {
            self.yaw = yaw_toward(dir);
        }
        if !self.in_attack_range(player, config) {
            let step = config.speed * dt;
            self.position += dir * step;
            self.walk_phase =
                (self.walk_phase + step * config.walk_cycle_rate) % std::f32::consts::TAU;
        }
        EnemyStatus::Active
    }
}
