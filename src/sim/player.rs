//! Player body: look angles, walking, jumping and barrier collision

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::{StaticBarrier, clamp_to_bounds, collides_with_barriers};
use super::hitscan::Ray;
use crate::config::{MapConfig, PlayerConfig};
use crate::consts::MAX_PITCH;
use crate::normalize_angle;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    /// Feet position; y = 0 on the ground
    pub position: Vec3,
    /// Rotation about +Y; 0 looks down -Z
    pub yaw: f32,
    /// Up/down look, clamped to +-MAX_PITCH
    pub pitch: f32,
    pub vertical_velocity: f32,
    pub grounded: bool,
}

impl Default for PlayerBody {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl PlayerBody {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            vertical_velocity: 0.0,
            grounded: position.y <= 0.0,
        }
    }

    /// Apply a look delta (radians)
    pub fn look(&mut self, delta: Vec2) {
        self.yaw = normalize_angle(self.yaw + delta.x);
        self.pitch = (self.pitch + delta.y).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Horizontal facing
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    pub fn view_origin(&self, config: &PlayerConfig) -> Vec3 {
        self.position + Vec3::Y * config.eye_height
    }

    /// Unit look direction including pitch
    pub fn view_direction(&self) -> Vec3 {
        let (sp, cp) = self.pitch.sin_cos();
        self.forward() * cp + Vec3::Y * sp
    }

    /// Shot ray from the eye along the look direction
    pub fn aim_ray(&self, config: &PlayerConfig) -> Ray {
        Ray::new(self.view_origin(config), self.view_direction())
    }

    pub fn jump(&mut self, config: &PlayerConfig) -> bool {
        if !self.grounded {
            return false;
        }
        self.vertical_velocity = config.jump_force;
        self.grounded = false;
        true
    }

    /// Advance one tick. `wish` is (strafe right, forward) in view space.
    pub fn update(
        &mut self,
        wish: Vec2,
        dt: f32,
        config: &PlayerConfig,
        map: &MapConfig,
        barriers: &[StaticBarrier],
    ) {
        let wish = wish.clamp_length_max(1.0);
        let step = (self.right() * wish.x + self.forward() * wish.y) * config.move_speed * dt;
        if step != Vec3::ZERO {
            self.slide(step, config.collision_radius, barriers);
        }

        if !self.grounded {
            self.vertical_velocity -= config.gravity * dt;
        }
        self.position.y += self.vertical_velocity * dt;
        if self.position.y <= 0.0 {
            self.position.y = 0.0;
            self.vertical_velocity = 0.0;
            self.grounded = true;
        }

        self.position = clamp_to_bounds(self.position, map.boundary);
    }

    /// Full move, else X only, else Z only
    fn slide(&mut self, step: Vec3, radius: f32, barriers: &[StaticBarrier]) {
        let candidates = [step, Vec3::new(step.x, 0.0, 0.0), Vec3::new(0.0, 0.0, step.z)];
        for delta in candidates {
            if delta == Vec3::ZERO {
                continue;
            }
            let next = self.position + delta;
            if !collides_with_barriers(next, radius, barriers) {
                self.position = next;
                return;
            }
        }
    }
}
