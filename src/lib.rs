//! Dead Sector - hostile-wave combat simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (events, state store, collision, hit-scan, spawning)
//! - `config`: Data-driven game balance
//! - `records`: Round leaderboard persisted as JSON
//! - `error`: Error types for fallible I/O

pub mod config;
pub mod error;
pub mod records;
pub mod sim;

pub use config::{Difficulty, GameConfig};
pub use error::Error;
pub use records::RoundRecords;

use glam::Vec3;

/// Simulation constants that are not part of the tunable config
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Base player health before any armor bonus
    pub const BASE_MAX_HEALTH: f32 = 100.0;

    /// Pitch limit so the view never flips over (radians)
    pub const MAX_PITCH: f32 = 1.5;

    /// Max number of rounds kept on the leaderboard
    pub const MAX_ROUND_RECORDS: usize = 10;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Offset on the ground plane at the given angle and distance: (cos·d, 0, sin·d)
#[inline]
pub fn ground_offset(angle: f32, dist: f32) -> Vec3 {
    Vec3::new(angle.cos() * dist, 0.0, angle.sin() * dist)
}

/// Project onto the ground plane (drop the vertical component)
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Yaw (rotation about +Y) that faces along `dir` on the ground plane.
/// Yaw 0 faces -Z, the same convention as the player's look.
#[inline]
pub fn yaw_toward(dir: Vec3) -> f32 {
    (-dir.x).atan2(-dir.z)
}
