//! Game balance configuration
//!
//! A read-only record handed to every simulation component at construction.
//! Defaults are the built-in tuning; a JSON file can override any section.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::shop::ArmorTier;
use crate::sim::weapon::WeaponKind;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "med" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier on the time between spawns (lower = more hostiles)
    pub fn spawn_interval_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.6,
        }
    }

    /// Multiplier on hostile starting health
    pub fn enemy_health_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
        }
    }

    /// Multiplier on hostile attack damage
    pub fn enemy_damage_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }
}

/// Player movement tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal speed (units/s)
    pub move_speed: f32,
    /// Initial upward velocity of a jump (units/s)
    pub jump_force: f32,
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Radius used against static barriers
    pub collision_radius: f32,
    /// Camera height above the feet
    pub eye_height: f32,
    /// Coins at round start
    pub start_coins: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_force: 8.0,
            gravity: 20.0,
            collision_radius: 0.5,
            eye_height: 1.6,
            start_coins: 0,
        }
    }
}

/// Static configuration of one weapon type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub damage: f32,
    pub max_ammo: u32,
    /// Minimum seconds between shots
    pub fire_interval: f32,
    pub price: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTable {
    pub pistol: WeaponSpec,
    pub rifle: WeaponSpec,
    pub shotgun: WeaponSpec,
    pub sniper: WeaponSpec,
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self {
            pistol: WeaponSpec {
                damage: 25.0,
                max_ammo: 12,
                fire_interval: 0.3,
                price: 0,
            },
            rifle: WeaponSpec {
                damage: 20.0,
                max_ammo: 30,
                fire_interval: 0.1,
                price: 150,
            },
            shotgun: WeaponSpec {
                damage: 80.0,
                max_ammo: 6,
                fire_interval: 0.9,
                price: 200,
            },
            sniper: WeaponSpec {
                damage: 150.0,
                max_ammo: 5,
                fire_interval: 1.5,
                price: 300,
            },
        }
    }
}

impl WeaponTable {
    pub fn spec(&self, kind: WeaponKind) -> &WeaponSpec {
        match kind {
            WeaponKind::Pistol => &self.pistol,
            WeaponKind::Rifle => &self.rifle,
            WeaponKind::Shotgun => &self.shotgun,
            WeaponKind::Sniper => &self.sniper,
        }
    }
}

/// One purchasable armor tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmorSpec {
    pub points: f32,
    /// Added on top of the base max health
    pub health_bonus: f32,
    pub price: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmorTable {
    pub light: ArmorSpec,
    pub heavy: ArmorSpec,
}

impl Default for ArmorTable {
    fn default() -> Self {
        Self {
            light: ArmorSpec {
                points: 50.0,
                health_bonus: 0.0,
                price: 100,
            },
            heavy: ArmorSpec {
                points: 100.0,
                health_bonus: 25.0,
                price: 250,
            },
        }
    }
}

impl ArmorTable {
    pub fn spec(&self, tier: ArmorTier) -> &ArmorSpec {
        match tier {
            ArmorTier::Light => &self.light,
            ArmorTier::Heavy => &self.heavy,
        }
    }
}

/// Hostile entity tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub speed: f32,
    pub health: f32,
    pub damage: f32,
    /// Seconds between spawns
    pub spawn_interval: f32,
    pub spawn_min_dist: f32,
    pub spawn_max_dist: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    /// Seconds a body stays after death
    pub despawn_delay: f32,
    /// Height above the base position where head hits begin
    pub headshot_threshold: f32,
    pub body_height: f32,
    pub body_radius: f32,
    pub head_height: f32,
    pub head_radius: f32,
    /// Walk cycle phase advance per unit travelled
    pub walk_cycle_rate: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            health: 100.0,
            damage: 10.0,
            spawn_interval: 3.0,
            spawn_min_dist: 15.0,
            spawn_max_dist: 25.0,
            attack_range: 1.5,
            attack_cooldown: 1.0,
            despawn_delay: 5.0,
            headshot_threshold: 1.5,
            body_height: 0.9,
            body_radius: 0.6,
            head_height: 1.75,
            head_radius: 0.25,
            walk_cycle_rate: 4.0,
        }
    }
}

/// Coin rewards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub kill: u32,
    pub headshot: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            kill: 10,
            headshot: 25,
        }
    }
}

/// Play area
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Full side length of the square floor
    pub size: f32,
    /// Half-extent everything is clamped to, at most `size / 2`
    pub boundary: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            size: 100.0,
            boundary: 48.0,
        }
    }
}

/// Lifetimes of cosmetic effects (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectTimings {
    pub muzzle_flash: f32,
    pub hit_marker: f32,
    pub gore: f32,
    pub blood_pool: f32,
}

impl Default for EffectTimings {
    fn default() -> Self {
        Self {
            muzzle_flash: 0.05,
            hit_marker: 0.1,
            gore: 1.0,
            blood_pool: 10.0,
        }
    }
}

/// Complete balance record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub difficulty: Difficulty,
    pub player: PlayerConfig,
    pub weapons: WeaponTable,
    pub armor: ArmorTable,
    pub ammo_refill_price: u32,
    pub enemy: EnemyConfig,
    pub rewards: RewardConfig,
    pub map: MapConfig,
    pub effects: EffectTimings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            player: PlayerConfig::default(),
            weapons: WeaponTable::default(),
            armor: ArmorTable::default(),
            ammo_refill_price: 50,
            enemy: EnemyConfig::default(),
            rewards: RewardConfig::default(),
            map: MapConfig::default(),
            effects: EffectTimings::default(),
        }
    }
}

impl GameConfig {
    /// Default tuning at the given difficulty
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let mut config = Self::default();
        config.difficulty = difficulty;
        config
    }

    /// Parse a (possibly partial) JSON document; missing sections keep defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {} ({})", path.display(), config.difficulty.as_str());
        Ok(config)
    }

    /// Repair values that would break simulation invariants
    pub fn sanitized(mut self) -> Self {
        let enemy = &mut self.enemy;
        if enemy.spawn_min_dist > enemy.spawn_max_dist {
            log::warn!(
                "spawn_min_dist {} > spawn_max_dist {}, swapping",
                enemy.spawn_min_dist,
                enemy.spawn_max_dist
            );
            std::mem::swap(&mut enemy.spawn_min_dist, &mut enemy.spawn_max_dist);
        }
        enemy.spawn_min_dist = enemy.spawn_min_dist.max(0.0);
        enemy.spawn_interval = enemy.spawn_interval.max(0.0);
        self.map.size = self.map.size.abs();
        let half = self.map.size / 2.0;
        if self.map.boundary.abs() > half {
            log::warn!(
                "map boundary {} exceeds half the floor size {}, clamping",
                self.map.boundary,
                half
            );
        }
        self.map.boundary = self.map.boundary.abs().min(half);
        self
    }

    /// Effective seconds between spawns
    pub fn spawn_interval(&self) -> f32 {
        self.enemy.spawn_interval * self.difficulty.spawn_interval_scale()
    }

    /// Effective hostile starting health
    pub fn enemy_health(&self) -> f32 {
        self.enemy.health * self.difficulty.enemy_health_scale()
    }

    /// Effective hostile attack damage
    pub fn enemy_damage(&self) -> f32 {
        self.enemy.damage * self.difficulty.enemy_damage_scale()
    }
}
