//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order / entity ID)
//! - No rendering or platform dependencies
//!
//! Components never reach a global: the [`GameStateStore`] (and the
//! [`EventChannel`] it owns) is passed explicitly to whoever mutates it.

pub mod collision;
pub mod effects;
pub mod enemy;
pub mod events;
pub mod hitscan;
pub mod player;
pub mod shop;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod weapon;

pub use collision::{
    Positioned, RayHit, StaticBarrier, clamp_to_bounds, closest_point_on_segment,
    collides_with_barriers, point_in_sphere, ray_sphere, spheres_collide, within_bounds,
    within_radius,
};
pub use effects::{EffectKind, EffectQueue, TimedEffect};
pub use enemy::{Enemy, EnemyStatus, HitSphere, LifeState};
pub use events::{
    EventChannel, EventKind, GameEvent, HandlerError, HandlerResult, Outbox, SubscriptionId,
};
pub use hitscan::{HitScanResolver, HitSurface, Ray, ShotHit};
pub use player::PlayerBody;
pub use shop::{ArmorTier, PurchaseFailure, Shop, ShopItem};
pub use spawner::{EnemySpawner, SpawnerReport};
pub use state::{
    DamageOutcome, GameStateSnapshot, GameStateStore, PlayerStats, StatePath, StateValue,
    ViewMode, WeaponInventory,
};
pub use tick::{Game, TickInput, TickReport};
pub use weapon::{Arsenal, FireOutcome, Weapon, WeaponKind};
