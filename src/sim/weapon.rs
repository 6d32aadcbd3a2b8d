//! Weapons: fire-rate and ammo gating in front of the hit-scan resolver

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::GameStateStore;
use crate::config::{WeaponSpec, WeaponTable};

/// Weapon types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponKind {
    Pistol,
    Rifle,
    Shotgun,
    Sniper,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Pistol,
        WeaponKind::Rifle,
        WeaponKind::Shotgun,
        WeaponKind::Sniper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Pistol => "pistol",
            WeaponKind::Rifle => "rifle",
            WeaponKind::Shotgun => "shotgun",
            WeaponKind::Sniper => "sniper",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s.to_lowercase())
    }

    /// Number-key slot (1-based)
    pub fn slot(&self) -> u8 {
        match self {
            WeaponKind::Pistol => 1,
            WeaponKind::Rifle => 2,
            WeaponKind::Shotgun => 3,
            WeaponKind::Sniper => 4,
        }
    }

    pub fn from_slot(slot: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slot() == slot)
    }
}

/// Result of pulling the trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireOutcome {
    /// Shot left the barrel; resolve it with this damage
    Fired { damage: f32 },
    /// Still inside the fire-rate interval (no event)
    CoolingDown,
    /// Magazine empty (`WeaponEmpty` was published by the store)
    Empty,
}

impl FireOutcome {
    pub fn fired(&self) -> bool {
        matches!(self, FireOutcome::Fired { .. })
    }
}

/// One owned weapon
#[derive(Debug, Clone)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub spec: WeaponSpec,
    /// Sim time of the last successful shot
    last_fire: Option<f32>,
}

impl Weapon {
    pub fn new(kind: WeaponKind, spec: WeaponSpec) -> Self {
        Self {
            kind,
            spec,
            last_fire: None,
        }
    }

    pub fn damage(&self) -> f32 {
        self.spec.damage
    }

    pub fn last_fire(&self) -> Option<f32> {
        self.last_fire
    }

    fn cooled_down(&self, now: f32) -> bool {
        self.last_fire
            .is_none_or(|last| now - last >= self.spec.fire_interval)
    }

    /// Ammo left and fire interval elapsed
    pub fn can_fire(&self, store: &GameStateStore, now: f32) -> bool {
        store.ammo(self.kind) > 0 && self.cooled_down(now)
    }

    /// Attempt a shot; ammo is consumed through the store
    pub fn fire(&mut self, store: &mut GameStateStore, now: f32) -> FireOutcome {
        if !self.cooled_down(now) {
            return FireOutcome::CoolingDown;
        }
        if !store.use_ammo() {
            return FireOutcome::Empty;
        }
        self.last_fire = Some(now);
        FireOutcome::Fired {
            damage: self.spec.damage,
        }
    }
}

/// Weapon instances for every owned type, for one round
#[derive(Debug, Clone, Default)]
pub struct Arsenal {
    weapons: BTreeMap<WeaponKind, Weapon>,
}

impl Arsenal {
    /// Build from the store's owned set
    pub fn from_store(store: &GameStateStore, table: &WeaponTable) -> Self {
        let mut arsenal = Self::default();
        for kind in store.state().weapons.owned.iter().copied() {
            arsenal.add(kind, table);
        }
        arsenal
    }

    /// Add a weapon; an existing instance keeps its cooldown
    pub fn add(&mut self, kind: WeaponKind, table: &WeaponTable) {
        self.weapons
            .entry(kind)
            .or_insert_with(|| Weapon::new(kind, *table.spec(kind)));
    }

    pub fn get(&self, kind: WeaponKind) -> Option<&Weapon> {
        self.weapons.get(&kind)
    }

    pub fn get_mut(&mut self, kind: WeaponKind) -> Option<&mut Weapon> {
        self.weapons.get_mut(&kind)
    }

    pub fn contains(&self, kind: WeaponKind) -> bool {
        self.weapons.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }
}
