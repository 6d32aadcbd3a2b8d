//! Canonical game state and the store that owns it
//!
//! The store is the single writer of player, weapon and world flags. Every
//! write goes through a method here and is announced on the store's
//! [`EventChannel`] as `StateChanged`, plus any domain event it implies.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::events::{EventChannel, GameEvent};
use super::weapon::WeaponKind;
use crate::config::GameConfig;
use crate::consts::BASE_MAX_HEALTH;

/// Camera mode, toggled by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    FirstPerson,
    ThirdPerson,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::FirstPerson => ViewMode::ThirdPerson,
            ViewMode::ThirdPerson => ViewMode::FirstPerson,
        }
    }
}

/// Player vitals and economy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub health: f32,
    pub max_health: f32,
    pub armor: f32,
    pub max_armor: f32,
    pub coins: u32,
    pub kills: u32,
    /// Subset of `kills` that were headshots
    pub headshots: u32,
}

/// Owned weapons and their magazines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponInventory {
    pub current: WeaponKind,
    pub owned: BTreeSet<WeaponKind>,
    pub ammo: BTreeMap<WeaponKind, u32>,
    pub max_ammo: BTreeMap<WeaponKind, u32>,
}

/// Complete canonical state; cloned from an immutable template on reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub playing: bool,
    pub paused: bool,
    pub shop_open: bool,
    pub view_mode: ViewMode,
    pub player: PlayerStats,
    pub weapons: WeaponInventory,
}

impl GameStateSnapshot {
    /// Round-start state for the given tuning
    pub fn initial(config: &GameConfig) -> Self {
        let max_ammo: BTreeMap<_, _> = WeaponKind::ALL
            .into_iter()
            .map(|k| (k, config.weapons.spec(k).max_ammo))
            .collect();
        Self {
            playing: false,
            paused: false,
            shop_open: false,
            view_mode: ViewMode::FirstPerson,
            player: PlayerStats {
                health: BASE_MAX_HEALTH,
                max_health: BASE_MAX_HEALTH,
                armor: 0.0,
                max_armor: 0.0,
                coins: config.player.start_coins,
                kills: 0,
                headshots: 0,
            },
            weapons: WeaponInventory {
                current: WeaponKind::Pistol,
                owned: BTreeSet::from([WeaponKind::Pistol]),
                ammo: max_ammo.clone(),
                max_ammo,
            },
        }
    }
}

/// Addressable field of the state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatePath {
    Playing,
    Paused,
    ShopOpen,
    ViewMode,
    Health,
    MaxHealth,
    Armor,
    MaxArmor,
    Coins,
    Kills,
    Headshots,
    CurrentWeapon,
    Owned(WeaponKind),
    Ammo(WeaponKind),
    MaxAmmo(WeaponKind),
}

impl StatePath {
    /// Every addressable path, scalar fields first, then per weapon
    pub fn all() -> Vec<StatePath> {
        let mut paths = vec![
            StatePath::Playing,
            StatePath::Paused,
            StatePath::ShopOpen,
            StatePath::ViewMode,
            StatePath::Health,
            StatePath::MaxHealth,
            StatePath::Armor,
            StatePath::MaxArmor,
            StatePath::Coins,
            StatePath::Kills,
            StatePath::Headshots,
            StatePath::CurrentWeapon,
        ];
        for kind in WeaponKind::ALL {
            paths.extend([
                StatePath::Owned(kind),
                StatePath::Ammo(kind),
                StatePath::MaxAmmo(kind),
            ]);
        }
        paths
    }

    /// Parse a dot path such as `player.health` or `weapons.ammo.rifle`
    pub fn parse(path: &str) -> Option<Self> {
        let parts: Vec<&str> = path.split('.').collect();
        let path = match parts.as_slice() {
            ["playing"] => StatePath::Playing,
            ["paused"] => StatePath::Paused,
            ["shopOpen"] | ["shop_open"] => StatePath::ShopOpen,
            ["viewMode"] | ["view_mode"] => StatePath::ViewMode,
            ["player", "health"] => StatePath::Health,
            ["player", "maxHealth"] | ["player", "max_health"] => StatePath::MaxHealth,
            ["player", "armor"] => StatePath::Armor,
            ["player", "maxArmor"] | ["player", "max_armor"] => StatePath::MaxArmor,
            ["player", "coins"] => StatePath::Coins,
            ["player", "kills"] => StatePath::Kills,
            ["player", "headshots"] => StatePath::Headshots,
            ["weapons", "current"] => StatePath::CurrentWeapon,
            ["weapons", "owned", w] => StatePath::Owned(WeaponKind::from_str(w)?),
            ["weapons", "ammo", w] => StatePath::Ammo(WeaponKind::from_str(w)?),
            ["weapons", "maxAmmo", w] | ["weapons", "max_ammo", w] => {
                StatePath::MaxAmmo(WeaponKind::from_str(w)?)
            }
            _ => return None,
        };
        Some(path)
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatePath::Playing => write!(f, "playing"),
            StatePath::Paused => write!(f, "paused"),
            StatePath::ShopOpen => write!(f, "shopOpen"),
            StatePath::ViewMode => write!(f, "viewMode"),
            StatePath::Health => write!(f, "player.health"),
            StatePath::MaxHealth => write!(f, "player.maxHealth"),
            StatePath::Armor => write!(f, "player.armor"),
            StatePath::MaxArmor => write!(f, "player.maxArmor"),
            StatePath::Coins => write!(f, "player.coins"),
            StatePath::Kills => write!(f, "player.kills"),
            StatePath::Headshots => write!(f, "player.headshots"),
            StatePath::CurrentWeapon => write!(f, "weapons.current"),
            StatePath::Owned(w) => write!(f, "weapons.owned.{}", w.as_str()),
            StatePath::Ammo(w) => write!(f, "weapons.ammo.{}", w.as_str()),
            StatePath::MaxAmmo(w) => write!(f, "weapons.maxAmmo.{}", w.as_str()),
        }
    }
}

/// Value read from (or written to) a [`StatePath`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum StateValue {
    Flag(bool),
    Amount(f32),
    Count(u32),
    Weapon(WeaponKind),
    View(ViewMode),
}

impl From<bool> for StateValue {
    fn from(v: bool) -> Self {
        StateValue::Flag(v)
    }
}

impl From<f32> for StateValue {
    fn from(v: f32) -> Self {
        StateValue::Amount(v)
    }
}

impl From<u32> for StateValue {
    fn from(v: u32) -> Self {
        StateValue::Count(v)
    }
}

impl From<WeaponKind> for StateValue {
    fn from(v: WeaponKind) -> Self {
        StateValue::Weapon(v)
    }
}

impl From<ViewMode> for StateValue {
    fn from(v: ViewMode) -> Self {
        StateValue::View(v)
    }
}

/// What a call to [`GameStateStore::damage`] did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageOutcome {
    /// Taken by armor
    pub absorbed: f32,
    /// Taken by health
    pub health_lost: f32,
    pub armor_broken: bool,
    pub died: bool,
}

/// Owner of the canonical [`GameStateSnapshot`]
#[derive(Debug)]
pub struct GameStateStore {
    state: GameStateSnapshot,
    template: GameStateSnapshot,
    events: EventChannel,
}

impl GameStateStore {
    pub fn new(config: &GameConfig) -> Self {
        let template = GameStateSnapshot::initial(config);
        Self {
            state: template.clone(),
            template,
            events: EventChannel::new(),
        }
    }

    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventChannel {
        &mut self.events
    }

    /// Publish a non-state event (round boundaries, purchases)
    pub fn publish(&mut self, event: GameEvent) {
        self.events.publish(&event);
    }

    fn changed(&mut self, path: StatePath, old: impl Into<StateValue>, new: impl Into<StateValue>) {
        let (old, new) = (old.into(), new.into());
        log::trace!("{}: {:?} -> {:?}", path, old, new);
        self.events.publish(&GameEvent::StateChanged { path, old, new });
    }

    /// Borrow the live state
    pub fn state(&self) -> &GameStateSnapshot {
        &self.state
    }

    /// Copy of the live state
    pub fn snapshot(&self) -> GameStateSnapshot {
        self.state.clone()
    }

    /// Read one field
    pub fn get(&self, path: StatePath) -> StateValue {
        let s = &self.state;
        match path {
            StatePath::Playing => s.playing.into(),
            StatePath::Paused => s.paused.into(),
            StatePath::ShopOpen => s.shop_open.into(),
            StatePath::ViewMode => s.view_mode.into(),
            StatePath::Health => s.player.health.into(),
            StatePath::MaxHealth => s.player.max_health.into(),
            StatePath::Armor => s.player.armor.into(),
            StatePath::MaxArmor => s.player.max_armor.into(),
            StatePath::Coins => s.player.coins.into(),
            StatePath::Kills => s.player.kills.into(),
            StatePath::Headshots => s.player.headshots.into(),
            StatePath::CurrentWeapon => s.weapons.current.into(),
            StatePath::Owned(w) => s.weapons.owned.contains(&w).into(),
            StatePath::Ammo(w) => self.ammo(w).into(),
            StatePath::MaxAmmo(w) => self.max_ammo(w).into(),
        }
    }

    /// Read one field by dot path; unknown paths are `None`
    pub fn get_path(&self, path: &str) -> Option<StateValue> {
        StatePath::parse(path).map(|p| self.get(p))
    }

    /// Restore the round-start template, publishing a change for every
    /// path whose value differs from it
    pub fn reset(&mut self) {
        let before: Vec<(StatePath, StateValue)> =
            StatePath::all().into_iter().map(|p| (p, self.get(p))).collect();
        self.state = self.template.clone();
        log::debug!("State reset to template");
        for (path, old) in before {
            let new = self.get(path);
            if old != new {
                self.changed(path, old, new);
            }
        }
    }

    // === Flags ===

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn is_shop_open(&self) -> bool {
        self.state.shop_open
    }

    pub fn set_playing(&mut self, playing: bool) {
        let old = std::mem::replace(&mut self.state.playing, playing);
        self.changed(StatePath::Playing, old, playing);
    }

    pub fn set_paused(&mut self, paused: bool) {
        let old = std::mem::replace(&mut self.state.paused, paused);
        self.changed(StatePath::Paused, old, paused);
    }

    pub fn set_shop_open(&mut self, open: bool) {
        let old = std::mem::replace(&mut self.state.shop_open, open);
        self.changed(StatePath::ShopOpen, old, open);
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        let old = std::mem::replace(&mut self.state.view_mode, mode);
        self.changed(StatePath::ViewMode, old, mode);
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        let mode = self.state.view_mode.toggled();
        self.set_view_mode(mode);
        mode
    }

    // === Vitals ===

    pub fn health(&self) -> f32 {
        self.state.player.health
    }

    pub fn armor(&self) -> f32 {
        self.state.player.armor
    }

    pub fn is_dead(&self) -> bool {
        self.state.player.health <= 0.0
    }

    /// Apply incoming damage, armor first
    pub fn damage(&mut self, amount: f32) -> DamageOutcome {
        let mut outcome = DamageOutcome::default();
        if !(amount > 0.0) {
            return outcome;
        }
        let mut remaining = amount;

        let armor = self.state.player.armor;
        if armor > 0.0 {
            let absorbed = armor.min(remaining);
            let new_armor = armor - absorbed;
            self.state.player.armor = new_armor;
            remaining -= absorbed;
            outcome.absorbed = absorbed;
            self.changed(StatePath::Armor, armor, new_armor);
            if new_armor <= 0.0 {
                outcome.armor_broken = true;
                log::debug!("Armor broken");
                self.events.publish(&GameEvent::ArmorBroken);
            }
        }

        if remaining > 0.0 {
            let health = self.state.player.health;
            let new_health = (health - remaining).max(0.0);
            self.state.player.health = new_health;
            outcome.health_lost = health - new_health;
            self.changed(StatePath::Health, health, new_health);
            if health > 0.0 && new_health <= 0.0 {
                outcome.died = true;
                log::info!("Player died");
                self.events.publish(&GameEvent::PlayerDied);
            }
        }

        self.events.publish(&GameEvent::PlayerDamaged {
            amount,
            health: self.state.player.health,
            armor: self.state.player.armor,
        });
        outcome
    }

    /// Restore health up to the current max
    pub fn heal(&mut self, amount: f32) {
        if !(amount > 0.0) {
            return;
        }
        let health = self.state.player.health;
        let new_health = (health + amount).min(self.state.player.max_health);
        self.state.player.health = new_health;
        self.changed(StatePath::Health, health, new_health);
    }

    /// Equip an armor tier. Overwrites armor and max health; see DESIGN.md.
    pub fn add_armor(&mut self, points: f32, health_bonus: f32) {
        let points = points.max(0.0);
        let max_health = BASE_MAX_HEALTH + health_bonus.max(0.0);
        let player = self.state.player.clone();

        self.state.player.armor = points;
        self.state.player.max_armor = points;
        self.state.player.max_health = max_health;
        self.state.player.health = max_health;

        self.changed(StatePath::Armor, player.armor, points);
        self.changed(StatePath::MaxArmor, player.max_armor, points);
        self.changed(StatePath::MaxHealth, player.max_health, max_health);
        self.changed(StatePath::Health, player.health, max_health);
    }

    // === Economy ===

    pub fn coins(&self) -> u32 {
        self.state.player.coins
    }

    pub fn add_coins(&mut self, amount: u32) {
        let coins = self.state.player.coins;
        let new_coins = coins.saturating_add(amount);
        self.state.player.coins = new_coins;
        self.changed(StatePath::Coins, coins, new_coins);
    }

    /// Deduct `amount` if affordable; otherwise leave coins untouched
    pub fn spend_coins(&mut self, amount: u32) -> bool {
        let coins = self.state.player.coins;
        if coins < amount {
            return false;
        }
        self.state.player.coins = coins - amount;
        self.changed(StatePath::Coins, coins, coins - amount);
        true
    }

    pub fn kills(&self) -> u32 {
        self.state.player.kills
    }

    pub fn add_kill(&mut self, is_headshot: bool) {
        let kills = self.state.player.kills;
        self.state.player.kills = kills + 1;
        self.changed(StatePath::Kills, kills, kills + 1);

        if is_headshot {
            let headshots = self.state.player.headshots;
            self.state.player.headshots = headshots + 1;
            self.changed(StatePath::Headshots, headshots, headshots + 1);
            self.events.publish(&GameEvent::EnemyHeadshot { kills: kills + 1 });
        } else {
            self.events.publish(&GameEvent::EnemyKilled { kills: kills + 1 });
        }
    }

    // === Weapons ===

    pub fn current_weapon(&self) -> WeaponKind {
        self.state.weapons.current
    }

    pub fn owns(&self, weapon: WeaponKind) -> bool {
        self.state.weapons.owned.contains(&weapon)
    }

    pub fn ammo(&self, weapon: WeaponKind) -> u32 {
        self.state.weapons.ammo.get(&weapon).copied().unwrap_or(0)
    }

    pub fn max_ammo(&self, weapon: WeaponKind) -> u32 {
        self.state.weapons.max_ammo.get(&weapon).copied().unwrap_or(0)
    }

    /// Spend one round of the current weapon
    pub fn use_ammo(&mut self) -> bool {
        let weapon = self.state.weapons.current;
        let ammo = self.ammo(weapon);
        if ammo == 0 {
            self.events.publish(&GameEvent::WeaponEmpty { weapon });
            return false;
        }
        self.state.weapons.ammo.insert(weapon, ammo - 1);
        self.changed(StatePath::Ammo(weapon), ammo, ammo - 1);
        self.events.publish(&GameEvent::WeaponFired {
            weapon,
            ammo_left: ammo - 1,
        });
        true
    }

    /// Refill a magazine to its max
    pub fn reload_weapon(&mut self, weapon: WeaponKind) {
        let ammo = self.ammo(weapon);
        let max = self.max_ammo(weapon);
        self.state.weapons.ammo.insert(weapon, max);
        self.changed(StatePath::Ammo(weapon), ammo, max);
    }

    /// Make an owned weapon current
    pub fn switch_weapon(&mut self, weapon: WeaponKind) -> bool {
        if !self.owns(weapon) {
            return false;
        }
        let old = std::mem::replace(&mut self.state.weapons.current, weapon);
        self.changed(StatePath::CurrentWeapon, old, weapon);
        self.events.publish(&GameEvent::WeaponSwitched { weapon });
        true
    }

    /// Add a weapon to the owned set with a full magazine.
    /// Returns false if it was already owned.
    pub fn grant_weapon(&mut self, weapon: WeaponKind) -> bool {
        if !self.state.weapons.owned.insert(weapon) {
            return false;
        }
        self.changed(StatePath::Owned(weapon), false, true);
        self.reload_weapon(weapon);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::EventKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Store that records every event it publishes
    fn recording_store() -> (GameStateStore, Rc<RefCell<Vec<GameEvent>>>) {
        let mut store = GameStateStore::new(&GameConfig::default());
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in EventKind::ALL {
            let log = log.clone();
            store.events_mut().subscribe(kind, move |e, _| {
                log.borrow_mut().push(e.clone());
                Ok(())
            });
        }
        (store, log)
    }

    fn count(log: &Rc<RefCell<Vec<GameEvent>>>, kind: EventKind) -> usize {
        log.borrow().iter().filter(|e| e.kind() == kind).count()
    }

    #[test]
    fn test_damage_fully_absorbed_by_armor() {
        let (mut store, log) = recording_store();
        store.add_armor(50.0, 0.0);
        log.borrow_mut().clear();

        let outcome = store.damage(30.0);
        assert_eq!(store.armor(), 20.0);
        assert_eq!(store.health(), 100.0);
        assert_eq!(outcome.absorbed, 30.0);
        assert!(!outcome.armor_broken);
        assert_eq!(count(&log, EventKind::ArmorBroken), 0);
        assert_eq!(
            log.borrow().last(),
            Some(&GameEvent::PlayerDamaged {
                amount: 30.0,
                health: 100.0,
                armor: 20.0
            })
        );
    }

    #[test]
    fn test_damage_breaks_armor_then_hits_health() {
        let (mut store, log) = recording_store();
        store.add_armor(20.0, 0.0);
        log.borrow_mut().clear();

        let outcome = store.damage(50.0);
        assert_eq!(store.armor(), 0.0);
        assert_eq!(store.health(), 70.0);
        assert!(outcome.armor_broken);
        assert_eq!(count(&log, EventKind::ArmorBroken), 1);
        assert_eq!(count(&log, EventKind::PlayerDied), 0);

        // Armor already gone: no second ArmorBroken
        store.damage(10.0);
        assert_eq!(count(&log, EventKind::ArmorBroken), 1);
        assert_eq!(store.health(), 60.0);
    }

    #[test]
    fn test_player_died_once_per_descent() {
        let (mut store, log) = recording_store();
        let outcome = store.damage(250.0);
        assert!(outcome.died);
        assert_eq!(store.health(), 0.0);

        store.damage(10.0);
        assert_eq!(store.health(), 0.0);
        assert_eq!(count(&log, EventKind::PlayerDied), 1);
        assert_eq!(count(&log, EventKind::PlayerDamaged), 2);
    }

    #[test]
    fn test_non_positive_damage_is_ignored() {
        let (mut store, log) = recording_store();
        store.damage(0.0);
        store.damage(-5.0);
        store.damage(f32::NAN);
        assert_eq!(store.health(), 100.0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_damage_event_order() {
        let (mut store, log) = recording_store();
        store.add_armor(10.0, 0.0);
        log.borrow_mut().clear();

        store.damage(200.0);
        let kinds: Vec<_> = log.borrow().iter().map(GameEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::StateChanged,
                EventKind::ArmorBroken,
                EventKind::StateChanged,
                EventKind::PlayerDied,
                EventKind::PlayerDamaged,
            ]
        );
    }

    #[test]
    fn test_spend_coins_requires_funds() {
        let (mut store, log) = recording_store();
        store.add_coins(30);
        log.borrow_mut().clear();

        assert!(!store.spend_coins(50));
        assert_eq!(store.coins(), 30);
        assert!(log.borrow().is_empty());

        assert!(store.spend_coins(30));
        assert_eq!(store.coins(), 0);
        assert_eq!(
            log.borrow().last(),
            Some(&GameEvent::StateChanged {
                path: StatePath::Coins,
                old: StateValue::Count(30),
                new: StateValue::Count(0)
            })
        );
    }

    #[test]
    fn test_add_armor_overwrites() {
        let (mut store, _) = recording_store();
        store.add_armor(100.0, 25.0);
        store.damage(30.0);
        store.add_armor(50.0, 0.0);

        let player = &store.state().player;
        assert_eq!(player.armor, 50.0);
        assert_eq!(player.max_armor, 50.0);
        assert_eq!(player.max_health, 100.0);
        assert_eq!(player.health, 100.0);
    }

    #[test]
    fn test_add_kill_events() {
        let (mut store, log) = recording_store();
        store.add_kill(false);
        store.add_kill(true);

        assert_eq!(store.kills(), 2);
        assert_eq!(store.state().player.headshots, 1);
        assert_eq!(count(&log, EventKind::EnemyKilled), 1);
        assert!(log.borrow().contains(&GameEvent::EnemyHeadshot { kills: 2 }));
    }

    #[test]
    fn test_use_ammo_and_empty() {
        let (mut store, log) = recording_store();
        assert!(store.use_ammo());
        assert_eq!(store.ammo(WeaponKind::Pistol), 11);
        assert!(log.borrow().contains(&GameEvent::WeaponFired {
            weapon: WeaponKind::Pistol,
            ammo_left: 11
        }));

        for _ in 0..11 {
            assert!(store.use_ammo());
        }
        log.borrow_mut().clear();
        assert!(!store.use_ammo());
        assert_eq!(store.ammo(WeaponKind::Pistol), 0);
        assert_eq!(
            *log.borrow(),
            vec![GameEvent::WeaponEmpty {
                weapon: WeaponKind::Pistol
            }]
        );
    }

    #[test]
    fn test_reload_sets_max() {
        let (mut store, _) = recording_store();
        store.use_ammo();
        store.use_ammo();
        store.reload_weapon(WeaponKind::Pistol);
        assert_eq!(store.ammo(WeaponKind::Pistol), 12);
        store.reload_weapon(WeaponKind::Pistol);
        assert_eq!(store.ammo(WeaponKind::Pistol), 12);
    }

    #[test]
    fn test_switch_requires_ownership() {
        let (mut store, log) = recording_store();
        assert!(!store.switch_weapon(WeaponKind::Rifle));
        assert_eq!(store.current_weapon(), WeaponKind::Pistol);
        assert!(log.borrow().is_empty());

        assert!(store.grant_weapon(WeaponKind::Rifle));
        assert!(!store.grant_weapon(WeaponKind::Rifle));
        assert!(store.switch_weapon(WeaponKind::Rifle));
        assert_eq!(store.current_weapon(), WeaponKind::Rifle);
        assert_eq!(count(&log, EventKind::WeaponSwitched), 1);
    }

    #[test]
    fn test_get_path_lookup() {
        let (mut store, _) = recording_store();
        store.add_coins(7);
        assert_eq!(store.get_path("player.coins"), Some(StateValue::Count(7)));
        assert_eq!(
            store.get_path("weapons.ammo.pistol"),
            Some(StateValue::Count(12))
        );
        assert_eq!(
            store.get_path("weapons.owned.sniper"),
            Some(StateValue::Flag(false))
        );
        assert_eq!(store.get_path("player.mana"), None);
        assert_eq!(store.get_path("weapons.ammo.bazooka"), None);
        assert_eq!(StatePath::Ammo(WeaponKind::Rifle).to_string(), "weapons.ammo.rifle");
    }

    #[test]
    fn test_reset_restores_template() {
        let (mut store, _) = recording_store();
        let initial = store.snapshot();
        store.add_coins(100);
        store.damage(40.0);
        store.grant_weapon(WeaponKind::Sniper);
        store.set_playing(true);

        store.reset();
        assert_eq!(store.snapshot(), initial);
    }

    #[test]
    fn test_reset_publishes_changed_paths_only() {
        let (mut store, log) = recording_store();
        store.add_coins(40);
        store.damage(30.0);
        log.borrow_mut().clear();

        store.reset();
        let changes: Vec<(StatePath, StateValue, StateValue)> = log
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GameEvent::StateChanged { path, old, new } => Some((*path, *old, *new)),
                _ => None,
            })
            .collect();
        assert_eq!(
            changes,
            vec![
                (
                    StatePath::Health,
                    StateValue::Amount(70.0),
                    StateValue::Amount(100.0)
                ),
                (StatePath::Coins, StateValue::Count(40), StateValue::Count(0)),
            ]
        );

        // Already at the template: nothing to report
        log.borrow_mut().clear();
        store.reset();
        assert_eq!(count(&log, EventKind::StateChanged), 0);
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let (mut store, _) = recording_store();
        store.damage(30.0);
        store.heal(100.0);
        assert_eq!(store.health(), 100.0);
    }
}
