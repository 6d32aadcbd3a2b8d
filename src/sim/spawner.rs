//! Hostile lifecycle: timed spawning around the player, per-tick updates,
//! attack dispatch and delayed removal of bodies.

use std::collections::BTreeSet;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::clamp_to_bounds;
use super::enemy::{Enemy, EnemyStatus};
use super::state::GameStateStore;
use crate::config::GameConfig;
use crate::ground_offset;

/// What one `update` pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnerReport {
    pub spawned: Option<u32>,
    /// Entities first observed dead this tick
    pub died: Vec<u32>,
    /// Entities removed this tick
    pub despawned: Vec<u32>,
    /// Total damage dealt to the player this tick
    pub damage_dealt: f32,
}

#[derive(Debug, Clone)]
pub struct EnemySpawner {
    active: bool,
    /// Seconds since the last spawn
    accumulator: f32,
    next_id: u32,
    /// Active entities in spawn order
    enemies: Vec<Enemy>,
    /// Dead but not yet purged
    dead: BTreeSet<u32>,
    rng: Pcg32,
}

impl EnemySpawner {
    pub fn new(seed: u64) -> Self {
        Self {
            active: false,
            accumulator: 0.0,
            next_id: 1,
            enemies: Vec::new(),
            dead: BTreeSet::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    /// Stop spawning; existing entities keep updating
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub fn get(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn living(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.is_alive())
    }

    pub fn living_count(&self) -> usize {
        self.living().count()
    }

    pub fn dead_count(&self) -> usize {
        self.dead.len()
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Random point in the spawn annulus around `player`, clamped to the map
    pub fn spawn_position(&mut self, player: Vec3, config: &GameConfig) -> Vec3 {
        let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        let (min, max) = (config.enemy.spawn_min_dist, config.enemy.spawn_max_dist);
        let dist = if max > min {
            self.rng.random_range(min..=max)
        } else {
            min
        };
        let pos = Vec3::new(player.x, 0.0, player.z) + ground_offset(angle, dist);
        clamp_to_bounds(pos, config.map.boundary)
    }

    /// Create one hostile and return its id
    pub fn spawn(&mut self, player: Vec3, config: &GameConfig) -> u32 {
        let position = self.spawn_position(player, config);
        self.spawn_at(position, config)
    }

    /// Create one hostile at a fixed position
    pub fn spawn_at(&mut self, position: Vec3, config: &GameConfig) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.enemies.push(Enemy::new(id, position, config.enemy_health()));
        log::debug!(
            "Spawned enemy {} at ({:.1}, {:.1}), {} active",
            id,
            position.x,
            position.z,
            self.enemies.len()
        );
        id
    }

    /// Advance the lifecycle by one tick
    pub fn update(
        &mut self,
        store: &mut GameStateStore,
        player: Vec3,
        dt: f32,
        now: f32,
        config: &GameConfig,
    ) -> SpawnerReport {
        let mut report = SpawnerReport::default();

        if self.active {
            self.accumulator += dt;
            if self.accumulator >= config.spawn_interval() {
                self.accumulator = 0.0;
                report.spawned = Some(self.spawn(player, config));
            }
        }

        // Read/update pass: collect expired ids, apply removals afterwards
        let mut expired = Vec::new();
        let damage = config.enemy_damage();
        for enemy in &mut self.enemies {
            let status = enemy.update(player, dt, now, &config.enemy);

            if enemy.is_dead() {
                if self.dead.insert(enemy.id) {
                    report.died.push(enemy.id);
                }
                if status == EnemyStatus::Expired {
                    expired.push(enemy.id);
                }
                continue;
            }

            if enemy.in_attack_range(player, &config.enemy) && !store.is_dead() {
                let dealt = enemy.attack(now, damage, &config.enemy);
                if dealt > 0.0 {
                    log::debug!("Enemy {} hits player for {}", enemy.id, dealt);
                    store.damage(dealt);
                    report.damage_dealt += dealt;
                }
            }
        }

        if !expired.is_empty() {
            self.enemies.retain(|e| !expired.contains(&e.id));
            for id in &expired {
                self.dead.remove(id);
                log::debug!("Despawned enemy {}", id);
            }
            report.despawned = expired;
        }

        report
    }

    /// Remove every entity now, alive or dead (round reset)
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.dead.clear();
        self.accumulator = 0.0;
    }

    /// Reseed for a new round; ids keep counting up
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (EnemySpawner, GameStateStore, GameConfig) {
        let config = GameConfig::default();
        (EnemySpawner::new(7), GameStateStore::new(&config), config)
    }

    #[test]
    fn test_inactive_spawner_does_not_spawn() {
        let (mut spawner, mut store, config) = setup();
        for i in 0..600 {
            spawner.update(&mut store, Vec3::ZERO, 0.1, i as f32 * 0.1, &config);
        }
        assert!(spawner.is_empty());
    }

    #[test]
    fn test_spawns_on_interval_and_resets_accumulator() {
        let (mut spawner, mut store, config) = setup();
        spawner.start();

        let mut spawned = Vec::new();
        let mut now = 0.0;
        // 3s interval, 0.5s ticks: spawns at ticks 6 and 12
        for _ in 0..12 {
            now += 0.5;
            let report = spawner.update(&mut store, Vec3::ZERO, 0.5, now, &config);
            spawned.extend(report.spawned);
        }
        assert_eq!(spawned, vec![1, 2]);
        assert_eq!(spawner.len(), 2);
    }

    #[test]
    fn test_stopped_spawner_still_updates_entities() {
        let (mut spawner, mut store, config) = setup();
        let id = spawner.spawn_at(Vec3::new(10.0, 0.0, 0.0), &config);
        spawner.stop();
        spawner.update(&mut store, Vec3::ZERO, 1.0, 1.0, &config);
        assert!(spawner.get(id).unwrap().position.x < 10.0);
    }

    #[test]
    fn test_spawn_position_in_annulus_and_bounds() {
        let (mut spawner, _, config) = setup();
        let player = Vec3::new(5.0, 1.6, -3.0);
        for _ in 0..200 {
            let pos = spawner.spawn_position(player, &config);
            let dist = (pos - Vec3::new(player.x, 0.0, player.z)).length();
            assert!(dist >= config.enemy.spawn_min_dist - 1e-3);
            assert!(dist <= config.enemy.spawn_max_dist + 1e-3);
            assert_eq!(pos.y, 0.0);
        }
    }

    #[test]
    fn test_spawn_position_clamped_near_edge() {
        let (mut spawner, _, config) = setup();
        let corner = Vec3::new(47.0, 0.0, 47.0);
        for _ in 0..200 {
            let pos = spawner.spawn_position(corner, &config);
            assert!(pos.x.abs() <= config.map.boundary);
            assert!(pos.z.abs() <= config.map.boundary);
        }
    }

    #[test]
    fn test_dead_tracked_once_then_purged() {
        let (mut spawner, mut store, config) = setup();
        let id = spawner.spawn_at(Vec3::new(20.0, 0.0, 0.0), &config);
        spawner.enemies_mut()[0].take_damage(1000.0, false, 1.0);

        let first = spawner.update(&mut store, Vec3::ZERO, 0.1, 1.1, &config);
        assert_eq!(first.died, vec![id]);
        let second = spawner.update(&mut store, Vec3::ZERO, 0.1, 1.2, &config);
        assert!(second.died.is_empty());
        assert_eq!(spawner.dead_count(), 1);

        // Despawn delay is 5s after death at t=1.0
        let purge = spawner.update(&mut store, Vec3::ZERO, 0.1, 6.1, &config);
        assert_eq!(purge.despawned, vec![id]);
        assert!(spawner.is_empty());
        assert_eq!(spawner.dead_count(), 0);
    }

    #[test]
    fn test_removal_does_not_skip_neighbours() {
        let (mut spawner, mut store, config) = setup();
        for x in [20.0, 21.0, 22.0, 23.0] {
            spawner.spawn_at(Vec3::new(x, 0.0, 0.0), &config);
        }
        // Kill two adjacent entities
        spawner.enemies_mut()[1].take_damage(1000.0, false, 0.0);
        spawner.enemies_mut()[2].take_damage(1000.0, false, 0.0);

        let report = spawner.update(&mut store, Vec3::ZERO, 0.1, 10.0, &config);
        assert_eq!(report.despawned, vec![2, 3]);
        let ids: Vec<_> = spawner.enemies().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_in_range_enemy_attacks_player() {
        let (mut spawner, mut store, config) = setup();
        spawner.spawn_at(Vec3::new(1.0, 0.0, 0.0), &config);

        let report = spawner.update(&mut store, Vec3::ZERO, 0.1, 0.1, &config);
        assert_eq!(report.damage_dealt, 10.0);
        assert_eq!(store.health(), 90.0);

        // On cooldown
        let report = spawner.update(&mut store, Vec3::ZERO, 0.1, 0.2, &config);
        assert_eq!(report.damage_dealt, 0.0);
    }

    #[test]
    fn test_clear_removes_everything() {
        let (mut spawner, mut store, config) = setup();
        spawner.spawn_at(Vec3::new(20.0, 0.0, 0.0), &config);
        spawner.spawn_at(Vec3::new(30.0, 0.0, 0.0), &config);
        spawner.enemies_mut()[0].take_damage(1000.0, false, 0.0);
        spawner.update(&mut store, Vec3::ZERO, 0.1, 0.1, &config);

        spawner.clear();
        assert!(spawner.is_empty());
        assert_eq!(spawner.dead_count(), 0);
        // Ids keep increasing after a clear
        assert_eq!(spawner.spawn_at(Vec3::ZERO, &config), 3);
    }

    #[test]
    fn test_same_seed_same_positions() {
        let config = GameConfig::default();
        let mut a = EnemySpawner::new(42);
        let mut b = EnemySpawner::new(42);
        for _ in 0..10 {
            assert_eq!(
                a.spawn_position(Vec3::ZERO, &config),
                b.spawn_position(Vec3::ZERO, &config)
            );
        }
    }
}
