//! Fixed timestep simulation tick
//!
//! `Game` owns every simulation component and advances them in a fixed order:
//! pause/shop toggles, clock, player input, hostile lifecycle, effect expiry,
//! then the death check that ends the round.

use glam::{Vec2, Vec3};

use super::collision::StaticBarrier;
use super::effects::EffectQueue;
use super::events::GameEvent;
use super::hitscan::{HitScanResolver, ShotHit};
use super::player::PlayerBody;
use super::shop::{PurchaseFailure, Shop, ShopItem};
use super::spawner::{EnemySpawner, SpawnerReport};
use super::state::GameStateStore;
use super::weapon::{Arsenal, FireOutcome, WeaponKind};
use crate::config::GameConfig;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::records::{RoundRecord, RoundRecords};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Walk direction in view space: x = strafe right, y = forward
    pub move_dir: Vec2,
    /// Look delta (yaw, pitch) in radians
    pub look: Vec2,
    pub jump: bool,
    /// Trigger held
    pub fire: bool,
    pub reload: bool,
    /// Switch to this weapon if owned
    pub switch_to: Option<WeaponKind>,
    /// Pause toggle
    pub pause: bool,
    /// Shop toggle (freezes the round while open)
    pub toggle_shop: bool,
    pub toggle_view: bool,
}

impl TickInput {
    /// Same input with the one-shot actions cleared (held keys kept)
    pub fn held(&self) -> Self {
        Self {
            move_dir: self.move_dir,
            fire: self.fire,
            ..Default::default()
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// False when the tick was skipped (paused, shop open, not playing)
    pub advanced: bool,
    pub fire: Option<FireOutcome>,
    pub shot: Option<ShotHit>,
    pub lifecycle: SpawnerReport,
    pub expired_effects: usize,
    pub game_over: bool,
}

/// One play session: canonical state plus every world component
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    seed: u64,
    round: u64,
    store: GameStateStore,
    spawner: EnemySpawner,
    arsenal: Arsenal,
    player: PlayerBody,
    barriers: Vec<StaticBarrier>,
    effects: EffectQueue,
    records: RoundRecords,
    /// Simulated seconds since the round was (re)created
    time: f32,
    time_ticks: u64,
    round_started_at: f32,
    /// Started and not yet ended; a stop/start pair keeps it open
    round_open: bool,
    /// Unconsumed frame time for `update`
    accumulator: f32,
}

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let store = GameStateStore::new(&config);
        let arsenal = Arsenal::from_store(&store, &config.weapons);
        Self {
            spawner: EnemySpawner::new(seed),
            config,
            seed,
            round: 0,
            store,
            arsenal,
            player: PlayerBody::default(),
            barriers: Vec::new(),
            effects: EffectQueue::new(),
            records: RoundRecords::new(),
            time: 0.0,
            time_ticks: 0,
            round_started_at: 0.0,
            round_open: false,
            accumulator: 0.0,
        }
    }

    pub fn with_barriers(mut self, barriers: Vec<StaticBarrier>) -> Self {
        self.barriers = barriers;
        self
    }

    pub fn with_records(mut self, records: RoundRecords) -> Self {
        self.records = records;
        self
    }

    // === Accessors ===

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &GameStateStore {
        &self.store
    }

    /// Subscribing to events goes through here
    pub fn store_mut(&mut self) -> &mut GameStateStore {
        &mut self.store
    }

    pub fn spawner(&self) -> &EnemySpawner {
        &self.spawner
    }

    pub fn arsenal(&self) -> &Arsenal {
        &self.arsenal
    }

    pub fn player(&self) -> &PlayerBody {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerBody {
        &mut self.player
    }

    pub fn barriers(&self) -> &[StaticBarrier] {
        &self.barriers
    }

    pub fn effects(&self) -> &EffectQueue {
        &self.effects
    }

    pub fn records(&self) -> &RoundRecords {
        &self.records
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn is_running(&self) -> bool {
        self.store.is_playing()
    }

    // === Round boundary ===

    /// Begin the round. No-op if already running or the player is dead.
    pub fn start(&mut self) -> bool {
        if self.store.is_playing() || self.store.is_dead() {
            return false;
        }
        self.store.set_playing(true);
        self.spawner.start();
        if !self.round_open {
            self.round_open = true;
            self.round_started_at = self.time;
        }
        log::info!(
            "Round {} started (seed {}, {})",
            self.round,
            self.seed,
            self.config.difficulty.as_str()
        );
        self.store.publish(GameEvent::GameStarted);
        true
    }

    /// Halt spawning and mark the round as not running
    pub fn stop(&mut self) {
        self.spawner.stop();
        self.store.set_playing(false);
    }

    /// End a running round the way death does: `GAME_OVER` and a leaderboard
    /// entry. Returns false if no round is running.
    pub fn finish(&mut self) -> bool {
        if !self.store.is_playing() {
            return false;
        }
        self.end_round();
        true
    }

    /// Fresh round from the template state, then start it
    pub fn restart(&mut self) {
        self.round += 1;
        self.store.reset();
        self.spawner.clear();
        self.spawner.stop();
        self.spawner.reseed(self.seed.wrapping_add(self.round));
        self.arsenal = Arsenal::from_store(&self.store, &self.config.weapons);
        self.player = PlayerBody::default();
        self.effects.clear();
        self.time = 0.0;
        self.time_ticks = 0;
        self.accumulator = 0.0;
        self.round_open = false;
        self.store.publish(GameEvent::GameRestarted);
        self.start();
    }

    fn end_round(&mut self) {
        self.stop();
        self.round_open = false;
        let player = &self.store.state().player;
        let record = RoundRecord {
            kills: player.kills,
            headshots: player.headshots,
            coins: player.coins,
            survived: self.time - self.round_started_at,
            difficulty: self.config.difficulty,
        };
        self.store.publish(GameEvent::GameOver {
            kills: record.kills,
            coins: record.coins,
            survived: record.survived,
        });
        log::info!(
            "Game over: {} kills, {} coins, {:.1}s survived",
            record.kills,
            record.coins,
            record.survived
        );
        if let Some(rank) = self.records.add_round(record) {
            log::info!("New round record at rank {}", rank);
        }
    }

    // === Commands ===

    pub fn purchase(&mut self, item: ShopItem) -> Result<(), PurchaseFailure> {
        Shop::new(&self.config).purchase(&mut self.store, &mut self.arsenal, item)
    }

    /// Place a hostile directly (scripted waves, tests)
    pub fn spawn_enemy_at(&mut self, position: Vec3) -> u32 {
        self.spawner.spawn_at(position, &self.config)
    }

    // === Frame loop ===

    /// Run as many fixed ticks as `frame_dt` covers, capped at `MAX_SUBSTEPS`.
    /// One-shot input actions are applied on the first substep only.
    pub fn update(&mut self, input: &TickInput, frame_dt: f32) -> Vec<TickReport> {
        self.accumulator += frame_dt.min(0.1);

        let mut reports = Vec::new();
        let mut substeps = 0;
        let held = input.held();
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = if substeps == 0 { input } else { &held };
            reports.push(self.tick(input, SIM_DT));
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        reports
    }

    /// Advance the game by one fixed timestep
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> TickReport {
        let mut report = TickReport::default();

        if self.store.is_playing() {
            if input.pause {
                let paused = !self.store.is_paused();
                self.store.set_paused(paused);
                log::debug!("Paused: {}", paused);
            }
            if input.toggle_shop && !self.store.is_paused() {
                let open = !self.store.is_shop_open();
                self.store.set_shop_open(open);
                log::debug!("Shop open: {}", open);
            }
        }

        if !self.store.is_playing() || self.store.is_paused() || self.store.is_shop_open() {
            return report;
        }
        report.advanced = true;

        self.time_ticks += 1;
        self.time += dt;
        let now = self.time;

        // Input actions
        if input.toggle_view {
            self.store.toggle_view_mode();
        }
        if input.look != Vec2::ZERO {
            self.player.look(input.look);
        }
        if let Some(weapon) = input.switch_to {
            if weapon != self.store.current_weapon() {
                self.store.switch_weapon(weapon);
            }
        }
        if input.reload {
            self.store.reload_weapon(self.store.current_weapon());
        }
        if input.jump {
            self.player.jump(&self.config.player);
        }
        self.player.update(
            input.move_dir,
            dt,
            &self.config.player,
            &self.config.map,
            &self.barriers,
        );

        if input.fire {
            let weapon = self.store.current_weapon();
            if let Some(gun) = self.arsenal.get_mut(weapon) {
                let outcome = gun.fire(&mut self.store, now);
                if let FireOutcome::Fired { damage } = outcome {
                    let ray = self.player.aim_ray(&self.config.player);
                    report.shot = HitScanResolver::new(&self.config).resolve(
                        &mut self.store,
                        self.spawner.enemies_mut(),
                        &mut self.effects,
                        ray,
                        damage,
                        now,
                    );
                }
                report.fire = Some(outcome);
            }
        }

        // Hostiles
        report.lifecycle =
            self.spawner
                .update(&mut self.store, self.player.position, dt, now, &self.config);

        report.expired_effects = self.effects.expire(now).len();

        if self.store.is_dead() {
            self.end_round();
            report.game_over = true;
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::EventKind;
    use crate::sim::state::ViewMode;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record_kinds(game: &mut Game) -> Rc<RefCell<Vec<EventKind>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in EventKind::ALL {
            if kind == EventKind::StateChanged {
                continue;
            }
            let log = log.clone();
            game.store_mut().events_mut().subscribe(kind, move |e, _| {
                log.borrow_mut().push(e.kind());
                Ok(())
            });
        }
        log
    }

    fn fire() -> TickInput {
        TickInput {
            fire: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_requires_start() {
        let mut game = Game::new(GameConfig::default(), 1);
        let report = game.tick(&TickInput::default(), SIM_DT);
        assert!(!report.advanced);
        assert_eq!(game.time_ticks(), 0);

        assert!(game.start());
        assert!(!game.start());
        assert!(game.tick(&TickInput::default(), SIM_DT).advanced);
        assert_eq!(game.time_ticks(), 1);
    }

    #[test]
    fn test_tick_pause() {
        let mut game = Game::new(GameConfig::default(), 1);
        game.start();
        game.tick(&TickInput::default(), SIM_DT);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        assert!(!game.tick(&pause, SIM_DT).advanced);
        assert!(game.store().is_paused());
        assert!(!game.tick(&TickInput::default(), SIM_DT).advanced);
        assert_eq!(game.time_ticks(), 1);

        // Unpausing resumes on the same tick
        assert!(game.tick(&pause, SIM_DT).advanced);
        assert_eq!(game.time_ticks(), 2);
    }

    #[test]
    fn test_shop_freezes_round_and_allows_purchase() {
        let mut config = GameConfig::default();
        config.player.start_coins = 500;
        let mut game = Game::new(config, 1);
        game.start();

        assert_eq!(
            game.purchase(ShopItem::Weapon(WeaponKind::Rifle)),
            Err(PurchaseFailure::ShopClosed)
        );

        let toggle = TickInput {
            toggle_shop: true,
            ..Default::default()
        };
        assert!(!game.tick(&toggle, SIM_DT).advanced);
        assert!(game.purchase(ShopItem::Weapon(WeaponKind::Rifle)).is_ok());
        assert!(game.arsenal().contains(WeaponKind::Rifle));

        assert!(game.tick(&toggle, SIM_DT).advanced);
        let switch = TickInput {
            switch_to: Some(WeaponKind::Rifle),
            ..Default::default()
        };
        game.tick(&switch, SIM_DT);
        assert_eq!(game.store().current_weapon(), WeaponKind::Rifle);
    }

    #[test]
    fn test_switch_to_unowned_weapon_is_ignored() {
        let mut game = Game::new(GameConfig::default(), 1);
        game.start();
        let switch = TickInput {
            switch_to: Some(WeaponKind::Sniper),
            ..Default::default()
        };
        game.tick(&switch, SIM_DT);
        assert_eq!(game.store().current_weapon(), WeaponKind::Pistol);
    }

    #[test]
    fn test_fire_and_reload() {
        let mut game = Game::new(GameConfig::default(), 1);
        game.start();

        let report = game.tick(&fire(), SIM_DT);
        assert!(report.fire.is_some_and(|f| f.fired()));
        assert!(report.shot.is_none());
        assert_eq!(game.store().ammo(WeaponKind::Pistol), 11);

        // Inside the fire interval
        let report = game.tick(&fire(), SIM_DT);
        assert_eq!(report.fire, Some(FireOutcome::CoolingDown));
        assert_eq!(game.store().ammo(WeaponKind::Pistol), 11);

        let reload = TickInput {
            reload: true,
            ..Default::default()
        };
        game.tick(&reload, SIM_DT);
        assert_eq!(game.store().ammo(WeaponKind::Pistol), 12);
    }

    #[test]
    fn test_level_shot_at_eye_height_is_a_headshot() {
        let mut config = GameConfig::default();
        config.weapons.pistol.damage = 500.0;
        let mut game = Game::new(config, 1);
        game.start();
        let id = game.spawn_enemy_at(Vec3::new(0.0, 0.0, -8.0));

        let report = game.tick(&fire(), SIM_DT);
        let shot = report.shot.unwrap();
        assert_eq!(shot.enemy_id, id);
        assert!(shot.headshot);
        assert!(shot.killed);
        assert_eq!(report.lifecycle.died, vec![id]);
        assert_eq!(game.store().coins(), 25);
        assert_eq!(game.store().kills(), 1);
    }

    #[test]
    fn test_toggle_view() {
        let mut game = Game::new(GameConfig::default(), 1);
        game.start();
        let toggle = TickInput {
            toggle_view: true,
            ..Default::default()
        };
        game.tick(&toggle, SIM_DT);
        assert_eq!(game.store().state().view_mode, ViewMode::ThirdPerson);
    }

    #[test]
    fn test_death_ends_round() {
        let mut game = Game::new(GameConfig::default(), 3);
        let kinds = record_kinds(&mut game);
        game.start();
        game.spawn_enemy_at(Vec3::new(0.0, 0.0, -1.0));

        let mut ended = false;
        for _ in 0..(60 * 30) {
            if game.tick(&TickInput::default(), SIM_DT).game_over {
                ended = true;
                break;
            }
        }
        assert!(ended);
        assert!(!game.is_running());
        assert!(!game.spawner().is_active());
        assert_eq!(game.store().health(), 0.0);

        let kinds = kinds.borrow();
        assert_eq!(kinds.iter().filter(|k| **k == EventKind::PlayerDied).count(), 1);
        assert_eq!(kinds.last(), Some(&EventKind::GameOver));

        // Dead rounds stay over until restarted
        assert!(!game.tick(&TickInput::default(), SIM_DT).advanced);
        assert!(!game.start());
    }

    #[test]
    fn test_round_with_kills_is_recorded() {
        let mut config = GameConfig::default();
        config.weapons.pistol.damage = 500.0;
        let mut game = Game::new(config, 3);
        game.start();
        game.spawn_enemy_at(Vec3::new(0.0, 0.0, -8.0));
        game.tick(&fire(), SIM_DT);
        game.spawn_enemy_at(Vec3::new(0.0, 0.0, -1.0));

        while !game.tick(&TickInput::default(), SIM_DT).game_over {}
        let best = game.records().best().unwrap();
        assert_eq!(best.kills, 1);
        assert_eq!(best.headshots, 1);
        assert!(best.survived > 0.0);
    }

    #[test]
    fn test_finish_records_running_round() {
        let mut config = GameConfig::default();
        config.weapons.pistol.damage = 500.0;
        let mut game = Game::new(config, 3);
        let kinds = record_kinds(&mut game);
        assert!(!game.finish());

        game.start();
        game.spawn_enemy_at(Vec3::new(0.0, 0.0, -8.0));
        game.tick(&fire(), SIM_DT);
        for _ in 0..30 {
            game.tick(&TickInput::default(), SIM_DT);
        }
        // A stop/start pair does not restart the round clock
        game.stop();
        assert!(game.start());
        for _ in 0..30 {
            game.tick(&TickInput::default(), SIM_DT);
        }

        assert!(game.finish());
        assert!(!game.is_running());
        assert!(!game.finish());
        let best = game.records().best().unwrap();
        assert_eq!(best.kills, 1);
        assert!((best.survived - game.time()).abs() < 1e-4);
        assert!(best.survived > 60.0 * SIM_DT);
        let over = kinds
            .borrow()
            .iter()
            .filter(|k| **k == EventKind::GameOver)
            .count();
        assert_eq!(over, 1);
    }

    #[test]
    fn test_restart_resets_world() {
        let mut config = GameConfig::default();
        config.weapons.pistol.damage = 500.0;
        let mut game = Game::new(config, 5);
        game.start();
        game.spawn_enemy_at(Vec3::new(0.0, 0.0, -8.0));
        game.spawn_enemy_at(Vec3::new(10.0, 0.0, 0.0));
        game.tick(&fire(), SIM_DT);
        assert_eq!(game.store().kills(), 1);

        let kinds = record_kinds(&mut game);
        game.restart();
        assert!(game.is_running());
        assert_eq!(game.store().kills(), 0);
        assert_eq!(game.store().coins(), 0);
        assert!(game.spawner().is_empty());
        assert!(game.effects().is_empty());
        assert_eq!(game.time_ticks(), 0);
        assert_eq!(
            *kinds.borrow(),
            vec![EventKind::GameRestarted, EventKind::GameStarted]
        );
    }

    #[test]
    fn test_update_runs_fixed_substeps() {
        let mut game = Game::new(GameConfig::default(), 1);
        game.start();

        let reports = game.update(&fire(), SIM_DT * 3.5);
        assert_eq!(reports.len(), 3);
        assert_eq!(game.time_ticks(), 3);
        // Leftover half step carries into the next frame
        assert_eq!(game.update(&TickInput::default(), SIM_DT * 0.6).len(), 1);

        // Long frames are clamped
        let reports = game.update(&TickInput::default(), 5.0);
        assert!(reports.len() <= MAX_SUBSTEPS as usize);
    }

    #[test]
    fn test_one_shot_inputs_apply_once_per_frame() {
        let mut game = Game::new(GameConfig::default(), 1);
        game.start();
        let toggle = TickInput {
            toggle_view: true,
            ..Default::default()
        };
        game.update(&toggle, SIM_DT * 4.0);
        assert_eq!(game.store().state().view_mode, ViewMode::ThirdPerson);
    }

    #[test]
    fn test_determinism() {
        // Two games with the same seed and inputs end up identical
        let mut game1 = Game::new(GameConfig::default(), 99999);
        let mut game2 = Game::new(GameConfig::default(), 99999);
        game1.start();
        game2.start();

        let inputs = [
            TickInput {
                look: Vec2::new(0.3, 0.0),
                move_dir: Vec2::new(0.0, 1.0),
                ..Default::default()
            },
            fire(),
            TickInput {
                look: Vec2::new(-0.1, 0.05),
                jump: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for i in 0..(60 * 20) {
            let input = &inputs[i % inputs.len()];
            let a = game1.tick(input, SIM_DT);
            let b = game2.tick(input, SIM_DT);
            assert_eq!(a, b);
        }

        assert_eq!(game1.store().snapshot(), game2.store().snapshot());
        assert_eq!(game1.player(), game2.player());
        assert_eq!(game1.spawner().len(), game2.spawner().len());
        for (a, b) in game1.spawner().enemies().iter().zip(game2.spawner().enemies()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.position, b.position);
            assert_eq!(a.health, b.health);
        }
    }
}
