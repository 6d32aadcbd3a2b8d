//! Dead Sector entry point
//!
//! Runs one headless round with a simple aim bot driving the inputs, then
//! records the result on the round leaderboard.
//!
//! Environment:
//! - `DEAD_SECTOR_CONFIG`: JSON balance file (defaults otherwise)
//! - `DEAD_SECTOR_DIFFICULTY`: `easy` / `normal` / `hard`
//! - `DEAD_SECTOR_SEED`: round seed
//! - `DEAD_SECTOR_SECONDS`: simulated time limit
//! - `DEAD_SECTOR_RECORDS`: leaderboard file (default `dead_sector_records.json`)

use std::env;

use glam::{Vec2, Vec3};

use dead_sector::consts::SIM_DT;
use dead_sector::sim::{
    ArmorTier, EventKind, Game, GameEvent, ShopItem, StaticBarrier, TickInput, WeaponKind,
};
use dead_sector::{Difficulty, GameConfig, RoundRecords};

const DEFAULT_SEED: u64 = 0x5EC7_0B;
const DEFAULT_SECONDS: f32 = 180.0;
const DEFAULT_RECORDS: &str = "dead_sector_records.json";

fn main() {
    env_logger::init();
    log::info!("Dead Sector (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config() -> dead_sector::error::Result<GameConfig> {
    let mut config = match env::var("DEAD_SECTOR_CONFIG") {
        Ok(path) => GameConfig::load(path)?,
        Err(_) => GameConfig::default(),
    };
    if let Ok(name) = env::var("DEAD_SECTOR_DIFFICULTY") {
        match Difficulty::from_str(&name) {
            Some(d) => config.difficulty = d,
            None => log::warn!(
                "Unknown difficulty '{}', keeping {}",
                name,
                config.difficulty.as_str()
            ),
        }
    }
    Ok(config)
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// A few crates and walls around the spawn point
fn arena() -> Vec<StaticBarrier> {
    vec![
        StaticBarrier::new(Vec3::new(6.0, 0.0, 6.0), 0.0, 2.0, 2.0),
        StaticBarrier::new(Vec3::new(-8.0, 0.0, 4.0), 0.6, 1.5, 1.5),
        StaticBarrier::new(Vec3::new(0.0, 0.0, 18.0), 0.0, 12.0, 1.0),
        StaticBarrier::new(Vec3::new(-15.0, 0.0, -12.0), 1.2, 8.0, 1.0),
    ]
}

fn run() -> dead_sector::error::Result<()> {
    let config = load_config()?;
    let seed = env_or("DEAD_SECTOR_SEED", DEFAULT_SEED);
    let seconds = env_or("DEAD_SECTOR_SECONDS", DEFAULT_SECONDS);
    let records_path =
        env::var("DEAD_SECTOR_RECORDS").unwrap_or_else(|_| DEFAULT_RECORDS.to_string());

    let records = RoundRecords::load(&records_path)?;
    let mut game = Game::new(config, seed)
        .with_barriers(arena())
        .with_records(records);

    game.store_mut()
        .events_mut()
        .subscribe(EventKind::EnemyHeadshot, |event, _| {
            if let GameEvent::EnemyHeadshot { kills } = event {
                log::info!("Headshot! ({} kills)", kills);
            }
            Ok(())
        });
    game.store_mut()
        .events_mut()
        .subscribe(EventKind::ItemPurchased, |event, _| {
            if let GameEvent::ItemPurchased { item, coins_left, .. } = event {
                log::info!("Bought {:?}, {} coins left", item, coins_left);
            }
            Ok(())
        });

    game.start();
    let max_ticks = (seconds / SIM_DT) as u64;
    while game.is_running() && game.time_ticks() < max_ticks {
        shop_if_rich(&mut game);
        let input = bot_input(&game);
        if game.tick(&input, SIM_DT).game_over {
            break;
        }
    }
    if game.is_running() {
        log::info!("Time limit reached");
        game.finish();
    }

    let stats = &game.store().state().player;
    log::info!(
        "Round summary: {} kills ({} headshots), {} coins, {:.0} health, {:.1}s",
        stats.kills,
        stats.headshots,
        stats.coins,
        stats.health,
        game.time()
    );
    game.records().save(&records_path)?;
    Ok(())
}

/// Spend coins between fights: open the shop, buy, close it again
fn shop_if_rich(game: &mut Game) {
    let wish = [
        ShopItem::Weapon(WeaponKind::Rifle),
        ShopItem::Armor(ArmorTier::Light),
        ShopItem::Weapon(WeaponKind::Sniper),
    ];
    let store = game.store();
    let Some(item) = wish.into_iter().find(|item| match item {
        ShopItem::Weapon(kind) => !store.owns(*kind),
        _ => store.armor() <= 0.0,
    }) else {
        return;
    };
    if store.coins() < item.price(game.config()) || game.spawner().living_count() > 0 {
        return;
    }

    let toggle = TickInput {
        toggle_shop: true,
        ..Default::default()
    };
    game.tick(&toggle, SIM_DT);
    let bought = game.purchase(item).is_ok();
    game.tick(&toggle, SIM_DT);
    if bought {
        if let ShopItem::Weapon(kind) = item {
            game.tick(
                &TickInput {
                    switch_to: Some(kind),
                    ..Default::default()
                },
                SIM_DT,
            );
        }
    }
}

/// Turn toward the nearest living hostile's head and fire when lined up
fn bot_input(game: &Game) -> TickInput {
    let mut input = TickInput::default();
    let store = game.store();
    let weapon = store.current_weapon();
    if store.ammo(weapon) == 0 {
        input.reload = true;
        return input;
    }

    let player = game.player();
    let eye = player.view_origin(&game.config().player);
    let Some(target) = game.spawner().living().min_by(|a, b| {
        a.distance_to(eye)
            .partial_cmp(&b.distance_to(eye))
            .unwrap_or(std::cmp::Ordering::Equal)
    }) else {
        return input;
    };

    let head = target.position + Vec3::Y * game.config().enemy.head_height;
    let to_head = head - eye;
    let flat = Vec2::new(to_head.x, to_head.z);
    let yaw = dead_sector::yaw_toward(to_head);
    let pitch = to_head.y.atan2(flat.length());

    let delta = Vec2::new(dead_sector::normalize_angle(yaw - player.yaw), pitch - player.pitch);
    input.look = delta;
    input.fire = delta.length() < 0.02;
    input
}
