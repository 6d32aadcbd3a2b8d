//! Synchronous publish/subscribe hub
//!
//! Every state change leaves the simulation through here. Delivery is in
//! registration order, on the caller's stack. A handler may publish follow-up
//! events through its [`Outbox`]; those are delivered depth-first as soon as
//! that handler returns, before the next handler for the original event runs.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use super::shop::{PurchaseFailure, ShopItem};
use super::state::{StatePath, StateValue};
use super::weapon::WeaponKind;

/// Every notification the core emits, with its payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    PlayerDamaged {
        /// Raw damage before armor absorption
        amount: f32,
        health: f32,
        armor: f32,
    },
    PlayerDied,
    EnemyKilled {
        kills: u32,
    },
    EnemyHeadshot {
        kills: u32,
    },
    WeaponFired {
        weapon: WeaponKind,
        ammo_left: u32,
    },
    WeaponSwitched {
        weapon: WeaponKind,
    },
    WeaponEmpty {
        weapon: WeaponKind,
    },
    ItemPurchased {
        item: ShopItem,
        price: u32,
        coins_left: u32,
    },
    PurchaseFailed {
        item: ShopItem,
        reason: PurchaseFailure,
    },
    ArmorBroken,
    StateChanged {
        path: StatePath,
        old: StateValue,
        new: StateValue,
    },
    GameStarted,
    GameOver {
        kills: u32,
        coins: u32,
        /// Seconds of simulated time the round lasted
        survived: f32,
    },
    GameRestarted,
}

/// Subscription key: the name of an event without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EventKind {
    PlayerDamaged,
    PlayerDied,
    EnemyKilled,
    EnemyHeadshot,
    WeaponFired,
    WeaponSwitched,
    WeaponEmpty,
    ItemPurchased,
    PurchaseFailed,
    ArmorBroken,
    StateChanged,
    GameStarted,
    GameOver,
    GameRestarted,
}

impl EventKind {
    pub const ALL: [EventKind; 14] = [
        EventKind::PlayerDamaged,
        EventKind::PlayerDied,
        EventKind::EnemyKilled,
        EventKind::EnemyHeadshot,
        EventKind::WeaponFired,
        EventKind::WeaponSwitched,
        EventKind::WeaponEmpty,
        EventKind::ItemPurchased,
        EventKind::PurchaseFailed,
        EventKind::ArmorBroken,
        EventKind::StateChanged,
        EventKind::GameStarted,
        EventKind::GameOver,
        EventKind::GameRestarted,
    ];

    /// Wire name, as used by UI/audio listeners
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PlayerDamaged => "PLAYER_DAMAGED",
            EventKind::PlayerDied => "PLAYER_DIED",
            EventKind::EnemyKilled => "ENEMY_KILLED",
            EventKind::EnemyHeadshot => "ENEMY_HEADSHOT",
            EventKind::WeaponFired => "WEAPON_FIRED",
            EventKind::WeaponSwitched => "WEAPON_SWITCHED",
            EventKind::WeaponEmpty => "WEAPON_EMPTY",
            EventKind::ItemPurchased => "ITEM_PURCHASED",
            EventKind::PurchaseFailed => "PURCHASE_FAILED",
            EventKind::ArmorBroken => "ARMOR_BROKEN",
            EventKind::StateChanged => "STATE_CHANGED",
            EventKind::GameStarted => "GAME_STARTED",
            EventKind::GameOver => "GAME_OVER",
            EventKind::GameRestarted => "GAME_RESTARTED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::PlayerDamaged { .. } => EventKind::PlayerDamaged,
            GameEvent::PlayerDied => EventKind::PlayerDied,
            GameEvent::EnemyKilled { .. } => EventKind::EnemyKilled,
            GameEvent::EnemyHeadshot { .. } => EventKind::EnemyHeadshot,
            GameEvent::WeaponFired { .. } => EventKind::WeaponFired,
            GameEvent::WeaponSwitched { .. } => EventKind::WeaponSwitched,
            GameEvent::WeaponEmpty { .. } => EventKind::WeaponEmpty,
            GameEvent::ItemPurchased { .. } => EventKind::ItemPurchased,
            GameEvent::PurchaseFailed { .. } => EventKind::PurchaseFailed,
            GameEvent::ArmorBroken => EventKind::ArmorBroken,
            GameEvent::StateChanged { .. } => EventKind::StateChanged,
            GameEvent::GameStarted => EventKind::GameStarted,
            GameEvent::GameOver { .. } => EventKind::GameOver,
            GameEvent::GameRestarted => EventKind::GameRestarted,
        }
    }
}

/// Failure reported by a listener; logged and swallowed by the channel
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

pub type HandlerResult = Result<(), HandlerError>;

/// Events a handler wants published once it returns
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<GameEvent>,
}

impl Outbox {
    pub fn publish(&mut self, event: GameEvent) {
        self.pending.push(event);
    }
}

/// Token returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&GameEvent, &mut Outbox) -> HandlerResult>;

struct Subscription {
    id: SubscriptionId,
    once: bool,
    handler: Handler,
}

/// Publish/subscribe hub keyed by [`EventKind`]
#[derive(Default)]
pub struct EventChannel {
    handlers: HashMap<EventKind, Vec<Subscription>>,
    next_id: u64,
}

impl std::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts: Vec<_> = self.handlers.iter().map(|(k, v)| (*k, v.len())).collect();
        counts.sort();
        f.debug_struct("EventChannel")
            .field("handlers", &counts)
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, kind: EventKind, once: bool, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.entry(kind).or_default().push(Subscription { id, once, handler });
        id
    }

    /// Register a handler for every future `kind` event
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent, &mut Outbox) -> HandlerResult + 'static,
    {
        self.register(kind, false, Box::new(handler))
    }

    /// Register a handler that is dropped after its first invocation
    pub fn subscribe_once<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent, &mut Outbox) -> HandlerResult + 'static,
    {
        self.register(kind, true, Box::new(handler))
    }

    /// Remove a handler. Returns false if it was not registered under `kind`.
    pub fn unsubscribe(&mut self, kind: EventKind, id: SubscriptionId) -> bool {
        if let Some(subs) = self.handlers.get_mut(&kind) {
            if let Some(pos) = subs.iter().position(|s| s.id == id) {
                subs.remove(pos);
                return true;
            }
        }
        false
    }

    /// Remove every handler for `kind`, or for all kinds when `None`
    pub fn clear(&mut self, kind: Option<EventKind>) {
        match kind {
            Some(kind) => {
                self.handlers.remove(&kind);
            }
            None => self.handlers.clear(),
        }
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map(Vec::len).unwrap_or(0)
    }

    /// Deliver `event` to its handlers in registration order.
    ///
    /// While a kind is being dispatched its handlers are out of the map, so a
    /// nested publish of the same kind reaches nobody.
    pub fn publish(&mut self, event: &GameEvent) {
        let kind = event.kind();
        let Some(subs) = self.handlers.remove(&kind) else {
            return;
        };

        let mut kept = Vec::with_capacity(subs.len());
        for mut sub in subs {
            let mut outbox = Outbox::default();
            if let Err(err) = (sub.handler)(event, &mut outbox) {
                log::error!("{} handler {:?} failed: {}", kind.as_str(), sub.id, err);
            }

            if !sub.once {
                kept.push(sub);
            }

            for nested in outbox.pending {
                self.publish(&nested);
            }
        }

        if !kept.is_empty() {
            self.handlers.insert(kind, kept);
        }
    }
}
