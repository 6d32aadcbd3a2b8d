//! Between-wave shop: weapons, armor tiers and ammo refills bought with coins

use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::state::GameStateStore;
use super::weapon::{Arsenal, WeaponKind};
use crate::config::GameConfig;

/// Armor tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorTier {
    Light,
    Heavy,
}

/// Anything the shop sells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShopItem {
    Weapon(WeaponKind),
    Armor(ArmorTier),
    /// Refill every owned magazine
    AmmoRefill,
}

/// Why a purchase did not go through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseFailure {
    InsufficientFunds { price: u32, coins: u32 },
    AlreadyOwned,
    /// Shop is closed while a round is running
    ShopClosed,
}

impl ShopItem {
    pub fn price(&self, config: &GameConfig) -> u32 {
        match self {
            ShopItem::Weapon(kind) => config.weapons.spec(*kind).price,
            ShopItem::Armor(tier) => config.armor.spec(*tier).price,
            ShopItem::AmmoRefill => config.ammo_refill_price,
        }
    }

    /// Full catalogue in display order
    pub fn catalogue() -> Vec<ShopItem> {
        WeaponKind::ALL
            .into_iter()
            .filter(|k| *k != WeaponKind::Pistol)
            .map(ShopItem::Weapon)
            .chain([ShopItem::Armor(ArmorTier::Light), ShopItem::Armor(ArmorTier::Heavy)])
            .chain(std::iter::once(ShopItem::AmmoRefill))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Shop<'a> {
    config: &'a GameConfig,
}

impl<'a> Shop<'a> {
    pub fn new(config: &'a GameConfig) -> Self {
        Self { config }
    }

    /// Buy `item`. Publishes `ItemPurchased` or `PurchaseFailed`.
    pub fn purchase(
        &self,
        store: &mut GameStateStore,
        arsenal: &mut Arsenal,
        item: ShopItem,
    ) -> Result<(), PurchaseFailure> {
        let result = self.try_purchase(store, arsenal, item);
        match result {
            Ok(price) => {
                log::info!("Purchased {:?} for {}", item, price);
                let coins_left = store.coins();
                store.publish(GameEvent::ItemPurchased {
                    item,
                    price,
                    coins_left,
                });
                Ok(())
            }
            Err(reason) => {
                log::debug!("Purchase of {:?} failed: {:?}", item, reason);
                store.publish(GameEvent::PurchaseFailed { item, reason });
                Err(reason)
            }
        }
    }

    fn try_purchase(
        &self,
        store: &mut GameStateStore,
        arsenal: &mut Arsenal,
        item: ShopItem,
    ) -> Result<u32, PurchaseFailure> {
        if store.is_playing() && !store.is_shop_open() {
            return Err(PurchaseFailure::ShopClosed);
        }
        if let ShopItem::Weapon(kind) = item {
            if store.owns(kind) {
                return Err(PurchaseFailure::AlreadyOwned);
            }
        }

        let price = item.price(self.config);
        if !store.spend_coins(price) {
            return Err(PurchaseFailure::InsufficientFunds {
                price,
                coins: store.coins(),
            });
        }

        match item {
            ShopItem::Weapon(kind) => {
                store.grant_weapon(kind);
                arsenal.add(kind, &self.config.weapons);
            }
            ShopItem::Armor(tier) => {
                let spec = self.config.armor.spec(tier);
                store.add_armor(spec.points, spec.health_bonus);
            }
            ShopItem::AmmoRefill => {
                let owned: Vec<_> = store.state().weapons.owned.iter().copied().collect();
                for kind in owned {
                    store.reload_weapon(kind);
                }
            }
        }
        Ok(price)
    }
}
