//! Data-driven game balance
//!
//! Immutable archetype tables. Everything here is read-only after startup.

use serde::{Deserialize, Serialize};

/// Base stats shared by every instance of one enemy or boss kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeStats {
    pub hp: f32,
    pub size: f32,
    pub speed: f32,
    /// Contact damage (also used for ranged shots by regular enemies)
    pub damage: f32,
    pub gold: u32,
    /// Render-only tint (0xRRGGBB)
    pub color: u32,
}

/// Regular enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Croissant,
    AngryCup,
    MilkBlob,
    Drone,
}

/// Draw order for the generator; later floors unlock later entries
pub const ENEMY_POOL: [EnemyKind; 4] = [
    EnemyKind::Croissant,
    EnemyKind::MilkBlob,
    EnemyKind::AngryCup,
    EnemyKind::Drone,
];

impl EnemyKind {
    pub fn stats(self) -> ArchetypeStats {
        match self {
            EnemyKind::Croissant => ArchetypeStats {
                hp: 60.0,
                size: 18.0,
                speed: 1.5,
                damage: 15.0,
                gold: 3,
                color: 0xD4A03A,
            },
            EnemyKind::AngryCup => ArchetypeStats {
                hp: 80.0,
                size: 22.0,
                speed: 1.0,
                damage: 20.0,
                gold: 5,
                color: 0x8B4513,
            },
            EnemyKind::MilkBlob => ArchetypeStats {
                hp: 40.0,
                size: 16.0,
                speed: 2.0,
                damage: 10.0,
                gold: 2,
                color: 0xF5F5DC,
            },
            EnemyKind::Drone => ArchetypeStats {
                hp: 50.0,
                size: 14.0,
                speed: 2.5,
                damage: 12.0,
                gold: 4,
                color: 0x708090,
            },
        }
    }

    /// Whether this kind shoots at the player
    pub fn is_ranged(self) -> bool {
        matches!(self, EnemyKind::AngryCup | EnemyKind::Drone)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnemyKind::Croissant => "croissant",
            EnemyKind::AngryCup => "angry_cup",
            EnemyKind::MilkBlob => "milk_blob",
            EnemyKind::Drone => "drone",
        }
    }
}

/// Boss kinds, one per floor in rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossKind {
    Grinder,
    SteamKing,
    OverflowingPot,
}

pub const BOSS_ROTATION: [BossKind; 3] =
    [BossKind::Grinder, BossKind::SteamKing, BossKind::OverflowingPot];

impl BossKind {
    /// Boss guarding the given floor
    pub fn for_floor(floor: u32) -> Self {
        BOSS_ROTATION[floor as usize % BOSS_ROTATION.len()]
    }

    pub fn stats(self) -> ArchetypeStats {
        match self {
            BossKind::Grinder => ArchetypeStats {
                hp: 600.0,
                size: 40.0,
                speed: 1.4,
                damage: 25.0,
                gold: 40,
                color: 0x4A4A4A,
            },
            BossKind::SteamKing => ArchetypeStats {
                hp: 500.0,
                size: 38.0,
                speed: 0.0,
                damage: 20.0,
                gold: 45,
                color: 0xDDE6F0,
            },
            BossKind::OverflowingPot => ArchetypeStats {
                hp: 700.0,
                size: 45.0,
                speed: 0.0,
                damage: 30.0,
                gold: 50,
                color: 0x5C3D2E,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BossKind::Grinder => "grinder",
            BossKind::SteamKing => "steam_king",
            BossKind::OverflowingPot => "overflowing_pot",
        }
    }
}

/// HP multiplier applied to every enemy and boss on a floor
#[inline]
pub fn floor_multiplier(floor: u32) -> f32 {
    1.0 + 0.5 * floor as f32
}

/// Permanent upgrades purchasable in the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    MaxHp,
    Damage,
    Speed,
    DashCdr,
}

/// Shop listing for one permanent upgrade
#[derive(Debug, Clone, Copy)]
pub struct ShopItem {
    pub kind: UpgradeKind,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: u64,
    pub max_level: u32,
}

pub const SHOP_ITEMS: [ShopItem; 4] = [
    ShopItem {
        kind: UpgradeKind::MaxHp,
        name: "Caneca Grande",
        description: "+25 max HP",
        cost: 15,
        max_level: 5,
    },
    ShopItem {
        kind: UpgradeKind::Damage,
        name: "Grãos Fortes",
        description: "+10% damage",
        cost: 20,
        max_level: 5,
    },
    ShopItem {
        kind: UpgradeKind::Speed,
        name: "Cafeína Extra",
        description: "+10% move speed",
        cost: 15,
        max_level: 3,
    },
    ShopItem {
        kind: UpgradeKind::DashCdr,
        name: "Espresso Duplo",
        description: "-15% dash cooldown",
        cost: 25,
        max_level: 3,
    },
];

impl UpgradeKind {
    pub fn shop_item(self) -> &'static ShopItem {
        SHOP_ITEMS
            .iter()
            .find(|item| item.kind == self)
            .unwrap_or_else(|| unreachable!("every upgrade kind has a shop listing"))
    }
}
