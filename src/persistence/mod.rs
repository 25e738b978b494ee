//! Meta-progression persistence
//!
//! Features:
//! - Versioned JSON save record (gold bank + permanent upgrade levels)
//! - Upgrade shop purchases
//! - Slot-keyed stores: in-memory, and one JSON file per slot on native
//! - Corrupt records fall back to a fresh save

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::sim::{Phase, RunState, Upgrades};
use crate::tuning::UpgradeKind;

/// Current save record layout
pub const SAVE_VERSION: u32 = 1;

/// Slot used when the shell doesn't pick one
pub const DEFAULT_SLOT: &str = "brew_dungeon_save";

#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("{0:?} is already at max level")]
    MaxLevel(UpgradeKind),

    #[error("need {cost} gold, have {have}")]
    InsufficientGold { cost: u64, have: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("corrupt save record: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("unsupported save version {0}")]
    Version(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything that survives between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveRecord {
    pub version: u32,
    /// Banked gold
    pub gold: u64,
    pub upgrades: Upgrades,
    pub runs_played: u32,
    pub victories: u32,
}

impl Default for SaveRecord {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            gold: 0,
            upgrades: Upgrades::default(),
            runs_played: 0,
            victories: 0,
        }
    }
}

impl SaveRecord {
    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let record: Self = serde_json::from_str(json)?;
        if record.version > SAVE_VERSION {
            return Err(SaveError::Version(record.version));
        }
        Ok(record)
    }

    /// Price of the next level of `kind`, or None when maxed
    pub fn next_cost(&self, kind: UpgradeKind) -> Option<u64> {
        let item = kind.shop_item();
        let level = self.upgrades.level(kind);
        (level < item.max_level).then_some(item.cost)
    }

    /// Buy one level of an upgrade; returns the new level
    pub fn buy_upgrade(&mut self, kind: UpgradeKind) -> Result<u32, ShopError> {
        let cost = self.next_cost(kind).ok_or(ShopError::MaxLevel(kind))?;
        if self.gold < cost {
            return Err(ShopError::InsufficientGold { cost, have: self.gold });
        }

        self.gold -= cost;
        let level = self.upgrades.level_mut(kind);
        *level += 1;
        log::info!("Bought {} (level {})", kind.shop_item().name, *level);
        Ok(*level)
    }

    /// Bank a finished run's gold. Runs still in progress are ignored.
    pub fn fold_run(&mut self, run: &RunState) {
        if !matches!(run.phase, Phase::GameOver | Phase::Victory) {
            log::warn!("Not banking a run that is still in progress ({:?})", run.phase);
            return;
        }
        self.gold += run.gold_collected;
        self.runs_played += 1;
        if run.phase == Phase::Victory {
            self.victories += 1;
        }
        log::info!("Banked {} gold (total {})", run.gold_collected, self.gold);
    }
}

/// Slot-keyed storage for save records
pub trait SaveStore {
    fn read(&self, slot: &str) -> Result<Option<String>, SaveError>;
    fn write(&mut self, slot: &str, data: &str) -> Result<(), SaveError>;

    /// Load a slot, starting fresh if it is empty or unreadable
    fn load_or_default(&self, slot: &str) -> SaveRecord {
        let loaded = self
            .read(slot)
            .and_then(|data| data.map(|json| SaveRecord::from_json(&json)).transpose());
        match loaded {
            Ok(Some(record)) => {
                log::info!("Loaded save '{}' ({} gold)", slot, record.gold);
                record
            }
            Ok(None) => {
                log::info!("No save in '{}', starting fresh", slot);
                SaveRecord::default()
            }
            Err(e) => {
                log::warn!("Discarding save '{}': {}", slot, e);
                SaveRecord::default()
            }
        }
    }

    fn save(&mut self, slot: &str, record: &SaveRecord) -> Result<(), SaveError> {
        self.write(slot, &record.to_json()?)
    }
}

/// In-memory store (tests, headless runs)
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn read(&self, slot: &str) -> Result<Option<String>, SaveError> {
        Ok(self.slots.get(slot).cloned())
    }

    fn write(&mut self, slot: &str, data: &str) -> Result<(), SaveError> {
        self.slots.insert(slot.to_string(), data.to_string());
        Ok(())
    }
}

/// One `<slot>.json` file per slot under a directory
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, slot: &str) -> std::path::PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SaveStore for FileStore {
    fn read(&self, slot: &str) -> Result<Option<String>, SaveError> {
        match std::fs::read_to_string(self.path(slot)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, slot: &str, data: &str) -> Result<(), SaveError> {
        std::fs::create_dir_all(&self.dir)?;
        // Write then rename so a crash never leaves a half-written save
        let tmp = self.dir.join(format!("{slot}.json.tmp"));
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, self.path(slot))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_upgrade_spends_gold() {
        let mut record = SaveRecord { gold: 40, ..Default::default() };
        assert_eq!(record.buy_upgrade(UpgradeKind::Damage).unwrap(), 1);
        assert_eq!(record.gold, 20);
        assert_eq!(record.upgrades.damage_bonus, 1);
    }

    #[test]
    fn test_buy_upgrade_insufficient_gold() {
        let mut record = SaveRecord { gold: 10, ..Default::default() };
        let err = record.buy_upgrade(UpgradeKind::DashCdr).unwrap_err();
        assert!(matches!(err, ShopError::InsufficientGold { cost: 25, have: 10 }));
        assert_eq!(record.gold, 10);
        assert_eq!(record.upgrades, Upgrades::default());
    }

    #[test]
    fn test_buy_upgrade_max_level() {
        let mut record = SaveRecord { gold: 1000, ..Default::default() };
        for expected in 1..=3 {
            assert_eq!(record.buy_upgrade(UpgradeKind::Speed).unwrap(), expected);
        }
        assert!(matches!(
            record.buy_upgrade(UpgradeKind::Speed),
            Err(ShopError::MaxLevel(UpgradeKind::Speed))
        ));
        assert_eq!(record.next_cost(UpgradeKind::Speed), None);
        assert_eq!(record.gold, 1000 - 3 * 15);
    }

    #[test]
    fn test_fold_finished_run_only() {
        let mut record = SaveRecord::default();
        let mut run = RunState::new(Upgrades::default(), 3);
        run.gold_collected = 17;
        record.fold_run(&run);
        assert_eq!(record.gold, 0);

        run.phase = Phase::GameOver;
        record.fold_run(&run);
        assert_eq!(record.gold, 17);
        assert_eq!(record.runs_played, 1);
        assert_eq!(record.victories, 0);
    }

    #[test]
    fn test_store_roundtrip_by_slot() {
        let mut store = MemoryStore::new();
        let record = SaveRecord {
            gold: 99,
            upgrades: Upgrades { max_hp_bonus: 2, ..Default::default() },
            ..Default::default()
        };
        store.save("a", &record).unwrap();
        assert_eq!(store.load_or_default("a"), record);
        assert_eq!(store.load_or_default("b"), SaveRecord::default());
    }

    #[test]
    fn test_corrupt_save_falls_back() {
        let mut store = MemoryStore::new();
        store.write(DEFAULT_SLOT, "{not json").unwrap();
        assert_eq!(store.load_or_default(DEFAULT_SLOT), SaveRecord::default());

        store.write(DEFAULT_SLOT, r#"{"version": 99, "gold": 5}"#).unwrap();
        assert!(matches!(
            SaveRecord::from_json(r#"{"version": 99}"#),
            Err(SaveError::Version(99))
        ));
        assert_eq!(store.load_or_default(DEFAULT_SLOT).gold, 0);
    }

    #[test]
    fn test_partial_record_takes_defaults() {
        let record = SaveRecord::from_json(r#"{"gold": 12}"#).unwrap();
        assert_eq!(record.gold, 12);
        assert_eq!(record.upgrades, Upgrades::default());
        assert_eq!(record.version, SAVE_VERSION);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("brew_dungeon_test_{}", std::process::id()));
        let mut store = FileStore::new(&dir);
        assert!(store.read("slot").unwrap().is_none());
        let record = SaveRecord { gold: 7, ..Default::default() };
        store.save("slot", &record).unwrap();
        assert_eq!(store.load_or_default("slot"), record);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
