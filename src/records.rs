//! Round leaderboard
//!
//! Tracks the best rounds by kills and persists them as JSON on disk.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Difficulty;
use crate::consts::MAX_ROUND_RECORDS;
use crate::error::Result;

/// One finished round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub kills: u32,
    pub headshots: u32,
    /// Coins held when the round ended
    pub coins: u32,
    /// Simulated seconds survived
    pub survived: f32,
    pub difficulty: Difficulty,
}

impl RoundRecord {
    /// Strictly better than `other` (kills, then coins)
    fn beats(&self, other: &RoundRecord) -> bool {
        (self.kills, self.coins) > (other.kills, other.coins)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundRecords {
    pub entries: Vec<RoundRecord>,
}

impl RoundRecords {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Would this round make the board
    pub fn qualifies(&self, record: &RoundRecord) -> bool {
        if record.kills == 0 {
            return false;
        }
        if self.entries.len() < MAX_ROUND_RECORDS {
            return true;
        }
        self.entries.last().is_none_or(|last| record.beats(last))
    }

    /// 1-indexed rank the round would take, if it qualifies
    pub fn potential_rank(&self, record: &RoundRecord) -> Option<usize> {
        if !self.qualifies(record) {
            return None;
        }
        let pos = self.entries.iter().position(|e| record.beats(e));
        Some(pos.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a round; ties rank below earlier rounds. Returns the rank.
    pub fn add_round(&mut self, record: RoundRecord) -> Option<usize> {
        let rank = self.potential_rank(&record)?;
        self.entries.insert(rank - 1, record);
        self.entries.truncate(MAX_ROUND_RECORDS);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn best(&self) -> Option<&RoundRecord> {
        self.entries.first()
    }

    /// Load from disk; a missing file is an empty board
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No round records at {}, starting fresh", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };
        let records: RoundRecords = serde_json::from_str(&json)?;
        log::info!("Loaded {} round records", records.entries.len());
        Ok(records)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Round records saved ({} entries)", self.entries.len());
        Ok(())
    }
}
