//! Static reward schedule for the fishing game.
//!
//! Every multiplier is an integer scaled by [`SCALE`] (four implied decimal digits).

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use super::de::u64_lenient;
use crate::error::{ClaimerError, Result};

/// Fixed-point scale shared by all schedule multipliers.
pub const SCALE: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoatLevel {
    /// Hours per full fishing cycle, scaled by 10,000.
    #[serde(deserialize_with = "u64_lenient")]
    pub fishing_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshLevel {
    #[serde(deserialize_with = "u64_lenient")]
    pub speed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishTypeLevel {
    #[serde(deserialize_with = "u64_lenient")]
    pub rate: u64,
}

/// Which clock a special boost window is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoostKind {
    /// Window starts at the boost's own `start_time` for every player.
    Global,
    /// Window starts at the player's `special_boost_start_time`.
    PerAccount,
}

impl<'de> Deserialize<'de> for BoostKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match u64_lenient(deserializer)? {
            0 => Ok(BoostKind::Global),
            1 => Ok(BoostKind::PerAccount),
            other => Err(serde::de::Error::custom(format!(
                "unknown special boost type {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialBoost {
    #[serde(rename = "type")]
    pub kind: BoostKind,
    /// Reward multiplier, scaled by 10,000.
    #[serde(deserialize_with = "u64_lenient")]
    pub rate: u64,
    /// Window start in ms since epoch; only meaningful for [`BoostKind::Global`].
    #[serde(default, deserialize_with = "u64_lenient")]
    pub start_time: u64,
    /// Window length in ms.
    #[serde(deserialize_with = "u64_lenient")]
    pub duration: u64,
}

impl SpecialBoost {
    /// Inclusive `[start, start + duration]` window check.
    pub fn is_active(&self, window_start: u64, now_ms: u64) -> bool {
        now_ms >= window_start && now_ms <= window_start.saturating_add(self.duration)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSchedule {
    /// Reward granted before the player has any record, in base units (9 decimals).
    #[serde(deserialize_with = "u64_lenient")]
    pub init_reward: u64,
    pub boat_level: Vec<BoatLevel>,
    pub mesh_level: Vec<MeshLevel>,
    pub fish_type_level: Vec<FishTypeLevel>,
    #[serde(default)]
    pub special_boost: Vec<SpecialBoost>,
}

impl RewardSchedule {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| ClaimerError::Schedule(format!("malformed reward schedule: {}", e)))
    }

    /// Load the schedule document.
    ///
    /// A missing file yields `None`, which the reward calculator treats as
    /// "nothing claimable". A file that exists but doesn't parse is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Reward schedule {} not found", path.display());
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)?;
        let schedule = Self::from_json(&raw)?;
        debug!(
            "Loaded reward schedule: {} boat, {} mesh, {} fish type levels, {} boosts",
            schedule.boat_level.len(),
            schedule.mesh_level.len(),
            schedule.fish_type_level.len(),
            schedule.special_boost.len()
        );
        Ok(Some(schedule))
    }

    pub fn boat(&self, index: u64) -> Result<&BoatLevel> {
        lookup(&self.boat_level, "boatLevel", index)
    }

    pub fn mesh(&self, index: u64) -> Result<&MeshLevel> {
        lookup(&self.mesh_level, "meshLevel", index)
    }

    pub fn fish_type(&self, index: u64) -> Result<&FishTypeLevel> {
        lookup(&self.fish_type_level, "fishTypeLevel", index)
    }

    pub fn boost(&self, index: u64) -> Result<&SpecialBoost> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.special_boost.get(i))
            .ok_or(ClaimerError::BoostOutOfRange {
                index,
                len: self.special_boost.len(),
            })
    }
}

fn lookup<'a, T>(table: &'a [T], name: &'static str, index: u64) -> Result<&'a T> {
    usize::try_from(index)
        .ok()
        .and_then(|i| table.get(i))
        .ok_or(ClaimerError::LevelOutOfRange {
            table: name,
            index,
            len: table.len(),
        })
}
