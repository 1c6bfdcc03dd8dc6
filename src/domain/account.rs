use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::de::{opt_u64_lenient, u64_lenient};
use crate::error::{ClaimerError, Result};

/// On-chain player record, stored as a dynamic field under the game object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    #[serde(deserialize_with = "u64_lenient")]
    pub boat: u64,
    #[serde(deserialize_with = "u64_lenient")]
    pub mesh: u64,
    #[serde(deserialize_with = "u64_lenient")]
    pub seafood: u64,
    /// Last successful claim, ms since epoch.
    #[serde(deserialize_with = "u64_lenient")]
    pub last_claim: u64,
    /// Index into the schedule's special boosts. Index 0 reads as "no boost".
    #[serde(default, deserialize_with = "boost_index")]
    pub special_boost: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64_lenient")]
    pub special_boost_start_time: Option<u64>,
}

fn boost_index<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_u64_lenient(deserializer)?.filter(|index| *index != 0))
}

impl AccountState {
    /// Decode from the `content.fields` object of a player record.
    ///
    /// Plain dynamic fields wrap the record as `{name, value: {fields: {..}}}`;
    /// dynamic object fields expose the record's fields directly.
    pub fn from_fields(fields: &Value) -> Result<Self> {
        let record = fields
            .get("value")
            .and_then(|value| value.get("fields"))
            .unwrap_or(fields);

        serde_json::from_value(record.clone()).map_err(|e| {
            ClaimerError::Validation(format!("unexpected player record layout: {}", e))
        })
    }
}
