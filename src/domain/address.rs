use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ClaimerError;

pub const SUI_ADDRESS_LENGTH: usize = 32;

/// 32-byte Sui account address. Object IDs share the same representation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuiAddress([u8; SUI_ADDRESS_LENGTH]);

pub type ObjectId = SuiAddress;

/// `0x2`, home of the native coin and the coin module.
pub const SUI_FRAMEWORK_ADDRESS: SuiAddress = {
    let mut bytes = [0u8; SUI_ADDRESS_LENGTH];
    bytes[SUI_ADDRESS_LENGTH - 1] = 2;
    SuiAddress::new(bytes)
};

impl SuiAddress {
    pub const ZERO: Self = Self([0u8; SUI_ADDRESS_LENGTH]);

    pub const fn new(bytes: [u8; SUI_ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SUI_ADDRESS_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for SuiAddress {
    type Err = ClaimerError;

    /// Accepts `0x`-prefixed or bare hex; short forms like `0x6` are left-padded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > SUI_ADDRESS_LENGTH * 2 {
            return Err(ClaimerError::Validation(format!(
                "invalid Sui address length: {}",
                s
            )));
        }

        let padded = format!("{:0>64}", digits);
        let decoded = hex::decode(&padded)
            .map_err(|e| ClaimerError::Validation(format!("invalid Sui address {}: {}", s, e)))?;

        let mut bytes = [0u8; SUI_ADDRESS_LENGTH];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SuiAddress({})", self.to_hex())
    }
}

// Human-readable formats (JSON, TOML) carry the hex string; BCS carries the raw 32 bytes.
impl Serialize for SuiAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for SuiAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            let bytes = <[u8; SUI_ADDRESS_LENGTH]>::deserialize(deserializer)?;
            Ok(Self(bytes))
        }
    }
}
