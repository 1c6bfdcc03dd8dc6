use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::address::{ObjectId, SUI_FRAMEWORK_ADDRESS};
use super::de::u64_lenient;
use crate::error::ClaimerError;

/// Coin type of the chain's native currency.
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// True for every spelling of the native coin type (`0x2::sui::SUI`, zero-padded forms).
pub fn is_native_coin(coin_type: &str) -> bool {
    let Some((address, rest)) = coin_type.split_once("::") else {
        return false;
    };
    rest == "sui::SUI"
        && address
            .parse::<ObjectId>()
            .map(|id| id == SUI_FRAMEWORK_ADDRESS)
            .unwrap_or(false)
}

/// 32-byte object digest. Base58 in JSON, length-prefixed bytes in BCS.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectDigest([u8; 32]);

impl ObjectDigest {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_base58(s: &str) -> Result<Self, ClaimerError> {
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|e| ClaimerError::Validation(format!("invalid digest {}: {}", s, e)))?;
        let bytes: [u8; 32] = decoded.try_into().map_err(|v: Vec<u8>| {
            ClaimerError::Validation(format!("digest must be 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(bytes))
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl fmt::Debug for ObjectDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectDigest({})", self.to_base58())
    }
}

impl Serialize for ObjectDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base58())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for ObjectDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_base58(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = Vec::<u8>::deserialize(deserializer)?;
            let bytes: [u8; 32] = bytes
                .try_into()
                .map_err(|_| serde::de::Error::custom("digest must be 32 bytes"))?;
            Ok(Self(bytes))
        }
    }
}

/// `(id, version, digest)` reference to an owned object at a specific version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: u64,
    pub digest: ObjectDigest,
}

/// One coin object as returned by the coin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinObject {
    pub coin_object_id: ObjectId,
    #[serde(deserialize_with = "u64_lenient")]
    pub version: u64,
    pub digest: ObjectDigest,
    #[serde(deserialize_with = "u64_lenient")]
    pub balance: u64,
}

impl CoinObject {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            object_id: self.coin_object_id,
            version: self.version,
            digest: self.digest,
        }
    }
}

/// One page of a cursor-driven coin listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPage {
    pub data: Vec<CoinObject>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}
