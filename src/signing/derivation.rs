//! SLIP-0010 Ed25519 key derivation from a BIP-39 seed.
//!
//! Ed25519 only supports hardened children, so every path segment is hardened.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::error::{ClaimerError, Result};

type HmacSha512 = Hmac<Sha512>;

const HARDENED_OFFSET: u32 = 0x8000_0000;
const MASTER_KEY_SALT: &[u8] = b"ed25519 seed";

/// Sui's default Ed25519 account path: m/44'/784'/0'/0'/0'
pub const SUI_DERIVATION_PATH: [u32; 5] = [44, 784, 0, 0, 0];

/// Secret key and chain code at one node of the derivation tree
pub struct ExtendedKey {
    pub key: Zeroizing<[u8; 32]>,
    pub chain_code: Zeroizing<[u8; 32]>,
}

fn hmac_split(key: &[u8], data: &[&[u8]]) -> Result<ExtendedKey> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| ClaimerError::Wallet(format!("HMAC init failed: {}", e)))?;
    for chunk in data {
        mac.update(chunk);
    }
    let mut output = Zeroizing::new([0u8; 64]);
    output.copy_from_slice(&mac.finalize().into_bytes());

    let mut secret = Zeroizing::new([0u8; 32]);
    let mut chain_code = Zeroizing::new([0u8; 32]);
    secret.copy_from_slice(&output[..32]);
    chain_code.copy_from_slice(&output[32..]);
    Ok(ExtendedKey {
        key: secret,
        chain_code,
    })
}

pub fn master_key(seed: &[u8]) -> Result<ExtendedKey> {
    hmac_split(MASTER_KEY_SALT, &[seed])
}

/// Hardened child `index'` of `parent`.
pub fn derive_child(parent: &ExtendedKey, index: u32) -> Result<ExtendedKey> {
    let hardened = (index | HARDENED_OFFSET).to_be_bytes();
    hmac_split(
        &parent.chain_code[..],
        &[&[0u8], &parent.key[..], &hardened],
    )
}

pub fn derive_path(seed: &[u8], path: &[u32]) -> Result<ExtendedKey> {
    let mut node = master_key(seed)?;
    for index in path {
        node = derive_child(&node, *index)?;
    }
    Ok(node)
}
