use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bip39::{Language, Mnemonic};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey};
use zeroize::Zeroizing;

use super::derivation::{derive_path, SUI_DERIVATION_PATH};
use crate::domain::SuiAddress;
use crate::error::{ClaimerError, Result};
use crate::transaction::TransactionData;

type Blake2b256 = Blake2b<U32>;

/// Signature scheme flag for Ed25519 in Sui addresses and signatures.
const ED25519_FLAG: u8 = 0x00;

/// Intent prefix for transaction data: scope TransactionData, version V0, app Sui.
const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

pub(crate) fn blake2b256(chunks: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Transaction bytes plus the serialized signature the node expects
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub tx_bytes: Vec<u8>,
    /// base64(`flag || signature || public key`)
    pub signature: String,
}

/// Ed25519 Sui account derived from a mnemonic phrase
///
/// # Security
/// The phrase and intermediate seed material are zeroized after derivation;
/// only the signing key is kept.
#[derive(Clone)]
pub struct Wallet {
    signing_key: SigningKey,
    address: SuiAddress,
}

impl Wallet {
    /// Derive the default account (`m/44'/784'/0'/0'/0'`) of a BIP-39 phrase
    pub fn from_mnemonic(phrase: &str) -> Result<Self> {
        let normalized = Zeroizing::new(
            phrase
                .split_whitespace()
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
                .join(" "),
        );

        let mnemonic = Mnemonic::parse_in(Language::English, normalized.as_str())
            .map_err(|e| ClaimerError::Wallet(format!("Invalid mnemonic phrase: {}", e)))?;
        let seed = Zeroizing::new(mnemonic.to_seed(""));

        let node = derive_path(&seed[..], &SUI_DERIVATION_PATH)?;
        Ok(Self::from_secret_key(&node.key))
    }

    pub fn from_secret_key(secret: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(secret);
        let public_key = signing_key.verifying_key().to_bytes();
        let address = SuiAddress::new(blake2b256(&[&[ED25519_FLAG], &public_key]));
        Self {
            signing_key,
            address,
        }
    }

    /// Get the wallet address
    pub fn address(&self) -> SuiAddress {
        self.address
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign BCS transaction bytes under the transaction intent
    pub fn sign_transaction_bytes(&self, tx_bytes: &[u8]) -> String {
        let digest = blake2b256(&[&TRANSACTION_INTENT, tx_bytes]);
        let signature = self.signing_key.sign(&digest);

        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(&self.public_key());
        BASE64.encode(serialized)
    }

    pub fn sign_transaction(&self, data: &TransactionData) -> Result<SignedTransaction> {
        if data.sender() != self.address {
            return Err(ClaimerError::Signature(format!(
                "transaction sender {} does not match wallet {}",
                data.sender(),
                self.address
            )));
        }
        let tx_bytes = data.to_bytes()?;
        let signature = self.sign_transaction_bytes(&tx_bytes);
        Ok(SignedTransaction {
            tx_bytes,
            signature,
        })
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish()
    }
}
