//! Local credential store.
//!
//! A JSON array of `{address, phrase}` records, written with 0o600 permissions
//! on unix since it holds recovery phrases.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::domain::SuiAddress;
use crate::error::{ClaimerError, Result};
use crate::signing::Wallet;

/// One stored account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub address: SuiAddress,
    #[serde(default)]
    pub phrase: String,
}

impl Credential {
    /// Records without a phrase can't sign and are skipped by the poller.
    pub fn has_phrase(&self) -> bool {
        !self.phrase.trim().is_empty()
    }
}

// Custom Debug to never leak the phrase into logs or error messages.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("address", &self.address)
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

/// Identifies a stored credential by position or address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSelector {
    Index(usize),
    Address(SuiAddress),
}

impl FromStr for CredentialSelector {
    type Err = ClaimerError;

    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if let Ok(index) = raw.parse::<usize>() {
            return Ok(Self::Index(index));
        }
        raw.parse::<SuiAddress>().map(Self::Address)
    }
}

#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    credentials: Vec<Credential>,
}

impl CredentialStore {
    /// Open the store, creating an empty one if the file doesn't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            info!("Creating empty credential store at {}", path.display());
            let store = Self {
                path,
                credentials: Vec::new(),
            };
            store.save()?;
            return Ok(store);
        }

        let contents = std::fs::read_to_string(&path)?;
        let credentials: Vec<Credential> = serde_json::from_str(&contents).map_err(|e| {
            ClaimerError::Credentials(format!("failed to parse {}: {}", path.display(), e))
        })?;
        debug!("Loaded {} credential(s) from {}", credentials.len(), path.display());

        Ok(Self { path, credentials })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Derive the address for `phrase` and store it.
    pub fn add(&mut self, phrase: &str) -> Result<Credential> {
        let phrase = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
        let wallet = Wallet::from_mnemonic(&phrase)?;
        let address = wallet.address();

        if self.credentials.iter().any(|c| c.address == address) {
            return Err(ClaimerError::Credentials(format!(
                "{} is already stored",
                address
            )));
        }

        let credential = Credential { address, phrase };
        self.credentials.push(credential.clone());
        self.save()?;
        info!("Stored credential for {}", address);
        Ok(credential)
    }

    pub fn delete(&mut self, selector: CredentialSelector) -> Result<Credential> {
        let position = match selector {
            CredentialSelector::Index(index) if index < self.credentials.len() => Some(index),
            CredentialSelector::Index(_) => None,
            CredentialSelector::Address(address) => {
                self.credentials.iter().position(|c| c.address == address)
            }
        }
        .ok_or_else(|| ClaimerError::Credentials(format!("no credential matches {:?}", selector)))?;

        let removed = self.credentials.remove(position);
        self.save()?;
        info!("Deleted credential for {}", removed.address);
        Ok(removed)
    }

    /// Write the store to disk with restrictive permissions (0o600).
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.credentials)?;

        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;
            let mut opts = std::fs::OpenOptions::new();
            opts.write(true).create(true).truncate(true).mode(0o600);
            let mut f = opts.open(&self.path)?;
            f.write_all(contents.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            std::fs::write(&self.path, &contents)?;
        }

        Ok(())
    }
}
