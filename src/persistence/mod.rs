//! Local file persistence.

pub mod credentials;

pub use credentials::{Credential, CredentialSelector, CredentialStore};
