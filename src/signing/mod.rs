pub mod derivation;
pub mod wallet;

pub use wallet::{SignedTransaction, Wallet};
