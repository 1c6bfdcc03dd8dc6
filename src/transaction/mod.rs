//! Programmable transaction construction
//!
//! `builder` assembles commands and inputs; `data` holds the BCS wire types
//! submitted to the chain.

pub mod builder;
pub mod data;

pub use builder::ProgrammableTransactionBuilder;
pub use data::{
    Argument, CallArg, Command, ObjectArg, ProgrammableTransaction, TransactionData, TypeTag,
};
