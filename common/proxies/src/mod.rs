//! Typed clients for every contract role the borrow workflow talks to.
//!
//! `clients` declares one trait per role, `bindings` holds the fixed ABI
//! of each contract and `evm` implements the traits over an alloy provider.

pub mod bindings;
pub mod clients;
pub mod evm;

pub use clients::*;
pub use evm::*;
