//! Ethereum interaction module.
//!
//! Contains the chain backend seam, the alloy-backed client, wallet
//! management, and contract bindings.

pub mod backend;
pub mod client;
pub mod constants;
pub mod contracts;
pub mod wallet;

pub(crate) mod mock;

pub use backend::ChainBackend;
pub use client::EthereumClient;
pub use wallet::WalletManager;
