//! Contract Session Library
//!
//! Connects to an Ethereum JSON-RPC node, derives a signer from a private key,
//! binds a contract interface to an address, and runs read and write calls
//! against it.
//!
//! # Features
//!
//! - **Reads**: `eth_call` queries decoded through the bound ABI
//! - **Writes**: signed transactions returning a pending handle
//! - **Confirmation**: bounded waiting for inclusion, with revert detection
//!
//! # Example
//!
//! ```rust,ignore
//! use contract_session::{counter_abi, Config, ContractSession};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let session = ContractSession::connect(&config).await?;
//!     let counter = session.bind_contract(&config.contract_address, counter_abi()?)?;
//!
//!     let pending = session.write(&counter, "increment", &[]).await?;
//!     let receipt = session.await_confirmation(&pending, Duration::from_secs(60)).await?;
//!     println!("confirmed in block {}", receipt.block_number);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ethereum;
pub mod services;
pub mod types;

pub use config::Config;
pub use error::{AppError, Result};
pub use ethereum::contracts::{counter::counter_abi, load_abi};
pub use ethereum::{ChainBackend, EthereumClient, WalletManager};
pub use services::ContractSession;
pub use types::{CallOutput, ContractDescriptor, PendingCall, Receipt};
