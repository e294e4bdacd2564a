//! Ethereum network constants and session defaults.

use std::time::Duration;

// ============================================================================
// Chain IDs
// ============================================================================

/// Ethereum Mainnet chain ID.
pub const ETHEREUM_MAINNET_CHAIN_ID: u64 = 1;

/// Sepolia testnet chain ID.
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

/// Chain ID used by local Anvil/Hardhat nodes.
pub const LOCAL_DEV_CHAIN_ID: u64 = 31337;

// ============================================================================
// Confirmation defaults
// ============================================================================

/// How long `await_confirmation` waits by default.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Interval between receipt polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// A receipt counts once its block is mined.
pub const DEFAULT_REQUIRED_CONFIRMATIONS: u64 = 1;

/// Human-readable name for a chain ID, for log output.
pub fn chain_name(chain_id: u64) -> &'static str {
    match chain_id {
        ETHEREUM_MAINNET_CHAIN_ID => "mainnet",
        SEPOLIA_CHAIN_ID => "sepolia",
        LOCAL_DEV_CHAIN_ID => "local-dev",
        _ => "unknown",
    }
}
