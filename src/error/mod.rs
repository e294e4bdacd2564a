//! Error types and handling module.
//!
//! Defines all application-specific error types and the classification of
//! node error responses into them.

use std::time::Duration;

use alloy::{
    primitives::TxHash,
    transports::{RpcError, TransportError},
};
use thiserror::Error;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed configuration, reported before any network work.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Endpoint malformed or unreachable.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Secret key is not a valid secp256k1 private key.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Invalid Ethereum address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Malformed interface definition.
    #[error("ABI error: {0}")]
    Abi(String),

    /// Unknown function, bad arguments, or an execution error on a call.
    #[error("Call error: {0}")]
    Call(String),

    /// Signer account cannot cover value plus gas.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Node refused the transaction (nonce conflict, underpriced, ...).
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    /// Transaction not included before the deadline.
    #[error("Timed out after {timeout:?} waiting for transaction {tx_hash}")]
    Timeout { tx_hash: TxHash, timeout: Duration },

    /// Transaction included but its execution failed.
    #[error("Transaction {tx_hash} reverted in block {block_number}")]
    ExecutionReverted { tx_hash: TxHash, block_number: u64 },
}

impl From<alloy::signers::local::LocalSignerError> for AppError {
    fn from(err: alloy::signers::local::LocalSignerError) -> Self {
        AppError::InvalidKey(err.to_string())
    }
}

impl From<alloy::json_abi::parser::Error> for AppError {
    fn from(err: alloy::json_abi::parser::Error) -> Self {
        AppError::Abi(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Abi(err.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

/// Which kind of RPC interaction produced an error.
///
/// The same node message means different things depending on where it was
/// returned: a revert during `eth_call` is a failed read, while "nonce too
/// low" only ever comes back from a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcContext {
    /// Liveness checks and chain metadata.
    Connect,
    /// `eth_call` reads.
    Read,
    /// Gas estimation and `eth_sendRawTransaction`.
    Submit,
    /// Receipt and block polling.
    Receipt,
}

/// Classify an alloy transport error for the given context.
pub fn classify_transport_error(err: TransportError, context: RpcContext) -> AppError {
    match err {
        RpcError::ErrorResp(payload) => {
            let mut message = payload.message.to_string();
            let reason = payload
                .as_revert_data()
                .and_then(|data| alloy::sol_types::decode_revert_reason(&data));
            if let Some(reason) = reason {
                message = format!("{message}: {reason}");
            }
            classify_node_message(&message, context)
        }
        RpcError::Transport(kind) => AppError::Connection(kind.to_string()),
        other => match context {
            RpcContext::Read => AppError::Call(other.to_string()),
            RpcContext::Submit => AppError::Rejected(other.to_string()),
            RpcContext::Connect | RpcContext::Receipt => AppError::Connection(other.to_string()),
        },
    }
}

/// Classify an error message returned by a node.
pub fn classify_node_message(message: &str, context: RpcContext) -> AppError {
    let lower = message.to_lowercase();
    let message = message.to_string();

    match context {
        RpcContext::Connect | RpcContext::Receipt => AppError::Connection(message),
        RpcContext::Read => AppError::Call(message),
        RpcContext::Submit => {
            if lower.contains("insufficient funds") || lower.contains("insufficient balance") {
                AppError::InsufficientFunds(message)
            } else if lower.contains("revert") || lower.contains("invalid opcode") {
                AppError::Call(message)
            } else {
                AppError::Rejected(message)
            }
        }
    }
}
