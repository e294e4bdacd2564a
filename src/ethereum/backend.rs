//! Chain backend abstraction.

use alloy::{
    primitives::{Address, Bytes, TxHash, U256},
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;

use crate::{error::Result, types::Receipt};

/// Node capabilities a contract session needs.
///
/// Provides an abstraction over the JSON-RPC node, allowing the alloy-backed
/// client to be swapped for an in-memory chain in tests. Implementations
/// classify node errors into [`AppError`](crate::error::AppError) variants.
#[async_trait]
pub trait ChainBackend: Send + Sync {
    /// Latest block number. Used as the liveness check.
    async fn block_number(&self) -> Result<u64>;

    /// Chain ID of the connected network.
    async fn chain_id(&self) -> Result<u64>;

    /// Native balance of an account, in wei.
    async fn balance(&self, address: Address) -> Result<U256>;

    /// Execute a read-only call against the latest state.
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes>;

    /// Sign and submit a transaction.
    ///
    /// Returns once the node has accepted it into its pending pool.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash>;

    /// Receipt of a transaction, or `None` while it is not yet included.
    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>>;
}
