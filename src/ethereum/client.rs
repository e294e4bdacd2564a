//! Ethereum RPC client.

use alloy::{
    network::{Ethereum, ReceiptResponse},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::{
    error::{classify_transport_error, AppError, Result, RpcContext},
    ethereum::{backend::ChainBackend, constants::chain_name, WalletManager},
    types::Receipt,
};

/// Ethereum RPC client bound to a signer.
///
/// Gas, nonce and chain ID are filled in by the provider's fillers; the
/// wallet filler signs every submitted transaction.
#[derive(Clone)]
pub struct EthereumClient {
    /// The underlying provider.
    provider: DynProvider<Ethereum>,
    /// RPC URL for logging.
    rpc_url: String,
    /// Lazily initialized chain ID.
    chain_id: Arc<OnceCell<u64>>,
}

impl EthereumClient {
    /// Create a new Ethereum client.
    ///
    /// Note: This does NOT make any network calls. Use [`EthereumClient::connect`]
    /// to also check that the endpoint answers.
    pub fn new(rpc_url: &str, wallet: &WalletManager) -> Result<Self> {
        let url: reqwest::Url = rpc_url
            .trim()
            .parse()
            .map_err(|e| AppError::Connection(format!("Invalid RPC URL {rpc_url:?}: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Connection(format!(
                "Unsupported RPC URL scheme {:?}, expected http or https",
                url.scheme()
            )));
        }

        let provider =
            ProviderBuilder::new().wallet(wallet.ethereum_wallet()).connect_http(url).erased();

        tracing::debug!(rpc_url = %rpc_url, "Ethereum client created");

        Ok(Self { provider, rpc_url: rpc_url.to_string(), chain_id: Arc::new(OnceCell::new()) })
    }

    /// Create a client and verify the endpoint with a block number query.
    pub async fn connect(rpc_url: &str, wallet: &WalletManager) -> Result<Self> {
        let client = Self::new(rpc_url, wallet)?;
        let block = client.block_number().await?;

        tracing::info!(rpc_url = %rpc_url, block = block, "Connected to Ethereum node");

        Ok(client)
    }

    /// RPC URL this client talks to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

impl std::fmt::Debug for EthereumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthereumClient").field("rpc_url", &self.rpc_url).finish()
    }
}

/// Convert an RPC receipt, treating receipts without a block as not included.
fn to_receipt(receipt: &TransactionReceipt) -> Option<Receipt> {
    Some(Receipt {
        transaction_hash: ReceiptResponse::transaction_hash(receipt),
        block_number: ReceiptResponse::block_number(receipt)?,
        block_hash: ReceiptResponse::block_hash(receipt)?,
        gas_used: ReceiptResponse::gas_used(receipt),
        success: ReceiptResponse::status(receipt),
    })
}

#[async_trait]
impl ChainBackend for EthereumClient {
    async fn block_number(&self) -> Result<u64> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| classify_transport_error(e, RpcContext::Connect))
    }

    async fn chain_id(&self) -> Result<u64> {
        self.chain_id
            .get_or_try_init(|| async {
                let chain_id = self
                    .provider
                    .get_chain_id()
                    .await
                    .map_err(|e| classify_transport_error(e, RpcContext::Connect))?;
                tracing::info!(
                    chain_id = chain_id,
                    chain = chain_name(chain_id),
                    rpc_url = %self.rpc_url,
                    "Resolved chain ID"
                );
                Ok(chain_id)
            })
            .await
            .copied()
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| classify_transport_error(e, RpcContext::Connect))
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes> {
        self.provider.call(tx).await.map_err(|e| classify_transport_error(e, RpcContext::Read))
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| classify_transport_error(e, RpcContext::Submit))?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| classify_transport_error(e, RpcContext::Receipt))?;
        Ok(receipt.as_ref().and_then(to_receipt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn wallet() -> WalletManager {
        WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap()
    }

    #[test]
    fn test_new_makes_no_network_call() {
        // Nothing listens on port 1; construction must still succeed
        let client = EthereumClient::new("http://127.0.0.1:1", &wallet()).unwrap();
        assert_eq!(client.rpc_url(), "http://127.0.0.1:1");
    }

    #[test]
    fn test_new_rejects_malformed_url() {
        let result = EthereumClient::new("not a url", &wallet());
        assert!(matches!(result, Err(AppError::Connection(_))));
    }

    #[test]
    fn test_new_rejects_non_http_scheme() {
        let result = EthereumClient::new("ws://127.0.0.1:8546", &wallet());
        assert!(matches!(result, Err(AppError::Connection(ref m)) if m.contains("ws")));
    }

    #[tokio::test]
    async fn test_connect_unreachable_endpoint() {
        let result = EthereumClient::connect("http://127.0.0.1:1", &wallet()).await;
        assert!(matches!(result, Err(AppError::Connection(_))));
    }

    #[test]
    fn test_debug_shows_only_url() {
        let client = EthereumClient::new("http://127.0.0.1:8545", &wallet()).unwrap();
        let debug_str = format!("{client:?}");
        assert!(debug_str.contains("127.0.0.1:8545"));
        assert!(!debug_str.contains("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"));
    }
}
