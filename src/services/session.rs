//! Contract session service.
//!
//! Binds a signer and a node connection together and runs contract calls
//! through them: read-only queries, transaction submission, and waiting for
//! confirmation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alloy::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
    json_abi::{Function, JsonAbi, StateMutability},
    primitives::{Address, Bytes, TxHash, U256},
    rpc::types::TransactionRequest,
};

use crate::{
    config::Config,
    error::{AppError, Result},
    ethereum::{
        backend::ChainBackend,
        constants::{DEFAULT_POLL_INTERVAL, DEFAULT_REQUIRED_CONFIRMATIONS},
        EthereumClient, WalletManager,
    },
    types::{is_read_only, CallOutput, ContractDescriptor, PendingCall, Receipt},
};

/// A connection to a node plus the signer that authorizes writes.
///
/// Every operation is a single round trip (or, for
/// [`await_confirmation`](Self::await_confirmation), a bounded polling loop);
/// nothing is retried. Writes from one session are not serialized: confirm
/// each write before issuing the next if their order matters.
pub struct ContractSession<B = EthereumClient> {
    backend: Arc<B>,
    wallet: WalletManager,
    poll_interval: Duration,
    required_confirmations: u64,
}

impl<B> Clone for ContractSession<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            wallet: self.wallet.clone(),
            poll_interval: self.poll_interval,
            required_confirmations: self.required_confirmations,
        }
    }
}

impl<B> fmt::Debug for ContractSession<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractSession")
            .field("signer", &self.wallet.address())
            .field("poll_interval", &self.poll_interval)
            .field("required_confirmations", &self.required_confirmations)
            .finish()
    }
}

impl ContractSession<EthereumClient> {
    /// Open a session from configuration.
    ///
    /// Validates the configuration and the private key before touching the
    /// network, then checks that the endpoint answers.
    pub async fn connect(config: &Config) -> Result<Self> {
        config.validate()?;

        let wallet = WalletManager::from_private_key(&config.private_key)?;
        let client = EthereumClient::connect(&config.rpc_url, &wallet).await?;

        Ok(Self::with_backend(client, wallet)
            .with_poll_interval(config.poll_interval)
            .with_required_confirmations(config.required_confirmations))
    }
}

impl<B: ChainBackend> ContractSession<B> {
    /// Wrap an existing backend without any liveness check.
    pub fn with_backend(backend: B, wallet: WalletManager) -> Self {
        Self {
            backend: Arc::new(backend),
            wallet,
            poll_interval: DEFAULT_POLL_INTERVAL,
            required_confirmations: DEFAULT_REQUIRED_CONFIRMATIONS,
        }
    }

    /// Wrap a backend after checking that it answers a block number query.
    pub async fn open(backend: B, wallet: WalletManager) -> Result<Self> {
        let block = backend.block_number().await?;
        tracing::info!(block = block, signer = %wallet.address(), "Contract session opened");
        Ok(Self::with_backend(backend, wallet))
    }

    /// Set the interval between receipt polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set how many blocks (including the inclusion block) a receipt needs.
    pub fn with_required_confirmations(mut self, confirmations: u64) -> Self {
        self.required_confirmations = confirmations.max(1);
        self
    }

    /// Address of the signer.
    pub fn signer_address(&self) -> Address {
        self.wallet.address()
    }

    /// Latest block number.
    pub async fn block_number(&self) -> Result<u64> {
        self.backend.block_number().await
    }

    /// Chain ID of the connected network.
    pub async fn chain_id(&self) -> Result<u64> {
        self.backend.chain_id().await
    }

    /// Native balance of the signer, in wei.
    pub async fn balance(&self) -> Result<U256> {
        self.backend.balance(self.wallet.address()).await
    }

    /// Bind an interface definition to a contract address.
    ///
    /// Validates the address; makes no network call.
    pub fn bind_contract(&self, address: &str, abi: JsonAbi) -> Result<ContractDescriptor> {
        let descriptor = ContractDescriptor::new(address, abi)?;
        tracing::debug!(
            contract = %descriptor.address(),
            functions = descriptor.abi().functions().count(),
            "Contract bound"
        );
        Ok(descriptor)
    }

    /// Query a function against the latest chain state.
    pub async fn read(
        &self,
        descriptor: &ContractDescriptor,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<CallOutput> {
        let function = descriptor.resolve_function(function, args)?;
        let tx = self.build_request(descriptor, function, args)?;

        tracing::debug!(contract = %descriptor.address(), function = %function.signature(), "Reading contract");

        let output = self.backend.call(tx).await?;
        let values = decode_output(function, &output)?;

        Ok(CallOutput::new(values))
    }

    /// Sign and submit a state-changing call.
    ///
    /// Returns as soon as the node accepts the transaction; the change has
    /// not happened yet. Pass the handle to
    /// [`await_confirmation`](Self::await_confirmation).
    pub async fn write(
        &self,
        descriptor: &ContractDescriptor,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<PendingCall> {
        let function = descriptor.resolve_function(function, args)?;
        if is_read_only(function) {
            return Err(AppError::Call(format!(
                "`{}` is {} and cannot be sent as a transaction",
                function.signature(),
                match function.state_mutability {
                    StateMutability::Pure => "pure",
                    _ => "view",
                }
            )));
        }

        let tx = self.build_request(descriptor, function, args)?;
        let tx_hash = self.backend.send_transaction(tx).await?;

        tracing::info!(
            tx_hash = %tx_hash,
            contract = %descriptor.address(),
            function = %function.signature(),
            "Transaction submitted"
        );

        Ok(PendingCall {
            tx_hash,
            contract: descriptor.address(),
            function: function.signature(),
        })
    }

    /// Wait until a submitted call is included and confirmed.
    ///
    /// A zero timeout fails immediately. A handle that timed out can be
    /// waited on again; the transaction itself cannot be cancelled.
    pub async fn await_confirmation(
        &self,
        pending: &PendingCall,
        timeout: Duration,
    ) -> Result<Receipt> {
        let tx_hash = pending.tx_hash;

        if timeout.is_zero() {
            return Err(AppError::Timeout { tx_hash, timeout });
        }

        tracing::debug!(tx_hash = %tx_hash, timeout = ?timeout, "Waiting for confirmation");

        let receipt = tokio::time::timeout(timeout, self.poll_receipt(tx_hash))
            .await
            .map_err(|_| AppError::Timeout { tx_hash, timeout })??;

        if !receipt.success {
            tracing::warn!(
                tx_hash = %tx_hash,
                block = receipt.block_number,
                function = %pending.function,
                "Transaction reverted"
            );
            return Err(AppError::ExecutionReverted { tx_hash, block_number: receipt.block_number });
        }

        tracing::info!(
            tx_hash = %tx_hash,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            "Transaction confirmed"
        );

        Ok(receipt)
    }

    /// Poll until the receipt exists and is deep enough.
    async fn poll_receipt(&self, tx_hash: TxHash) -> Result<Receipt> {
        loop {
            if let Some(receipt) = self.backend.transaction_receipt(tx_hash).await? {
                if self.required_confirmations <= 1 {
                    return Ok(receipt);
                }

                let latest = self.backend.block_number().await?;
                let confirmations = (latest + 1).saturating_sub(receipt.block_number);
                if confirmations >= self.required_confirmations {
                    return Ok(receipt);
                }
                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = confirmations,
                    required = self.required_confirmations,
                    "Waiting for more confirmations"
                );
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn build_request(
        &self,
        descriptor: &ContractDescriptor,
        function: &Function,
        args: &[DynSolValue],
    ) -> Result<TransactionRequest> {
        let calldata = function.abi_encode_input(args).map_err(|e| {
            AppError::Call(format!("cannot encode arguments for `{}`: {e}", function.signature()))
        })?;

        Ok(TransactionRequest::default()
            .to(descriptor.address())
            .input(Bytes::from(calldata).into())
            .from(self.wallet.address()))
    }
}

fn decode_output(function: &Function, output: &Bytes) -> Result<Vec<DynSolValue>> {
    if output.is_empty() && !function.outputs.is_empty() {
        return Err(AppError::Call(format!(
            "`{}` returned no data; is the contract deployed at this address?",
            function.signature()
        )));
    }

    function.abi_decode_output(output).map_err(|e| {
        AppError::Call(format!("cannot decode result of `{}`: {e}", function.signature()))
    })
}
