//! In-memory chain backend for testing.

#![cfg(test)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::{
    primitives::{keccak256, Address, Bytes, TxHash, B256, U256},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use async_trait::async_trait;

use crate::{
    error::{classify_node_message, AppError, Result, RpcContext},
    ethereum::{backend::ChainBackend, contracts::counter::ICounter},
    types::Receipt,
};

/// Gas charged for every mock transaction.
pub const MOCK_GAS_USED: u64 = 26_000;

/// Gas price of the mock chain, in wei.
pub const MOCK_GAS_PRICE: u64 = 1_000_000_000;

/// Mock chain hosting a single Counter contract.
#[derive(Clone)]
pub struct MockChain {
    inner: Arc<Mutex<MockChainInner>>,
}

enum Mutation {
    Increment,
    SetNumber(U256),
}

struct MockChainInner {
    counter: Address,
    number: U256,
    balances: HashMap<Address, U256>,
    block_number: u64,
    nonce: u64,
    pending: Vec<(TxHash, Mutation)>,
    receipts: HashMap<TxHash, Receipt>,
    automine: bool,
    unreachable: bool,
    revert_writes: bool,
    reject_next: Option<String>,
    calls: usize,
    submissions: usize,
}

impl MockChain {
    /// Create a chain with the Counter deployed at `counter` holding `number`.
    pub fn new(counter: Address, number: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockChainInner {
                counter,
                number: U256::from(number),
                balances: HashMap::new(),
                block_number: 100,
                nonce: 0,
                pending: Vec::new(),
                receipts: HashMap::new(),
                automine: true,
                unreachable: false,
                revert_writes: false,
                reject_next: None,
                calls: 0,
                submissions: 0,
            })),
        }
    }

    /// Set the balance of an account.
    pub fn fund(&self, address: Address, wei: U256) {
        self.inner.lock().unwrap().balances.insert(address, wei);
    }

    /// Include submitted transactions in a block as soon as they arrive.
    pub fn set_automine(&self, automine: bool) {
        self.inner.lock().unwrap().automine = automine;
    }

    /// Fail every request as if the node were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.lock().unwrap().unreachable = unreachable;
    }

    /// Include writes with a failed status and no state change.
    pub fn set_revert_writes(&self, revert: bool) {
        self.inner.lock().unwrap().revert_writes = revert;
    }

    /// Refuse the next submission with this node message.
    pub fn reject_next(&self, message: &str) {
        self.inner.lock().unwrap().reject_next = Some(message.to_string());
    }

    /// Mine one block including every pending transaction.
    pub fn mine(&self) {
        self.inner.lock().unwrap().mine();
    }

    /// Current Counter value.
    pub fn number(&self) -> U256 {
        self.inner.lock().unwrap().number
    }

    /// Number of `eth_call` requests served.
    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().calls
    }

    /// Number of accepted submissions.
    pub fn submissions(&self) -> usize {
        self.inner.lock().unwrap().submissions
    }
}

impl MockChainInner {
    fn mine(&mut self) {
        self.block_number += 1;
        let block_hash = keccak256(self.block_number.to_be_bytes());

        for (tx_hash, mutation) in std::mem::take(&mut self.pending) {
            let success = !self.revert_writes;
            if success {
                match mutation {
                    Mutation::Increment => self.number += U256::from(1),
                    Mutation::SetNumber(value) => self.number = value,
                }
            }
            self.receipts.insert(
                tx_hash,
                Receipt {
                    transaction_hash: tx_hash,
                    block_number: self.block_number,
                    block_hash,
                    gas_used: MOCK_GAS_USED,
                    success,
                },
            );
        }
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            Err(AppError::Connection("error sending request: connection refused".into()))
        } else {
            Ok(())
        }
    }

    fn target(&self, tx: &TransactionRequest, context: RpcContext) -> Result<Bytes> {
        let to = tx.to.and_then(|kind| kind.to().copied());
        if to != Some(self.counter) {
            // Calls to accounts without code succeed with empty output
            return Ok(Bytes::new());
        }
        let input = tx.input.input().cloned().unwrap_or_default();
        if input.len() < 4 {
            return Err(classify_node_message("execution reverted", context));
        }
        Ok(input)
    }
}

#[async_trait]
impl ChainBackend for MockChain {
    async fn block_number(&self) -> Result<u64> {
        let inner = self.inner.lock().unwrap();
        inner.check_reachable()?;
        Ok(inner.block_number)
    }

    async fn chain_id(&self) -> Result<u64> {
        self.inner.lock().unwrap().check_reachable()?;
        Ok(31337)
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        let inner = self.inner.lock().unwrap();
        inner.check_reachable()?;
        Ok(inner.balances.get(&address).copied().unwrap_or_default())
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes> {
        let mut inner = self.inner.lock().unwrap();
        inner.check_reachable()?;
        inner.calls += 1;

        let input = inner.target(&tx, RpcContext::Read)?;
        if input.is_empty() {
            return Ok(input);
        }

        let selector: [u8; 4] = input[..4].try_into().unwrap();
        if selector == ICounter::numberCall::SELECTOR {
            Ok(Bytes::from(inner.number.to_be_bytes::<32>().to_vec()))
        } else if selector == ICounter::incrementCall::SELECTOR
            || selector == ICounter::setNumberCall::SELECTOR
        {
            Ok(Bytes::new())
        } else {
            Err(classify_node_message("execution reverted", RpcContext::Read))
        }
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        let mut inner = self.inner.lock().unwrap();
        inner.check_reachable()?;

        if let Some(message) = inner.reject_next.take() {
            return Err(classify_node_message(&message, RpcContext::Submit));
        }

        let from = tx.from.unwrap_or_default();
        let cost = U256::from(MOCK_GAS_USED) * U256::from(MOCK_GAS_PRICE);
        let balance = inner.balances.get(&from).copied().unwrap_or_default();
        if balance < cost {
            return Err(classify_node_message(
                &format!("insufficient funds for gas * price + value: have {balance} want {cost}"),
                RpcContext::Submit,
            ));
        }

        let input = inner.target(&tx, RpcContext::Submit)?;
        let selector: [u8; 4] = input
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| classify_node_message("execution reverted", RpcContext::Submit))?;
        let mutation = if selector == ICounter::incrementCall::SELECTOR {
            Mutation::Increment
        } else if selector == ICounter::setNumberCall::SELECTOR {
            let call = ICounter::setNumberCall::abi_decode(&input)
                .map_err(|e| classify_node_message(&e.to_string(), RpcContext::Submit))?;
            Mutation::SetNumber(call.newNumber)
        } else {
            return Err(classify_node_message("execution reverted", RpcContext::Submit));
        };

        inner.balances.insert(from, balance - cost);
        inner.nonce += 1;
        inner.submissions += 1;
        let tx_hash: TxHash = keccak256(B256::left_padding_from(&inner.nonce.to_be_bytes()));
        inner.pending.push((tx_hash, mutation));

        if inner.automine {
            inner.mine();
        }

        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>> {
        let inner = self.inner.lock().unwrap();
        inner.check_reachable()?;
        Ok(inner.receipts.get(&tx_hash).cloned())
    }
}
