//! The wallet provider seam.
//!
//! A [`WalletProvider`] is the bridge to the user's wallet: it lists and requests accounts, answers
//! read-only calls, signs and sends transactions, and streams contract logs. It is always passed
//! in explicitly, so tests can swap in an in-memory wallet.

use crate::error::ProviderError;
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_rpc_types::{BlockId, Filter, Log, TransactionRequest};
use async_trait::async_trait;
use futures::{future::BoxFuture, stream::BoxStream};
use std::{fmt, sync::Arc};

mod rpc;
pub use rpc::{RpcWallet, detect_provider};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Logs matching a subscription filter, in delivery order.
pub type LogStream = BoxStream<'static, Log>;

/// A shared wallet provider.
pub type SharedProvider = Arc<dyn WalletProvider>;

/// EIP-1193 style access to a wallet.
#[async_trait]
pub trait WalletProvider: fmt::Debug + Send + Sync {
    /// Accounts the user already authorized (`eth_accounts`). Never prompts.
    async fn accounts(&self) -> ProviderResult<Vec<Address>>;

    /// Asks the user to authorize accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> ProviderResult<Vec<Address>>;

    /// The latest block number.
    async fn block_number(&self) -> ProviderResult<u64>;

    /// Executes a read-only call at `block`.
    async fn call(&self, tx: TransactionRequest, block: BlockId) -> ProviderResult<Bytes>;

    /// Has the wallet sign and broadcast `tx`.
    async fn send_transaction(&self, tx: TransactionRequest)
    -> ProviderResult<PendingTransaction>;

    /// Streams logs matching `filter` until the stream is dropped.
    async fn subscribe_logs(&self, filter: Filter) -> ProviderResult<LogStream>;
}

/// A broadcast transaction that may not be mined yet.
pub struct PendingTransaction {
    tx_hash: TxHash,
    receipt: BoxFuture<'static, ProviderResult<bool>>,
}

impl PendingTransaction {
    /// Creates a pending transaction. `receipt` resolves to the receipt status once mined.
    pub fn new(tx_hash: TxHash, receipt: BoxFuture<'static, ProviderResult<bool>>) -> Self {
        Self { tx_hash, receipt }
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Waits until the transaction is mined and returns whether it succeeded.
    pub async fn status(self) -> ProviderResult<bool> {
        self.receipt.await
    }
}

impl fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransaction").field("tx_hash", &self.tx_hash).finish_non_exhaustive()
    }
}
