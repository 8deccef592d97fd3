use super::{LogStream, PendingTransaction, ProviderResult, SharedProvider, WalletProvider};
use crate::error::ProviderError;
use alloy_network::ReceiptResponse;
use alloy_primitives::{Address, Bytes};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::{BlockId, Filter, TransactionRequest};
use async_trait::async_trait;
use futures::{FutureExt, StreamExt, stream};
use std::sync::Arc;
use wave_config::WaveConfig;

/// A wallet reached over JSON-RPC.
///
/// The node behind `url` manages the keys: accounts come from `eth_accounts` and
/// `eth_requestAccounts`, and transactions are signed by the node via `eth_sendTransaction`.
/// Logs are streamed with `eth_subscribe` on websocket endpoints and polled through a log
/// filter otherwise.
#[derive(Clone, Debug)]
pub struct RpcWallet {
    provider: DynProvider,
    url: String,
    pubsub: bool,
}

impl RpcWallet {
    /// Connects to the wallet at `url`.
    pub async fn connect(url: &str) -> ProviderResult<Self> {
        let provider = ProviderBuilder::new().disable_recommended_fillers().on_builtin(url).await?;
        let pubsub = is_pubsub(url);
        debug!(url, pubsub, "connected to wallet provider");
        Ok(Self { provider: provider.erased(), url: url.to_string(), pubsub })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        Ok(self.provider.get_accounts().await?)
    }

    async fn request_accounts(&self) -> ProviderResult<Vec<Address>> {
        Ok(self.provider.raw_request("eth_requestAccounts".into(), ()).await?)
    }

    async fn block_number(&self) -> ProviderResult<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn call(&self, tx: TransactionRequest, block: BlockId) -> ProviderResult<Bytes> {
        Ok(self.provider.call(tx).block(block).await?)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> ProviderResult<PendingTransaction> {
        let pending = self.provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();
        let receipt = async move {
            let receipt = pending.get_receipt().await.map_err(ProviderError::other)?;
            Ok(receipt.status())
        };
        Ok(PendingTransaction::new(tx_hash, receipt.boxed()))
    }

    async fn subscribe_logs(&self, filter: Filter) -> ProviderResult<LogStream> {
        if self.pubsub {
            let subscription = self.provider.subscribe_logs(&filter).await?;
            return Ok(subscription.into_stream().boxed());
        }
        let poller = self.provider.watch_logs(&filter).await?;
        Ok(poller.into_stream().flat_map(stream::iter).boxed())
    }
}

fn is_pubsub(url: &str) -> bool {
    url.starts_with("ws://") || url.starts_with("wss://")
}

/// Probes for the configured wallet provider.
///
/// A missing or unreachable wallet is not an error: the client runs without one, and every
/// operation that needs it becomes a logged no-op.
pub async fn detect_provider(config: &WaveConfig) -> Option<SharedProvider> {
    let Some(url) = config.rpc_url() else {
        info!("no wallet provider configured, set `eth_rpc_url` or `ETH_RPC_URL`");
        return None;
    };
    match RpcWallet::connect(url).await {
        Ok(wallet) => {
            info!(url, "found a wallet provider");
            Some(Arc::new(wallet))
        }
        Err(err) => {
            warn!(url, %err, "could not reach wallet provider");
            None
        }
    }
}
