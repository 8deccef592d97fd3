use crate::{ALICE, WAVE_PORTAL};
use alloy_primitives::{Address, B256, Bytes, TxHash, TxKind, U256};
use alloy_rpc_types::{BlockId, BlockNumberOrTag, Filter, Log, TransactionRequest};
use alloy_sol_types::{SolCall, SolEvent, SolInterface};
use async_trait::async_trait;
use futures::{FutureExt, StreamExt, stream};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{Semaphore, broadcast};
use wave_portal::{
    LogStream, PendingTransaction, ProviderError, ProviderResult, WalletProvider,
    abi::IWavePortal,
};

/// An in-memory wallet connected to a chain that hosts a single WavePortal contract.
///
/// Every `wave` transaction is mined into its own block right away and emits `NewWave` to all
/// open log subscriptions. Reads honor the requested block, so history fetched at block `n`
/// never contains waves mined later.
#[derive(Clone, Debug)]
pub struct MockWallet {
    chain: Arc<Mutex<Chain>>,
    logs: broadcast::Sender<Log>,
}

#[derive(Debug)]
struct Chain {
    contract: Address,
    accounts: Vec<Address>,
    authorized: bool,
    rejecting: bool,
    offline: bool,
    revert_waves: bool,
    block: u64,
    clock: u64,
    /// Stored waves with the block they were mined in.
    waves: Vec<(u64, IWavePortal::Wave)>,
    sent: Vec<TransactionRequest>,
    account_requests: usize,
    filters: Vec<Filter>,
    /// Holds `getAllWaves` answers back until permits are added.
    history_gate: Option<Arc<Semaphore>>,
    held_reads: usize,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWallet {
    /// A wallet holding [`ALICE`], not yet authorized for the page.
    pub fn new() -> Self {
        let (logs, _) = broadcast::channel(64);
        let chain = Chain {
            contract: WAVE_PORTAL,
            accounts: vec![ALICE],
            authorized: false,
            rejecting: false,
            offline: false,
            revert_waves: false,
            block: 1,
            clock: 1_000,
            waves: Vec::new(),
            sent: Vec::new(),
            account_requests: 0,
            filters: Vec::new(),
            history_gate: None,
            held_reads: 0,
        };
        Self { chain: Arc::new(Mutex::new(chain)), logs }
    }

    /// Replaces the accounts the wallet holds.
    pub fn with_accounts(self, accounts: impl IntoIterator<Item = Address>) -> Self {
        self.chain.lock().accounts = accounts.into_iter().collect();
        self
    }

    /// Marks the page as already authorized, as if the user connected in an earlier visit.
    pub fn authorized(self) -> Self {
        self.chain.lock().authorized = true;
        self
    }

    /// Makes the user reject every connection prompt.
    pub fn rejecting(self) -> Self {
        self.chain.lock().rejecting = true;
        self
    }

    /// Moves the contract to `contract`.
    pub fn at(self, contract: Address) -> Self {
        self.chain.lock().contract = contract;
        self
    }

    /// Returns this wallet as a shared provider.
    pub fn shared(&self) -> Arc<dyn WalletProvider> {
        Arc::new(self.clone())
    }

    pub fn contract(&self) -> Address {
        self.chain.lock().contract
    }

    pub fn current_block(&self) -> u64 {
        self.chain.lock().block
    }

    pub fn is_authorized(&self) -> bool {
        self.chain.lock().authorized
    }

    /// Makes every request fail as if the node went away.
    pub fn set_offline(&self, offline: bool) {
        self.chain.lock().offline = offline;
    }

    /// Makes `wave` transactions revert.
    pub fn set_revert_waves(&self, revert: bool) {
        self.chain.lock().revert_waves = revert;
    }

    /// Sets the timestamp of the next mined wave.
    pub fn set_clock(&self, timestamp: u64) {
        self.chain.lock().clock = timestamp;
    }

    /// Mines a wave from `from` in its own block and emits `NewWave`. Returns the block.
    pub fn mine_wave(&self, from: Address, timestamp: u64, message: &str) -> u64 {
        let (log, block) = {
            let mut chain = self.chain.lock();
            let (block, tx_hash) = chain.mine();
            let wave = IWavePortal::Wave {
                waver: from,
                message: message.to_string(),
                timestamp: U256::from(timestamp),
            };
            chain.waves.push((block, wave));
            (chain.new_wave_log(from, timestamp, message, Some(block), tx_hash), block)
        };
        self.publish(log);
        block
    }

    /// Delivers a `NewWave` notification without storing anything, like a replayed log.
    pub fn emit_new_wave(&self, from: Address, timestamp: u64, message: &str, block: Option<u64>) {
        let log = {
            let chain = self.chain.lock();
            let tx_hash = block.map(tx_hash).unwrap_or_default();
            chain.new_wave_log(from, timestamp, message, block, tx_hash)
        };
        self.publish(log);
    }

    /// Delivers a raw log to all subscriptions.
    pub fn emit_log(&self, log: Log) {
        self.publish(log);
    }

    /// Holds `getAllWaves` answers until [`release_history`](Self::release_history) is called.
    pub fn hold_history(&self) {
        self.chain.lock().history_gate = Some(Arc::new(Semaphore::new(0)));
    }

    /// Lets every held `getAllWaves` answer through.
    pub fn release_history(&self) {
        if let Some(gate) = self.chain.lock().history_gate.take() {
            gate.add_permits(Semaphore::MAX_PERMITS);
        }
    }

    /// Number of `getAllWaves` calls currently held back.
    pub fn held_reads(&self) -> usize {
        self.chain.lock().held_reads
    }

    /// Number of open log subscriptions.
    pub fn listener_count(&self) -> usize {
        self.logs.receiver_count()
    }

    /// Filters passed to `subscribe_logs`, in order.
    pub fn filters(&self) -> Vec<Filter> {
        self.chain.lock().filters.clone()
    }

    /// Transactions sent through this wallet, in order.
    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.chain.lock().sent.clone()
    }

    /// Number of `eth_requestAccounts` prompts shown.
    pub fn account_requests(&self) -> usize {
        self.chain.lock().account_requests
    }

    /// Waves stored by the contract at the latest block.
    pub fn stored_waves(&self) -> Vec<IWavePortal::Wave> {
        self.chain.lock().waves.iter().map(|(_, wave)| wave.clone()).collect()
    }

    fn publish(&self, log: Log) {
        // no receivers just means nobody is listening
        let _ = self.logs.send(log);
    }

    fn check_online(&self) -> ProviderResult<()> {
        if self.chain.lock().offline {
            return Err(ProviderError::other("connection refused"));
        }
        Ok(())
    }

    async fn history_at(&self, block: u64) -> Vec<IWavePortal::Wave> {
        let gate = self.chain.lock().history_gate.clone();
        if let Some(gate) = gate {
            trace!(block, "holding getAllWaves");
            self.chain.lock().held_reads += 1;
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
            self.chain.lock().held_reads -= 1;
        }
        self.chain.lock().waves_at(block).cloned().collect()
    }
}

impl Chain {
    fn mine(&mut self) -> (u64, TxHash) {
        self.block += 1;
        (self.block, tx_hash(self.block))
    }

    fn resolve(&self, block: BlockId) -> u64 {
        match block {
            BlockId::Number(BlockNumberOrTag::Number(number)) => number.min(self.block),
            _ => self.block,
        }
    }

    fn waves_at(&self, block: u64) -> impl Iterator<Item = &IWavePortal::Wave> {
        self.waves.iter().filter(move |(mined, _)| *mined <= block).map(|(_, wave)| wave)
    }

    fn new_wave_log(
        &self,
        from: Address,
        timestamp: u64,
        message: &str,
        block: Option<u64>,
        tx_hash: TxHash,
    ) -> Log {
        let event = IWavePortal::NewWave {
            from,
            timestamp: U256::from(timestamp),
            message: message.to_string(),
        };
        Log {
            inner: alloy_primitives::Log { address: self.contract, data: event.encode_log_data() },
            block_number: block,
            transaction_hash: block.map(|_| tx_hash),
            log_index: block.map(|_| 0),
            ..Default::default()
        }
    }

    fn is_signer(&self, from: Option<Address>) -> bool {
        self.authorized && from.is_some_and(|from| self.accounts.contains(&from))
    }
}

fn tx_hash(block: u64) -> TxHash {
    B256::left_padding_from(&block.to_be_bytes())
}

fn input(tx: &TransactionRequest) -> Bytes {
    tx.input.input().cloned().unwrap_or_default()
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        self.check_online()?;
        let chain = self.chain.lock();
        Ok(if chain.authorized { chain.accounts.clone() } else { Vec::new() })
    }

    async fn request_accounts(&self) -> ProviderResult<Vec<Address>> {
        self.check_online()?;
        let mut chain = self.chain.lock();
        chain.account_requests += 1;
        if chain.rejecting {
            return Err(ProviderError::Rejected("User rejected the request.".to_string()));
        }
        chain.authorized = true;
        Ok(chain.accounts.clone())
    }

    async fn block_number(&self) -> ProviderResult<u64> {
        self.check_online()?;
        Ok(self.chain.lock().block)
    }

    async fn call(&self, tx: TransactionRequest, block: BlockId) -> ProviderResult<Bytes> {
        self.check_online()?;
        let (contract, block) = {
            let chain = self.chain.lock();
            (chain.contract, chain.resolve(block))
        };
        if tx.to != Some(TxKind::Call(contract)) {
            // calling an address without code returns nothing
            return Ok(Bytes::new());
        }
        let call = IWavePortal::IWavePortalCalls::abi_decode(&input(&tx), true)
            .map_err(|err| ProviderError::other(err.to_string()))?;
        let output = match call {
            IWavePortal::IWavePortalCalls::getTotalWaves(_) => {
                let total = self.chain.lock().waves_at(block).count();
                IWavePortal::getTotalWavesCall::abi_encode_returns(&(U256::from(total),))
            }
            IWavePortal::IWavePortalCalls::getAllWaves(_) => {
                let waves = self.history_at(block).await;
                IWavePortal::getAllWavesCall::abi_encode_returns(&(waves,))
            }
            IWavePortal::IWavePortalCalls::wave(_) => {
                return Err(ProviderError::other("execution reverted: wave is not a view"));
            }
        };
        Ok(output.into())
    }

    async fn send_transaction(
        &self,
        tx: TransactionRequest,
    ) -> ProviderResult<PendingTransaction> {
        self.check_online()?;
        let log = {
            let mut chain = self.chain.lock();
            if !chain.is_signer(tx.from) {
                return Err(ProviderError::other("unknown account"));
            }
            if tx.to != Some(TxKind::Call(chain.contract)) {
                return Err(ProviderError::other("transaction is not for the WavePortal contract"));
            }
            let call = IWavePortal::waveCall::abi_decode(&input(&tx), true)
                .map_err(|err| ProviderError::other(err.to_string()))?;
            let from = tx.from.unwrap_or_default();
            chain.sent.push(tx);

            let (block, tx_hash) = chain.mine();
            if chain.revert_waves {
                debug!(block, "wave reverted");
                let receipt = futures::future::ready(Ok(false)).boxed();
                return Ok(PendingTransaction::new(tx_hash, receipt));
            }
            let timestamp = chain.clock;
            chain.clock += 1;
            chain.waves.push((
                block,
                IWavePortal::Wave {
                    waver: from,
                    message: call._message.clone(),
                    timestamp: U256::from(timestamp),
                },
            ));
            chain.new_wave_log(from, timestamp, &call._message, Some(block), tx_hash)
        };
        let tx_hash = log.transaction_hash.unwrap_or_default();
        self.publish(log);
        Ok(PendingTransaction::new(tx_hash, futures::future::ready(Ok(true)).boxed()))
    }

    async fn subscribe_logs(&self, filter: Filter) -> ProviderResult<LogStream> {
        self.check_online()?;
        self.chain.lock().filters.push(filter);
        let logs = stream::unfold(self.logs.subscribe(), |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(log) => return Some((log, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "log subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        Ok(logs.boxed())
    }
}
