//! The contract gateway: reads and writes against the WavePortal contract.

use crate::{
    contract::WavePortalContract,
    error::GatewayError,
    provider::{PendingTransaction, SharedProvider},
    session::SessionHandle,
    wave::{Wave, WaveList},
};
use alloy_primitives::{Address, TxHash, U256};
use alloy_rpc_types::BlockId;
use std::fmt;

/// Reads and writes the WavePortal contract on behalf of the session account.
///
/// Without a wallet provider the gateway is offline and every operation fails with
/// [`GatewayError::Offline`] before touching any state.
#[derive(Clone, Debug)]
pub struct ContractGateway {
    contract: Option<WavePortalContract>,
    session: SessionHandle,
    waves: WaveList,
    gas_limit: u64,
}

impl ContractGateway {
    pub fn new(
        address: Address,
        provider: Option<SharedProvider>,
        session: SessionHandle,
        waves: WaveList,
        gas_limit: u64,
    ) -> Self {
        let contract = provider.map(|provider| WavePortalContract::new(address, provider));
        Self { contract, session, waves, gas_limit }
    }

    pub fn is_online(&self) -> bool {
        self.contract.is_some()
    }

    pub fn contract(&self) -> Result<&WavePortalContract, GatewayError> {
        self.contract.as_ref().ok_or(GatewayError::Offline)
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Returns the total number of waves the contract has seen.
    pub async fn get_total_count(&self) -> Result<U256, GatewayError> {
        self.contract()?.get_total_waves(BlockId::latest()).await
    }

    /// Submits a wave with `message`.
    ///
    /// The list is not touched: the wave shows up once the contract emits `NewWave` for it.
    pub async fn submit_interaction(
        &self,
        message: impl Into<String>,
    ) -> Result<PendingWave, GatewayError> {
        let contract = self.contract()?;
        let from = self.signer().await?;
        let pending = contract.wave(from, message.into(), self.gas_limit).await?;
        debug!(tx = %pending.tx_hash(), %from, "wave submitted");
        Ok(PendingWave { inner: pending })
    }

    /// Replaces the wave list with the contract's full history. Returns the number of waves.
    ///
    /// The history is read at a fixed block so that live waves arriving meanwhile can be merged
    /// without duplicates, see [`WaveList`].
    pub async fn fetch_all_interactions(&self) -> Result<usize, GatewayError> {
        let contract = self.contract()?;
        self.waves.begin_fetch();
        match self.read_history(contract).await {
            Ok((waves, block)) => {
                let count = waves.len();
                if self.waves.finish_fetch(waves, block) {
                    debug!(count, block, "loaded wave history");
                }
                Ok(count)
            }
            Err(err) => {
                self.waves.abort_fetch();
                Err(err)
            }
        }
    }

    async fn read_history(
        &self,
        contract: &WavePortalContract,
    ) -> Result<(Vec<Wave>, u64), GatewayError> {
        let block = contract.provider().block_number().await?;
        let raw = contract.get_all_waves(BlockId::number(block)).await?;
        let waves = raw.into_iter().map(Wave::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((waves, block))
    }

    /// The account transactions are sent from: the session account, or else the first account
    /// the wallet exposes.
    async fn signer(&self) -> Result<Address, GatewayError> {
        let account = self.session.read().account;
        if let Some(account) = account {
            return Ok(account);
        }
        let contract = self.contract()?;
        contract.provider().accounts().await?.first().copied().ok_or(GatewayError::NoSigner)
    }
}

/// A submitted wave waiting to be mined.
pub struct PendingWave {
    inner: PendingTransaction,
}

impl PendingWave {
    pub fn tx_hash(&self) -> TxHash {
        self.inner.tx_hash()
    }

    /// Waits for the wave to be mined. Fails if the transaction reverted.
    pub async fn confirm(self) -> Result<TxHash, GatewayError> {
        let tx_hash = self.inner.tx_hash();
        if self.inner.status().await? { Ok(tx_hash) } else { Err(GatewayError::Reverted(tx_hash)) }
    }
}

impl fmt::Debug for PendingWave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PendingWave").field(&self.tx_hash()).finish()
    }
}
