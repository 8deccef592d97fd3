//! Typed access to a deployed WavePortal contract.
//!
//! [`WavePortalContract`] encodes calls with the `sol!` bindings, sends them through a
//! [`WalletProvider`](crate::WalletProvider) and decodes the results.

use crate::{
    abi::IWavePortal,
    error::GatewayError,
    provider::{LogStream, PendingTransaction, SharedProvider},
};
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, U256};
use alloy_rpc_types::{BlockId, Filter, TransactionRequest};
use alloy_sol_types::{SolCall, SolEvent};

/// A typed handle to a deployed WavePortal contract, bound to the wallet that talks to it.
#[derive(Clone, Debug)]
pub struct WavePortalContract {
    address: Address,
    provider: SharedProvider,
}

impl WavePortalContract {
    pub fn new(address: Address, provider: SharedProvider) -> Self {
        Self { address, provider }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    /// `getTotalWaves()` at `block`.
    pub async fn get_total_waves(&self, block: BlockId) -> Result<U256, GatewayError> {
        Ok(self.call(IWavePortal::getTotalWavesCall {}, block).await?._0)
    }

    /// `getAllWaves()` at `block`.
    pub async fn get_all_waves(
        &self,
        block: BlockId,
    ) -> Result<Vec<IWavePortal::Wave>, GatewayError> {
        Ok(self.call(IWavePortal::getAllWavesCall {}, block).await?._0)
    }

    /// Sends `wave(message)` from `from`, capped at `gas_limit`.
    pub async fn wave(
        &self,
        from: Address,
        message: String,
        gas_limit: u64,
    ) -> Result<PendingTransaction, GatewayError> {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(self.address)
            .with_input(IWavePortal::waveCall { _message: message }.abi_encode())
            .with_gas_limit(gas_limit);
        Ok(self.provider.send_transaction(tx).await?)
    }

    /// Filter for `NewWave` logs of this contract.
    pub fn new_wave_filter(&self) -> Filter {
        Filter::new().address(self.address).event_signature(IWavePortal::NewWave::SIGNATURE_HASH)
    }

    /// Streams `NewWave` logs until the stream is dropped.
    pub async fn subscribe_new_waves(&self) -> Result<LogStream, GatewayError> {
        Ok(self.provider.subscribe_logs(self.new_wave_filter()).await?)
    }

    async fn call<C: SolCall + Send>(
        &self,
        call: C,
        block: BlockId,
    ) -> Result<C::Return, GatewayError> {
        let tx = TransactionRequest::default().with_to(self.address).with_input(call.abi_encode());
        let output = self.provider.call(tx, block).await?;
        trace!(contract = %self.address, sig = C::SIGNATURE, len = output.len(), "call returned");
        Ok(C::abi_decode_returns(&output, true)?)
    }
}
