//! Live `NewWave` feed.

use crate::{
    abi::IWavePortal,
    contract::WavePortalContract,
    error::GatewayError,
    provider::{LogStream, SharedProvider},
    wave::{LiveWave, Wave, WaveList},
};
use alloy_primitives::Address;
use alloy_rpc_types::Log;
use alloy_sol_types::SolEvent;
use futures::StreamExt;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::{sync::oneshot, task::JoinHandle};

/// Whether a listener is registered on the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscriberState {
    Unattached,
    Attached,
}

/// Appends every `NewWave` the contract emits to the wave list.
#[derive(Clone, Debug)]
pub struct LiveUpdateSubscriber {
    contract: Option<WavePortalContract>,
    waves: WaveList,
    listeners: Arc<AtomicUsize>,
}

impl LiveUpdateSubscriber {
    pub fn new(address: Address, provider: Option<SharedProvider>, waves: WaveList) -> Self {
        let contract = provider.map(|provider| WavePortalContract::new(address, provider));
        Self { contract, waves, listeners: Default::default() }
    }

    pub fn state(&self) -> SubscriberState {
        if self.listeners.load(Ordering::Acquire) > 0 {
            SubscriberState::Attached
        } else {
            SubscriberState::Unattached
        }
    }

    /// Registers a listener for `NewWave`.
    ///
    /// The listener stays registered until the returned [`Subscription`] is unsubscribed or
    /// dropped.
    pub async fn attach(&self) -> Result<Subscription, GatewayError> {
        let contract = self.contract.as_ref().ok_or(GatewayError::Offline)?;
        let logs = contract.subscribe_new_waves().await?;
        let (cancel, cancelled) = oneshot::channel();
        self.listeners.fetch_add(1, Ordering::AcqRel);
        let task = tokio::spawn(listen(
            logs,
            self.waves.clone(),
            cancelled,
            ListenerGuard(self.listeners.clone()),
        ));
        debug!(contract = %contract.address(), "listening for NewWave");
        Ok(Subscription { cancel: Some(cancel), task: Some(task) })
    }
}

/// Decrements the listener count when the listener task ends, however it ends.
struct ListenerGuard(Arc<AtomicUsize>);

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

async fn listen(
    mut logs: LogStream,
    waves: WaveList,
    mut cancelled: oneshot::Receiver<()>,
    _guard: ListenerGuard,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut cancelled => break,
            log = logs.next() => match log {
                Some(log) => on_new_wave(&waves, log),
                None => {
                    debug!("NewWave stream closed");
                    break;
                }
            },
        }
    }
}

fn on_new_wave(waves: &WaveList, log: Log) {
    if log.removed {
        debug!(tx = ?log.transaction_hash, "ignoring NewWave removed by a reorg");
        return;
    }
    let event = match IWavePortal::NewWave::decode_log_data(log.data(), true) {
        Ok(event) => event,
        Err(err) => {
            warn!(%err, tx = ?log.transaction_hash, "failed to decode NewWave");
            return;
        }
    };
    trace!(from = %event.from, timestamp = %event.timestamp, message = %event.message, "NewWave");
    match Wave::try_from(event) {
        Ok(wave) => waves.push_live(LiveWave { wave, block_number: log.block_number }),
        Err(err) => warn!(%err, "dropping NewWave"),
    }
}

/// Cancellation token for a registered listener.
///
/// Deregisters the listener exactly once: through [`unsubscribe`](Self::unsubscribe), or on drop.
#[derive(Debug)]
#[must_use = "dropping a subscription deregisters its listener"]
pub struct Subscription {
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Deregisters the listener and waits until it has stopped.
    ///
    /// No wave is appended by this listener once this returns.
    pub async fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
        {
            warn!(%err, "NewWave listener ended abnormally");
        }
    }

    /// Whether the listener is still running.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
