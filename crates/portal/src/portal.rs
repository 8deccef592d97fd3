//! The WavePortal page: session, gateway and live feed wired to one wave list.

use crate::{
    gateway::ContractGateway,
    provider::{SharedProvider, detect_provider},
    session::{Session, SessionManager},
    subscriber::{LiveUpdateSubscriber, Subscription},
    wave::{Wave, WaveList},
};
use alloy_primitives::{Address, TxHash};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use wave_config::WaveConfig;

/// The WavePortal client.
///
/// Every user- or lifecycle-triggered operation is best effort: it is attempted once, failures
/// are logged, and state is left as it was.
#[derive(Debug)]
pub struct WavePortal {
    session: SessionManager,
    gateway: ContractGateway,
    subscriber: LiveUpdateSubscriber,
    waves: WaveList,
    /// The message typed into the form.
    message: Mutex<String>,
    subscription: tokio::sync::Mutex<Option<Subscription>>,
    started: AtomicBool,
}

impl WavePortal {
    /// Creates a portal for the contract at `contract`.
    pub fn new(provider: Option<SharedProvider>, contract: Address, gas_limit: u64) -> Self {
        let session = SessionManager::new(provider.clone());
        let waves = WaveList::new();
        let gateway = ContractGateway::new(
            contract,
            provider.clone(),
            session.handle(),
            waves.clone(),
            gas_limit,
        );
        let subscriber = LiveUpdateSubscriber::new(contract, provider, waves.clone());
        Self {
            session,
            gateway,
            subscriber,
            waves,
            message: Default::default(),
            subscription: Default::default(),
            started: AtomicBool::new(false),
        }
    }

    /// Creates a portal from `config`, probing for the configured wallet provider.
    pub async fn from_config(config: &WaveConfig) -> Self {
        let provider = detect_provider(config).await;
        Self::new(provider, config.contract, config.gas_limit)
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.session
    }

    pub fn gateway(&self) -> &ContractGateway {
        &self.gateway
    }

    pub fn subscriber(&self) -> &LiveUpdateSubscriber {
        &self.subscriber
    }

    pub fn session(&self) -> Session {
        self.session.session()
    }

    pub fn wave_list(&self) -> &WaveList {
        &self.waves
    }

    /// The waves to render, in order.
    pub fn waves(&self) -> Vec<Wave> {
        self.waves.snapshot()
    }

    /// Updates the message typed into the form.
    pub fn set_message(&self, message: impl Into<String>) {
        *self.message.lock() = message.into();
    }

    pub fn message(&self) -> String {
        self.message.lock().clone()
    }

    /// Whether the "connect wallet" action is offered: only while no account is connected.
    pub fn show_connect_button(&self) -> bool {
        !self.session().is_connected()
    }

    /// Runs the load-time work, once.
    ///
    /// The live listener is attached before the history is fetched, so no wave emitted in
    /// between is lost. The fetch itself only runs once an authorized account is found.
    pub async fn start(&self) {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("portal already started");
            return;
        }
        self.attach_listener().await;
        self.check_if_wallet_is_connected().await;
    }

    /// Looks for an already authorized account, and loads the wave history if there is one.
    pub async fn check_if_wallet_is_connected(&self) -> Option<Address> {
        if !self.session.detect_provider() {
            info!("make sure you have a wallet provider");
            return None;
        }
        match self.session.get_authorized_account().await {
            Ok(Some(account)) => {
                info!(%account, "found an authorized account");
                self.get_all_waves().await;
                Some(account)
            }
            Ok(None) => {
                info!("no authorized account found");
                None
            }
            Err(err) => {
                error!(%err, "failed to look up authorized accounts");
                None
            }
        }
    }

    /// Asks the wallet to connect. Returns the connected account.
    pub async fn connect_wallet(&self) -> Option<Address> {
        match self.session.request_connection().await {
            Ok(Some(account)) => {
                info!(%account, "connected");
                Some(account)
            }
            Ok(None) => {
                warn!("wallet granted no accounts");
                None
            }
            Err(err) => {
                error!(%err, "failed to connect wallet");
                None
            }
        }
    }

    /// Waves with the current form message and waits until the wave is mined.
    pub async fn wave(&self) -> Option<TxHash> {
        let message = self.message();
        self.wave_with(message).await
    }

    /// Waves with `message` and waits until the wave is mined.
    ///
    /// The wave list is not updated here; the wave appears once the live feed delivers it.
    pub async fn wave_with(&self, message: impl Into<String>) -> Option<TxHash> {
        if !self.gateway.is_online() {
            warn!("no wallet provider, cannot wave");
            return None;
        }
        self.log_total_count().await;

        let pending = match self.gateway.submit_interaction(message).await {
            Ok(pending) => pending,
            Err(err) => {
                error!(%err, "failed to submit wave");
                return None;
            }
        };
        info!(tx = %pending.tx_hash(), "mining...");
        let tx_hash = match pending.confirm().await {
            Ok(tx_hash) => tx_hash,
            Err(err) => {
                error!(%err, "wave was not mined");
                return None;
            }
        };
        info!(tx = %tx_hash, "mined");

        self.log_total_count().await;
        Some(tx_hash)
    }

    /// Replaces the wave list with the contract's history.
    pub async fn get_all_waves(&self) {
        match self.gateway.fetch_all_interactions().await {
            Ok(count) => debug!(count, "fetched all waves"),
            Err(err) => error!(%err, "failed to fetch waves"),
        }
    }

    /// Detaches the live listener. Requests still in flight may complete afterwards.
    pub async fn teardown(&self) {
        let subscription = self.subscription.lock().await.take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe().await;
            debug!("stopped listening for NewWave");
        }
    }

    async fn attach_listener(&self) {
        if !self.session.detect_provider() {
            return;
        }
        match self.subscriber.attach().await {
            Ok(subscription) => {
                // replacing drops, and so deregisters, any previous listener
                *self.subscription.lock().await = Some(subscription);
            }
            Err(err) => error!(%err, "failed to listen for NewWave"),
        }
    }

    async fn log_total_count(&self) {
        match self.gateway.get_total_count().await {
            Ok(count) => info!(%count, "retrieved total wave count"),
            Err(err) => warn!(%err, "failed to retrieve total wave count"),
        }
    }
}
