//! # wave-portal
//!
//! Client for the WavePortal contract: send a wave, read the wave history, and follow new waves
//! as they are emitted.
//!
//! The crate is split along the three things the client does:
//!
//! - [`SessionManager`] detects the wallet provider and tracks the connected account.
//! - [`ContractGateway`] reads the wave count and history, and submits waves.
//! - [`LiveUpdateSubscriber`] follows `NewWave` events.
//!
//! [`WavePortal`] wires them to a single [`WaveList`] and runs the load-time sequence.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod abi;
pub mod contract;
pub mod error;
pub mod gateway;
pub mod portal;
pub mod provider;
pub mod session;
pub mod subscriber;
pub mod wave;

pub use contract::WavePortalContract;
pub use error::{GatewayError, InvalidTimestamp, ProviderError, SessionError};
pub use gateway::{ContractGateway, PendingWave};
pub use portal::WavePortal;
pub use provider::{
    LogStream, PendingTransaction, ProviderResult, RpcWallet, SharedProvider, WalletProvider,
    detect_provider,
};
pub use session::{Session, SessionHandle, SessionManager};
pub use subscriber::{LiveUpdateSubscriber, SubscriberState, Subscription};
pub use wave::{LiveWave, Wave, WaveList};
