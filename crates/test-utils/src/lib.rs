//! # wave-test-utils
//!
//! An in-memory wallet hosting a WavePortal contract, plus helpers for async tests.

#![warn(unused_crate_dependencies, unreachable_pub)]

#[macro_use]
extern crate tracing;

use alloy_primitives::{Address, address};
use std::time::Duration;
use wave_portal::WaveList;

mod wallet;
pub use wallet::MockWallet;

/// First anvil dev account.
pub const ALICE: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
/// Second anvil dev account.
pub const BOB: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
/// Third anvil dev account.
pub const CAROL: Address = address!("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");

/// Where [`MockWallet`] deploys its contract unless told otherwise.
pub const WAVE_PORTAL: Address = address!("0x1507178BeeA21cA6F9BB071140d7dF545FdB852C");

/// How long the helpers wait for the live feed before failing the test.
pub const FEED_TIMEOUT: Duration = Duration::from_secs(5);

/// Initializes tracing for tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Waits until `waves` holds at least `len` waves.
///
/// # Panics
///
/// Panics after [`FEED_TIMEOUT`].
pub async fn wait_for_waves(waves: &WaveList, len: usize) {
    let mut revisions = waves.subscribe();
    let wait = async {
        while waves.len() < len {
            if revisions.changed().await.is_err() {
                break;
            }
        }
    };
    if tokio::time::timeout(FEED_TIMEOUT, wait).await.is_err() {
        panic!("timed out waiting for {len} waves, have {}", waves.len());
    }
}

/// Gives spawned listeners a chance to run, for asserting that nothing happened.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
}
