//! Shared helpers for the integration tests.

use alloy_primitives::{Address, U256};
use std::time::Duration;
use wave_portal::{Wave, WavePortal};
use wave_test_utils::{FEED_TIMEOUT, MockWallet};

pub const GAS_LIMIT: u64 = 300_000;

/// Builds the expected record for `from`, `secs` and `message`.
pub fn wave(from: Address, secs: u64, message: &str) -> Wave {
    Wave::new(from, U256::from(secs), message).unwrap()
}

/// A portal wired to `wallet`.
pub fn portal(wallet: &MockWallet) -> WavePortal {
    WavePortal::new(Some(wallet.shared()), wallet.contract(), GAS_LIMIT)
}

/// Polls `condition` until it holds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let wait = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(FEED_TIMEOUT, wait).await.expect("condition never held");
}
