//! End-to-end tests of the load, connect, wave and teardown flows.

use crate::utils::{GAS_LIMIT, eventually, portal, wave};
use alloy_primitives::Address;
use similar_asserts::assert_eq;
use std::sync::Arc;
use wave_config::WaveConfig;
use wave_portal::{SubscriberState, WavePortal};
use wave_test_utils::{
    ALICE, BOB, MockWallet, WAVE_PORTAL, init_tracing, settle, wait_for_waves,
};

#[tokio::test]
async fn history_then_live_wave() {
    init_tracing();
    let (a, b) = (Address::with_last_byte(0xA), Address::with_last_byte(0xB));
    let wallet = MockWallet::new().authorized();
    wallet.mine_wave(a, 1000, "hi");
    let portal = portal(&wallet);

    portal.start().await;
    assert_eq!(portal.waves(), vec![wave(a, 1000, "hi")]);

    wallet.mine_wave(b, 2000, "yo");
    wait_for_waves(portal.wave_list(), 2).await;
    assert_eq!(portal.waves(), vec![wave(a, 1000, "hi"), wave(b, 2000, "yo")]);
}

#[tokio::test]
async fn fetched_plus_live_count() {
    init_tracing();
    let wallet = MockWallet::new().authorized();
    for i in 0..3 {
        wallet.mine_wave(ALICE, 1000 + i, "old");
    }
    let portal = portal(&wallet);
    portal.start().await;
    assert_eq!(portal.waves().len(), 3);

    for i in 0..4 {
        wallet.mine_wave(BOB, 2000 + i, "new");
    }
    wait_for_waves(portal.wave_list(), 7).await;
    settle().await;
    assert_eq!(portal.waves().len(), 7);
}

#[tokio::test]
async fn without_a_provider_nothing_happens() {
    init_tracing();
    let portal = WavePortal::new(None, WAVE_PORTAL, GAS_LIMIT);

    portal.start().await;
    assert!(portal.show_connect_button());
    assert_eq!(portal.connect_wallet().await, None);

    portal.set_message("hi");
    assert_eq!(portal.wave().await, None);
    assert!(portal.waves().is_empty());
    assert!(!portal.gateway().is_online());
    portal.teardown().await;
}

#[tokio::test]
async fn from_config_without_rpc_url_is_offline() {
    init_tracing();
    let portal = WavePortal::from_config(&WaveConfig::default()).await;
    assert!(!portal.session_manager().detect_provider());
    assert_eq!(portal.check_if_wallet_is_connected().await, None);
}

#[tokio::test]
async fn unauthorized_load_skips_history() {
    init_tracing();
    let wallet = MockWallet::new();
    wallet.mine_wave(BOB, 1000, "hi");
    let portal = portal(&wallet);

    portal.start().await;
    assert!(portal.waves().is_empty());
    assert!(portal.show_connect_button());
    assert_eq!(portal.subscriber().state(), SubscriberState::Attached);

    assert_eq!(portal.connect_wallet().await, Some(ALICE));
    assert!(!portal.show_connect_button());
    assert!(portal.waves().is_empty());

    portal.get_all_waves().await;
    assert_eq!(portal.waves(), vec![wave(BOB, 1000, "hi")]);
}

#[tokio::test]
async fn reconnecting_does_not_duplicate_waves() {
    init_tracing();
    let wallet = MockWallet::new().authorized();
    wallet.mine_wave(BOB, 1000, "hi");
    let portal = portal(&wallet);
    portal.start().await;
    assert_eq!(portal.session().account, Some(ALICE));

    assert_eq!(portal.connect_wallet().await, Some(ALICE));
    assert_eq!(portal.session().account, Some(ALICE));
    assert_eq!(portal.waves(), vec![wave(BOB, 1000, "hi")]);
}

#[tokio::test]
async fn rejected_connection_is_swallowed() {
    init_tracing();
    let wallet = MockWallet::new().rejecting();
    let portal = portal(&wallet);
    portal.start().await;

    assert_eq!(portal.connect_wallet().await, None);
    assert!(portal.show_connect_button());
}

#[tokio::test]
async fn wave_arrives_through_the_feed() {
    init_tracing();
    let wallet = MockWallet::new().authorized();
    wallet.set_clock(4242);
    let portal = portal(&wallet);
    portal.start().await;

    portal.set_message("gm");
    assert_eq!(portal.message(), "gm");
    let tx_hash = portal.wave().await.unwrap();
    assert!(!tx_hash.is_zero());

    wait_for_waves(portal.wave_list(), 1).await;
    assert_eq!(portal.waves(), vec![wave(ALICE, 4242, "gm")]);
    assert_eq!(wallet.sent_transactions()[0].gas, Some(GAS_LIMIT));
}

#[tokio::test]
async fn overlapping_waves() {
    init_tracing();
    let wallet = MockWallet::new().authorized();
    let portal = portal(&wallet);
    portal.start().await;

    let (first, second) = tokio::join!(portal.wave_with("one"), portal.wave_with("two"));
    assert!(first.is_some() && second.is_some());
    wait_for_waves(portal.wave_list(), 2).await;
    assert_eq!(wallet.stored_waves().len(), 2);
}

#[tokio::test]
async fn failed_wave_leaves_the_list() {
    init_tracing();
    let wallet = MockWallet::new().authorized();
    wallet.mine_wave(BOB, 1000, "hi");
    let portal = portal(&wallet);
    portal.start().await;

    wallet.set_revert_waves(true);
    assert_eq!(portal.wave_with("nope").await, None);
    settle().await;
    assert_eq!(portal.waves(), vec![wave(BOB, 1000, "hi")]);
}

#[tokio::test]
async fn teardown_detaches_the_listener() {
    init_tracing();
    let wallet = MockWallet::new().authorized();
    let portal = portal(&wallet);
    portal.start().await;
    assert_eq!(wallet.listener_count(), 1);

    portal.teardown().await;
    assert_eq!(wallet.listener_count(), 0);
    assert_eq!(portal.subscriber().state(), SubscriberState::Unattached);

    wallet.mine_wave(BOB, 2000, "yo");
    settle().await;
    assert!(portal.waves().is_empty());

    // a second teardown is a no-op
    portal.teardown().await;
}

#[tokio::test]
async fn start_runs_once() {
    init_tracing();
    let wallet = MockWallet::new().authorized();
    let portal = portal(&wallet);
    portal.start().await;
    portal.start().await;
    assert_eq!(wallet.listener_count(), 1);
    assert_eq!(wallet.filters().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn live_waves_during_fetch_are_neither_lost_nor_doubled() {
    init_tracing();
    let wallet = MockWallet::new().authorized();
    let history_block = wallet.mine_wave(ALICE, 1000, "hi");
    wallet.hold_history();
    let portal = Arc::new(portal(&wallet));

    let start = tokio::spawn({
        let portal = portal.clone();
        async move { portal.start().await }
    });
    eventually(|| wallet.held_reads() == 1).await;

    // replay of a wave the snapshot already holds, then a wave mined after the snapshot block
    wallet.emit_new_wave(ALICE, 1000, "hi", Some(history_block));
    wallet.mine_wave(BOB, 2000, "yo");
    settle().await;
    assert!(portal.waves().is_empty());

    wallet.release_history();
    start.await.unwrap();
    wait_for_waves(portal.wave_list(), 2).await;
    settle().await;

    assert_eq!(portal.waves(), vec![wave(ALICE, 1000, "hi"), wave(BOB, 2000, "yo")]);
    assert_eq!(portal.wave_list().snapshot_block(), Some(history_block));
}
