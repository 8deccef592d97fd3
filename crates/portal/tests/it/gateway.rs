//! Contract gateway tests.

use crate::utils::{GAS_LIMIT, wave};
use alloy_primitives::{Address, TxKind, U256};
use alloy_sol_types::SolCall;
use similar_asserts::assert_eq;
use wave_portal::{
    ContractGateway, GatewayError, LiveWave, ProviderError, SessionManager, WaveList,
    abi::IWavePortal,
};
use wave_test_utils::{ALICE, BOB, MockWallet, WAVE_PORTAL, init_tracing};

fn gateway(wallet: &MockWallet, session: &SessionManager, waves: &WaveList) -> ContractGateway {
    ContractGateway::new(
        WAVE_PORTAL,
        Some(wallet.shared()),
        session.handle(),
        waves.clone(),
        GAS_LIMIT,
    )
}

#[tokio::test]
async fn offline_gateway_touches_nothing() {
    init_tracing();
    let waves = WaveList::new();
    waves.push_live(LiveWave { wave: wave(ALICE, 1000, "hi"), block_number: None });
    let session = SessionManager::new(None);
    let gateway = ContractGateway::new(WAVE_PORTAL, None, session.handle(), waves.clone(), 1);

    assert!(!gateway.is_online());
    assert!(matches!(gateway.get_total_count().await, Err(GatewayError::Offline)));
    assert!(matches!(gateway.submit_interaction("hi").await, Err(GatewayError::Offline)));
    assert!(matches!(gateway.fetch_all_interactions().await, Err(GatewayError::Offline)));
    assert_eq!(waves.snapshot(), vec![wave(ALICE, 1000, "hi")]);
    assert_eq!(waves.snapshot_block(), None);
}

#[tokio::test]
async fn counts_waves() {
    init_tracing();
    let wallet = MockWallet::new();
    wallet.mine_wave(ALICE, 1000, "hi");
    wallet.mine_wave(BOB, 1001, "yo");
    let session = SessionManager::new(Some(wallet.shared()));
    let gateway = gateway(&wallet, &session, &WaveList::new());

    assert_eq!(gateway.get_total_count().await.unwrap(), U256::from(2));
}

#[tokio::test]
async fn fetch_replaces_the_list() {
    init_tracing();
    let wallet = MockWallet::new();
    wallet.mine_wave(ALICE, 1000, "hi");
    wallet.mine_wave(BOB, 2000, "yo");
    let waves = WaveList::new();
    waves.push_live(LiveWave { wave: wave(BOB, 5, "stale"), block_number: None });
    let session = SessionManager::new(Some(wallet.shared()));
    let gateway = gateway(&wallet, &session, &waves);

    assert_eq!(gateway.fetch_all_interactions().await.unwrap(), 2);
    assert_eq!(waves.snapshot(), vec![wave(ALICE, 1000, "hi"), wave(BOB, 2000, "yo")]);
    assert_eq!(waves.snapshot_block(), Some(wallet.current_block()));
}

#[tokio::test]
async fn fetch_of_empty_history() {
    init_tracing();
    let wallet = MockWallet::new();
    let waves = WaveList::new();
    let session = SessionManager::new(Some(wallet.shared()));

    assert_eq!(gateway(&wallet, &session, &waves).fetch_all_interactions().await.unwrap(), 0);
    assert!(waves.is_empty());
    assert_eq!(waves.snapshot_block(), Some(1));
}

#[tokio::test]
async fn submits_from_the_session_account() {
    init_tracing();
    let wallet = MockWallet::new().with_accounts([ALICE, BOB]);
    let waves = WaveList::new();
    let session = SessionManager::new(Some(wallet.shared()));
    session.request_connection().await.unwrap();
    let gateway = gateway(&wallet, &session, &waves);

    let pending = gateway.submit_interaction("gm").await.unwrap();
    let tx_hash = pending.tx_hash();
    assert_eq!(pending.confirm().await.unwrap(), tx_hash);

    let sent = wallet.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, Some(ALICE));
    assert_eq!(sent[0].to, Some(TxKind::Call(WAVE_PORTAL)));
    assert_eq!(sent[0].gas, Some(GAS_LIMIT));
    let call = IWavePortal::waveCall::abi_decode(sent[0].input.input().unwrap(), true).unwrap();
    assert_eq!(call._message, "gm");

    // no optimistic entry, the wave arrives through the live feed
    assert!(waves.is_empty());
    assert_eq!(wallet.stored_waves().len(), 1);
}

#[tokio::test]
async fn submits_from_first_wallet_account_without_session() {
    init_tracing();
    let wallet = MockWallet::new().with_accounts([BOB]).authorized();
    let session = SessionManager::new(Some(wallet.shared()));
    let gateway = gateway(&wallet, &session, &WaveList::new());

    gateway.submit_interaction("yo").await.unwrap().confirm().await.unwrap();
    assert_eq!(wallet.sent_transactions()[0].from, Some(BOB));
}

#[tokio::test]
async fn submit_needs_a_signer() {
    init_tracing();
    let wallet = MockWallet::new();
    let session = SessionManager::new(Some(wallet.shared()));
    let gateway = gateway(&wallet, &session, &WaveList::new());

    assert!(matches!(gateway.submit_interaction("hi").await, Err(GatewayError::NoSigner)));
    assert!(wallet.sent_transactions().is_empty());
}

#[tokio::test]
async fn reverted_wave_is_not_confirmed() {
    init_tracing();
    let wallet = MockWallet::new().authorized();
    wallet.set_revert_waves(true);
    let session = SessionManager::new(Some(wallet.shared()));
    let gateway = gateway(&wallet, &session, &WaveList::new());

    let pending = gateway.submit_interaction("hi").await.unwrap();
    let tx_hash = pending.tx_hash();
    assert!(matches!(pending.confirm().await, Err(GatewayError::Reverted(hash)) if hash == tx_hash));
    assert!(wallet.stored_waves().is_empty());
}

#[tokio::test]
async fn malformed_response_is_a_decode_error() {
    init_tracing();
    let wallet = MockWallet::new().at(Address::with_last_byte(0x42));
    let waves = WaveList::new();
    let session = SessionManager::new(Some(wallet.shared()));
    let gateway = gateway(&wallet, &session, &waves);

    assert!(matches!(gateway.get_total_count().await, Err(GatewayError::Decode(_))));
    assert!(matches!(gateway.fetch_all_interactions().await, Err(GatewayError::Decode(_))));
    assert_eq!(waves.snapshot_block(), None);
}

#[tokio::test]
async fn out_of_range_timestamp_fails_the_fetch() {
    init_tracing();
    let wallet = MockWallet::new();
    wallet.mine_wave(ALICE, 1000, "hi");
    wallet.mine_wave(BOB, u64::MAX, "from the future");
    let waves = WaveList::new();
    let session = SessionManager::new(Some(wallet.shared()));
    let gateway = gateway(&wallet, &session, &waves);

    let err = gateway.fetch_all_interactions().await.unwrap_err();
    assert!(matches!(err, GatewayError::InvalidTimestamp(_)), "{err}");
    assert!(waves.is_empty());

    // the failed fetch no longer holds back live waves
    waves.push_live(LiveWave { wave: wave(ALICE, 1, "after"), block_number: Some(9) });
    assert_eq!(waves.len(), 1);
}

#[tokio::test]
async fn network_failure_is_a_provider_error() {
    init_tracing();
    let wallet = MockWallet::new().authorized();
    let session = SessionManager::new(Some(wallet.shared()));
    let gateway = gateway(&wallet, &session, &WaveList::new());
    wallet.set_offline(true);

    assert!(matches!(
        gateway.get_total_count().await,
        Err(GatewayError::Provider(ProviderError::Other(_)))
    ));
    assert!(matches!(gateway.submit_interaction("hi").await, Err(GatewayError::Provider(_))));
}
