mod common;

use alloy::primitives::{Address, U256};
use common::*;
use reward_claimer::adapters::ChainClient;
use reward_claimer::config::AppConfig;
use reward_claimer::coordination::{bootstrap, AutoOperator};
use reward_claimer::domain::BASE;
use reward_claimer::error::ClaimError;
use reward_claimer::strategy::EndpointSelector;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

fn candidates() -> Vec<String> {
    BASE.rpc_urls.iter().map(|u| u.to_string()).collect()
}

#[tokio::test]
async fn selects_first_matching_endpoint_and_stops_trying() {
    let urls = candidates();
    // 0: refused, 1: wrong chain, 2: match, 3: also a match
    let connector = FakeConnector::new(vec![
        (
            urls[1].clone(),
            Arc::new(FakeChain::on_chain(&urls[1], 1)) as Arc<dyn ChainClient>,
        ),
        (
            urls[2].clone(),
            Arc::new(FakeChain::on_chain(&urls[2], BASE.chain_id)) as Arc<dyn ChainClient>,
        ),
        (
            urls[3].clone(),
            Arc::new(FakeChain::on_chain(&urls[3], BASE.chain_id)) as Arc<dyn ChainClient>,
        ),
    ]);

    let selected = EndpointSelector::new(&connector)
        .select(&BASE, &urls)
        .await
        .unwrap();

    assert_eq!(selected.index, 2);
    assert_eq!(selected.client.endpoint(), urls[2]);
    assert_eq!(connector.tried(), urls[..3].to_vec());
}

#[tokio::test]
async fn all_endpoints_failing_is_reported() {
    let urls = candidates();
    let connector = FakeConnector::default();

    let err = assert_err!(EndpointSelector::new(&connector).select(&BASE, &urls).await);

    match err {
        ClaimError::NoAvailableEndpoint { network, tried } => {
            assert_eq!(network, "base");
            assert_eq!(tried, 4);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(connector.tried().len(), 4);
}

#[tokio::test]
async fn bootstrap_stops_when_no_endpoint_answers() {
    let config = AppConfig::default();
    let connector = Arc::new(FakeConnector::default());
    let source = Arc::new(FakeSource::new(entries(2), Ledger::default()));

    let result = bootstrap(
        &config,
        Address::repeat_byte(0x42),
        connector.clone(),
        source.clone(),
        &AutoOperator::approving(),
    )
    .await;

    let err = result.err().expect("bootstrap should fail");
    assert!(matches!(err, ClaimError::NoAvailableEndpoint { .. }));
    assert!(err.is_fatal_at_startup());
    assert_eq!(connector.tried().len(), 4);
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn preferred_rpc_is_tried_first() {
    let mut config = AppConfig::default();
    config.rpc_url = Some("http://my-node:8545".to_string());

    let ledger = Ledger::default();
    let node = Arc::new(FakeChain::new(
        "http://my-node:8545",
        unit_cost() * U256::from(5u64),
        ledger.clone(),
    ));
    let connector = Arc::new(FakeConnector::new(vec![(
        "http://my-node:8545".to_string(),
        node as Arc<dyn ChainClient>,
    )]));
    let source = Arc::new(FakeSource::new(Vec::new(), ledger));

    let claimer = assert_ok!(
        bootstrap(
            &config,
            Address::repeat_byte(0x42),
            connector.clone(),
            source,
            &AutoOperator::approving(),
        )
        .await
    );

    assert_eq!(claimer.context().endpoint(), "http://my-node:8545");
    assert_eq!(connector.tried(), vec!["http://my-node:8545".to_string()]);
    assert_eq!(claimer.context().endpoints.len(), 5);
}

#[tokio::test]
async fn declined_low_balance_aborts_startup() {
    let urls = candidates();
    let connector = Arc::new(FakeConnector::new(vec![(
        urls[0].clone(),
        Arc::new(FakeChain::on_chain(&urls[0], BASE.chain_id)) as Arc<dyn ChainClient>,
    )]));
    let source = Arc::new(FakeSource::new(entries(1), Ledger::default()));

    // Approves the address, then declines to continue on an empty wallet
    struct Cautious;
    impl reward_claimer::coordination::Operator for Cautious {
        fn confirm_address(&self, _address: Address) -> bool {
            true
        }
        fn choose_network(&self, _current: &reward_claimer::domain::NetworkInfo) -> Option<String> {
            None
        }
        fn provide_contract_address(
            &self,
            _network: &reward_claimer::domain::NetworkInfo,
        ) -> Option<String> {
            None
        }
        fn confirm_low_balance(
            &self,
            _check: Option<&reward_claimer::strategy::FundsCheck>,
        ) -> bool {
            false
        }
    }

    let result = bootstrap(
        &AppConfig::default(),
        Address::repeat_byte(0x42),
        connector,
        source,
        &Cautious,
    )
    .await;

    assert!(matches!(result.err(), Some(ClaimError::Aborted(_))));
}
