mod common;

use joke_bridge_core::{FlowError, NetworkDescriptor, NetworkGuard, NetworkOutcome};

use common::ScriptedProvider;

fn guard() -> NetworkGuard {
    NetworkGuard::new(NetworkDescriptor::op_sepolia())
}

#[tokio::test]
async fn already_on_required_chain_makes_no_wallet_requests() {
    let provider = ScriptedProvider::default();
    let outcome = guard().ensure_network(&provider).await.expect("ensure");
    assert_eq!(outcome, NetworkOutcome::AlreadyOnNetwork);
    assert_eq!(provider.count("wallet_switchEthereumChain"), 0);
    assert_eq!(provider.count("wallet_addEthereumChain"), 0);
}

#[tokio::test]
async fn known_chain_is_switched_directly() {
    let provider = ScriptedProvider::with(|s| s.chain_id = 1);
    let outcome = guard().ensure_network(&provider).await.expect("ensure");
    assert_eq!(outcome, NetworkOutcome::Switched);
    assert_eq!(
        provider.calls(),
        vec!["eth_chainId", "wallet_switchEthereumChain:11155420"]
    );
}

#[tokio::test]
async fn unknown_chain_is_added_then_switched() {
    let provider = ScriptedProvider::with(|s| {
        s.chain_id = 1;
        s.known_chains = vec![1];
    });
    let outcome = guard().ensure_network(&provider).await.expect("ensure");
    assert_eq!(outcome, NetworkOutcome::AddedThenSwitched);
    assert_eq!(
        provider.calls(),
        vec![
            "eth_chainId",
            "wallet_switchEthereumChain:11155420",
            "wallet_addEthereumChain:11155420",
            "wallet_switchEthereumChain:11155420",
        ]
    );
    assert_eq!(provider.script.lock().expect("lock").chain_id, 11_155_420);
}

#[tokio::test]
async fn rejected_switch_is_unswitchable_without_add() {
    let provider = ScriptedProvider::with(|s| {
        s.chain_id = 1;
        s.reject_switch = true;
    });
    let err = guard().ensure_network(&provider).await.expect_err("must fail");
    assert!(matches!(
        err,
        FlowError::Unswitchable {
            required: 11_155_420,
            ..
        }
    ));
    assert_eq!(provider.count("wallet_addEthereumChain"), 0);
}

#[tokio::test]
async fn rejected_add_is_unswitchable_and_not_retried() {
    let provider = ScriptedProvider::with(|s| {
        s.chain_id = 1;
        s.known_chains = vec![1];
        s.reject_add = true;
    });
    let err = guard().ensure_network(&provider).await.expect_err("must fail");
    assert!(matches!(err, FlowError::Unswitchable { .. }));
    assert_eq!(provider.count("wallet_addEthereumChain"), 1);
    assert_eq!(provider.count("wallet_switchEthereumChain"), 1);
}
