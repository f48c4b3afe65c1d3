#![allow(dead_code)]

use alloy::primitives::Address;

use joke_bridge_adapters::{
    CommandNotifier, Eip1193Adapter, JokeApiAdapter, JokeBridgeConfig, RuntimeProfile,
};
use joke_bridge_core::{JokePayload, Orchestrator};

pub type TestOrchestrator = Orchestrator<Eip1193Adapter, CommandNotifier, JokeApiAdapter>;

/// Development profile with every outbound runtime switched off.
pub fn offline_config() -> JokeBridgeConfig {
    JokeBridgeConfig {
        runtime_profile: RuntimeProfile::Development,
        eip1193_proxy_url: None,
        joke_api_url: None,
        notify_url: None,
        receipt_timeout_ms: 30,
        receipt_poll_interval_ms: 10,
        request_timeout_ms: 5_000,
        ..JokeBridgeConfig::default()
    }
}

pub fn sample_joke() -> JokePayload {
    JokePayload::new("What do you call a fake noodle?", "An impasta.")
}

pub fn new_orchestrator() -> TestOrchestrator {
    let config = offline_config();
    Orchestrator::new(
        Eip1193Adapter::with_config(config.clone()),
        CommandNotifier::with_config(&config),
        JokeApiAdapter::fixed(vec![sample_joke()]),
        config.flow_config(),
    )
}

pub fn wallet_account() -> Address {
    "0x1000000000000000000000000000000000000001"
        .parse()
        .expect("valid account")
}
