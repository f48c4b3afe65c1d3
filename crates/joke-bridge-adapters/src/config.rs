use alloy::primitives::{Address, U256};

use joke_bridge_core::{
    FlowConfig, NetworkDescriptor, PriceSource, DEFAULT_BRIDGE_PRICE_WEI, DEFAULT_JOKE_PRICE_WEI,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeProfile {
    Development,
    Production,
}

impl RuntimeProfile {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Some(Self::Development),
            "prod" | "production" => Some(Self::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JokeBridgeConfig {
    pub runtime_profile: RuntimeProfile,
    /// Wallet bridge speaking EIP-1193 JSON-RPC over HTTP (native only).
    pub eip1193_proxy_url: Option<String>,
    pub required_network: NetworkDescriptor,
    pub service_contract: Address,
    pub nft_contract: Address,
    pub explorer_tx_base_url: String,
    /// `None` reads `serviceCost()` and falls back to the default joke price.
    pub joke_price_wei: Option<U256>,
    pub bridge_price_wei: U256,
    pub joke_api_url: Option<String>,
    pub notify_url: Option<String>,
    pub notify_command_template: String,
    pub receipt_timeout_ms: u64,
    pub receipt_poll_interval_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for JokeBridgeConfig {
    fn default() -> Self {
        let flow = FlowConfig::default();
        Self {
            runtime_profile: RuntimeProfile::Development,
            eip1193_proxy_url: None,
            required_network: flow.required_network,
            service_contract: flow.service_address,
            nft_contract: flow.nft_address,
            explorer_tx_base_url: flow.explorer_tx_base_url,
            joke_price_wei: None,
            bridge_price_wei: U256::from(DEFAULT_BRIDGE_PRICE_WEI),
            joke_api_url: Some("https://official-joke-api.appspot.com/random_joke".to_owned()),
            notify_url: Some("http://localhost:3000/execute-command".to_owned()),
            notify_command_template: "just send-nft-info \"{joke}\"".to_owned(),
            receipt_timeout_ms: 120_000,
            receipt_poll_interval_ms: 1_000,
            request_timeout_ms: 15_000,
        }
    }
}

impl JokeBridgeConfig {
    /// Defaults overridden by `JOKE_BRIDGE_*` environment variables. Unparseable
    /// values are logged and ignored; an empty URL variable disables that runtime.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        let get = |name: &str| lookup(&format!("JOKE_BRIDGE_{name}"));

        if let Some(raw) = get("PROFILE") {
            match RuntimeProfile::parse(&raw) {
                Some(profile) => cfg.runtime_profile = profile,
                None => tracing::warn!(value = %raw, "unknown JOKE_BRIDGE_PROFILE, keeping development"),
            }
        }
        if let Some(raw) = get("EIP1193_PROXY_URL") {
            cfg.eip1193_proxy_url = non_empty(raw);
        }
        parse_into(get("SERVICE_CONTRACT"), "SERVICE_CONTRACT", &mut cfg.service_contract);
        parse_into(get("NFT_CONTRACT"), "NFT_CONTRACT", &mut cfg.nft_contract);
        cfg.required_network = network_from_lookup(&get, cfg.required_network);
        if let Some(url) = get("EXPLORER_URL").and_then(non_empty) {
            cfg.explorer_tx_base_url = url;
        }
        if let Some(raw) = get("JOKE_PRICE_WEI") {
            let mut price = U256::ZERO;
            if parse_into(Some(raw), "JOKE_PRICE_WEI", &mut price) {
                cfg.joke_price_wei = Some(price);
            }
        }
        parse_into(get("BRIDGE_PRICE_WEI"), "BRIDGE_PRICE_WEI", &mut cfg.bridge_price_wei);
        if let Some(raw) = get("JOKE_API_URL") {
            cfg.joke_api_url = non_empty(raw);
        }
        if let Some(raw) = get("NOTIFY_URL") {
            cfg.notify_url = non_empty(raw);
        }
        parse_into(
            get("RECEIPT_TIMEOUT_MS"),
            "RECEIPT_TIMEOUT_MS",
            &mut cfg.receipt_timeout_ms,
        );
        parse_into(
            get("RECEIPT_POLL_INTERVAL_MS"),
            "RECEIPT_POLL_INTERVAL_MS",
            &mut cfg.receipt_poll_interval_ms,
        );
        parse_into(
            get("REQUEST_TIMEOUT_MS"),
            "REQUEST_TIMEOUT_MS",
            &mut cfg.request_timeout_ms,
        );
        cfg
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }

    pub fn flow_config(&self) -> FlowConfig {
        let joke_price = match self.joke_price_wei {
            Some(wei) => PriceSource::Fixed(wei),
            None => PriceSource::ServiceCost {
                fallback: U256::from(DEFAULT_JOKE_PRICE_WEI),
            },
        };
        FlowConfig {
            required_network: self.required_network.clone(),
            service_address: self.service_contract,
            nft_address: self.nft_contract,
            joke_price,
            bridge_price: PriceSource::Fixed(self.bridge_price_wei),
            explorer_tx_base_url: self.explorer_tx_base_url.clone(),
        }
    }
}

/// A different chain id is only taken together with its own name and RPC URL,
/// so `wallet_addEthereumChain` never registers a mixed descriptor.
fn network_from_lookup(
    get: &impl Fn(&str) -> Option<String>,
    default: NetworkDescriptor,
) -> NetworkDescriptor {
    let mut chain_id = default.chain_id;
    parse_into(get("REQUIRED_CHAIN_ID"), "REQUIRED_CHAIN_ID", &mut chain_id);
    let chain_name = get("CHAIN_NAME").and_then(non_empty);
    let rpc_url = get("RPC_URL").and_then(non_empty);
    let chain_explorer = get("CHAIN_EXPLORER_URL").and_then(non_empty);

    if chain_id == default.chain_id {
        let mut network = default;
        if let Some(name) = chain_name {
            network.chain_name = name;
        }
        if let Some(url) = rpc_url {
            network.rpc_urls = vec![url];
        }
        if let Some(url) = chain_explorer {
            network.block_explorer_urls = vec![url];
        }
        return network;
    }

    let (Some(chain_name), Some(rpc_url)) = (chain_name, rpc_url) else {
        tracing::warn!(
            chain_id,
            default_chain_id = default.chain_id,
            "JOKE_BRIDGE_REQUIRED_CHAIN_ID needs JOKE_BRIDGE_CHAIN_NAME and JOKE_BRIDGE_RPC_URL, keeping the default network"
        );
        return default;
    };
    NetworkDescriptor {
        chain_id,
        chain_name,
        native_currency: default.native_currency,
        rpc_urls: vec![rpc_url],
        block_explorer_urls: chain_explorer.into_iter().collect(),
    }
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn parse_into<T>(raw: Option<String>, name: &str, slot: &mut T) -> bool
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = raw else {
        return false;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => {
            *slot = value;
            true
        }
        Err(e) => {
            tracing::warn!(var = name, value = %raw, error = %e, "ignoring invalid JOKE_BRIDGE setting");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_keeps_defaults() {
        let cfg = JokeBridgeConfig::from_lookup(|_| None);
        assert_eq!(cfg.runtime_profile, RuntimeProfile::Development);
        assert_eq!(cfg.flow_config(), FlowConfig::default());
    }

    #[test]
    fn overrides_are_applied_and_bad_values_ignored() {
        let cfg = JokeBridgeConfig::from_lookup(lookup(&[
            ("JOKE_BRIDGE_PROFILE", "production"),
            ("JOKE_BRIDGE_JOKE_PRICE_WEI", "7"),
            ("JOKE_BRIDGE_BRIDGE_PRICE_WEI", "not-a-number"),
            ("JOKE_BRIDGE_NOTIFY_URL", ""),
            ("JOKE_BRIDGE_REQUIRED_CHAIN_ID", "10"),
            ("JOKE_BRIDGE_CHAIN_NAME", "OP Mainnet"),
            ("JOKE_BRIDGE_RPC_URL", "https://mainnet.optimism.io"),
        ]));
        assert!(cfg.strict_runtime_required());
        assert_eq!(cfg.notify_url, None);
        let flow = cfg.flow_config();
        assert_eq!(flow.joke_price, PriceSource::Fixed(U256::from(7u64)));
        assert_eq!(
            flow.bridge_price,
            PriceSource::Fixed(U256::from(DEFAULT_BRIDGE_PRICE_WEI))
        );
        assert_eq!(flow.required_network.chain_id, 10);
        assert_eq!(flow.required_network.chain_name, "OP Mainnet");
        assert_eq!(
            flow.required_network.rpc_urls,
            vec!["https://mainnet.optimism.io".to_owned()]
        );
        assert!(flow.required_network.block_explorer_urls.is_empty());
    }

    #[test]
    fn chain_id_without_name_and_rpc_keeps_default_network() {
        let cfg = JokeBridgeConfig::from_lookup(lookup(&[
            ("JOKE_BRIDGE_REQUIRED_CHAIN_ID", "10"),
            ("JOKE_BRIDGE_RPC_URL", "https://mainnet.optimism.io"),
        ]));
        assert_eq!(cfg.required_network, NetworkDescriptor::op_sepolia());
    }

    #[test]
    fn same_chain_accepts_partial_overrides() {
        let cfg = JokeBridgeConfig::from_lookup(lookup(&[(
            "JOKE_BRIDGE_RPC_URL",
            "https://rpc.example.invalid",
        )]));
        assert_eq!(cfg.required_network.chain_id, NetworkDescriptor::op_sepolia().chain_id);
        assert_eq!(cfg.required_network.chain_name, "OP Sepolia");
        assert_eq!(
            cfg.required_network.rpc_urls,
            vec!["https://rpc.example.invalid".to_owned()]
        );
    }
}
