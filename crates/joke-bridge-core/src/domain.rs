use std::sync::Arc;

use alloy::json_abi::JsonAbi;
use alloy::primitives::{address, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type TokenId = U256;

/// OP Sepolia, the chain the deployed contract pair lives on.
pub const OP_SEPOLIA_CHAIN_ID: u64 = 11_155_420;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JokePayload {
    pub setup: String,
    pub punchline: String,
}

impl JokePayload {
    pub fn new(setup: impl Into<String>, punchline: impl Into<String>) -> Self {
        Self {
            setup: setup.into(),
            punchline: punchline.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.setup.trim().is_empty() && !self.punchline.trim().is_empty()
    }

    /// Single-token form stored on chain: every space-separated piece of
    /// `"{setup} ___ {punchline}"` followed by `_`.
    pub fn token_uri(&self) -> String {
        format!("{} ___ {}", self.setup, self.punchline)
            .split(' ')
            .fold(String::new(), |mut out, piece| {
                out.push_str(piece);
                out.push('_');
                out
            })
    }

    pub fn notification_text(&self) -> String {
        format!("{}___{}", self.setup, self.punchline)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub chain_id: u64,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl NetworkDescriptor {
    pub fn op_sepolia() -> Self {
        Self {
            chain_id: OP_SEPOLIA_CHAIN_ID,
            chain_name: "OP Sepolia".to_owned(),
            native_currency: NativeCurrency {
                name: "Ether".to_owned(),
                symbol: "ETH".to_owned(),
                decimals: 18,
            },
            rpc_urls: vec!["https://sepolia.optimism.io".to_owned()],
            block_explorer_urls: vec!["https://sepolia-optimism.etherscan.io".to_owned()],
        }
    }

    pub fn chain_id_hex(&self) -> String {
        chain_id_hex(self.chain_id)
    }

    /// Parameter object for `wallet_addEthereumChain`.
    pub fn add_chain_params(&self) -> Value {
        serde_json::json!({
            "chainId": self.chain_id_hex(),
            "chainName": self.chain_name,
            "nativeCurrency": self.native_currency,
            "rpcUrls": self.rpc_urls,
            "blockExplorerUrls": self.block_explorer_urls,
        })
    }
}

pub fn chain_id_hex(chain_id: u64) -> String {
    format!("0x{chain_id:x}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractKind {
    Service,
    Nft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractHandle {
    pub kind: ContractKind,
    pub address: Address,
    pub(crate) abi: Arc<JsonAbi>,
}

impl ContractHandle {
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl CallRequest {
    /// Transaction object as the wallet JSON-RPC surface expects it.
    pub fn to_rpc_json(&self) -> Value {
        let mut tx = serde_json::json!({
            "from": self.from.to_string(),
            "to": self.to.to_string(),
            "data": self.data.to_string(),
        });
        if !self.value.is_zero() {
            tx["value"] = Value::String(format!("0x{:x}", self.value));
        }
        tx
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub tx_hash: B256,
    pub success: bool,
    pub block_number: Option<u64>,
    pub logs: Vec<ReceiptLog>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account: Address,
    pub chain_id: u64,
    pub service: ContractHandle,
    pub nft: ContractHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToken {
    pub token_id: TokenId,
    /// Account that minted the token; only it can bridge it.
    pub owner: Address,
    pub joke: JokePayload,
    pub mint_tx: B256,
    /// Set once the priced bridge call for this token has confirmed.
    pub bridge_payment: Option<B256>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedToken {
    pub token_id: TokenId,
    pub tx_hash: B256,
    pub explorer_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOutcome {
    pub token_id: TokenId,
    pub payment_tx: B256,
    pub burn_tx: B256,
    pub notified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkOutcome {
    AlreadyOnNetwork,
    Switched,
    AddedThenSwitched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Fixed(U256),
    /// Read `serviceCost()` from the service contract, falling back when the read fails.
    ServiceCost { fallback: U256 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    pub required_network: NetworkDescriptor,
    pub service_address: Address,
    pub nft_address: Address,
    pub joke_price: PriceSource,
    pub bridge_price: PriceSource,
    pub explorer_tx_base_url: String,
}

/// 0.0001 ETH
pub const DEFAULT_JOKE_PRICE_WEI: u64 = 100_000_000_000_000;
/// 0.0005 ETH
pub const DEFAULT_BRIDGE_PRICE_WEI: u64 = 500_000_000_000_000;

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            required_network: NetworkDescriptor::op_sepolia(),
            service_address: address!("dd1060a36c7933bce29e86693678a6b4a62cb709"),
            nft_address: address!("f3d961368738c109e4859acf4849309757f97428"),
            joke_price: PriceSource::ServiceCost {
                fallback: U256::from(DEFAULT_JOKE_PRICE_WEI),
            },
            bridge_price: PriceSource::Fixed(U256::from(DEFAULT_BRIDGE_PRICE_WEI)),
            explorer_tx_base_url: "https://optimism-sepolia.blockscout.com/tx/".to_owned(),
        }
    }
}

impl FlowConfig {
    pub fn explorer_tx_url(&self, tx_hash: B256) -> String {
        format!("{}{}", self.explorer_tx_base_url, tx_hash)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlowStatus {
    pub connected: bool,
    pub account: Option<Address>,
    pub armed_token: Option<TokenId>,
    pub current_joke: Option<JokePayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_uri_matches_underscore_encoding() {
        let joke = JokePayload::new("Why did it?", "Because.");
        assert_eq!(joke.token_uri(), "Why_did_it?_____Because._");
    }

    #[test]
    fn notification_text_joins_with_triple_underscore() {
        let joke = JokePayload::new("a b", "c");
        assert_eq!(joke.notification_text(), "a b___c");
    }

    #[test]
    fn add_chain_params_use_hex_chain_id() {
        let params = NetworkDescriptor::op_sepolia().add_chain_params();
        assert_eq!(params["chainId"], "0xaa37dc");
        assert_eq!(params["nativeCurrency"]["decimals"], 18);
        assert_eq!(params["rpcUrls"][0], "https://sepolia.optimism.io");
    }

    #[test]
    fn default_addresses_match_deployment() {
        let cfg = FlowConfig::default();
        let service: Address = "0xdd1060a36c7933bce29e86693678a6b4a62cb709"
            .parse()
            .expect("service address");
        let nft: Address = "0xf3d961368738c109e4859acf4849309757f97428"
            .parse()
            .expect("nft address");
        assert_eq!(cfg.service_address, service);
        assert_eq!(cfg.nft_address, nft);
    }
}
