use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{address, keccak256, Address, Bytes, B256, U256};
use serde::Deserialize;
use serde_json::Value;

use joke_bridge_core::{
    chain_id_hex, CallRequest, ContractBinder, ContractHandle, NetworkDescriptor, PortError,
    ProviderPort, ReceiptLog, TransactionReceipt,
};

use crate::JokeBridgeConfig;

const USER_REJECTED: i64 = 4001;
const UNRECOGNIZED_CHAIN: i64 = 4902;
const EXECUTION_REVERTED: i64 = -32000;

#[derive(Debug, Clone)]
pub struct Eip1193Adapter {
    mode: ProviderMode,
    state: Arc<Mutex<SimulatedWallet>>,
    receipt_timeout_ms: u64,
    receipt_poll_interval_ms: u64,
}

#[derive(Debug, Clone)]
enum ProviderMode {
    Disabled(String),
    Deterministic,
    #[cfg(not(target_arch = "wasm32"))]
    Proxy(ProxyRuntime),
    #[cfg(target_arch = "wasm32")]
    Browser,
}

#[derive(Debug, Clone)]
#[cfg(not(target_arch = "wasm32"))]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::Client,
}

/// In-process wallet with the service and NFT contracts deployed on the
/// required chain. Starts on mainnet with only mainnet known, so connecting
/// walks the add-then-switch path.
#[derive(Debug)]
struct SimulatedWallet {
    available: bool,
    accounts: Vec<Address>,
    chain_id: u64,
    known_chains: Vec<u64>,
    reject_prompts: bool,
    withhold_receipts: bool,
    contracts: Option<SimulatedContracts>,
    service_cost: U256,
    service_balance: U256,
    owners: BTreeMap<U256, Address>,
    next_token_id: U256,
    nonce: u64,
    receipts: HashMap<B256, Value>,
    requests: Vec<String>,
}

#[derive(Debug)]
struct SimulatedContracts {
    chain_id: u64,
    service: ContractHandle,
    nft: ContractHandle,
}

impl Default for SimulatedWallet {
    fn default() -> Self {
        Self {
            available: true,
            accounts: vec![address!("1000000000000000000000000000000000000001")],
            chain_id: 1,
            known_chains: vec![1],
            reject_prompts: false,
            withhold_receipts: false,
            contracts: None,
            service_cost: U256::from(100_000_000_000_000u64),
            service_balance: U256::ZERO,
            owners: BTreeMap::new(),
            next_token_id: U256::from(1u64),
            nonce: 0,
            receipts: HashMap::new(),
            requests: Vec::new(),
        }
    }
}

impl Default for Eip1193Adapter {
    fn default() -> Self {
        Self::with_config(JokeBridgeConfig::from_env())
    }
}

impl Eip1193Adapter {
    pub fn with_config(config: JokeBridgeConfig) -> Self {
        #[cfg(target_arch = "wasm32")]
        let mode = if browser_provider_available() {
            ProviderMode::Browser
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "EIP-1193 browser provider not found in production runtime profile".to_owned(),
            )
        } else {
            ProviderMode::Deterministic
        };

        #[cfg(not(target_arch = "wasm32"))]
        let mode = if let Some(ref base_url) = config.eip1193_proxy_url {
            let timeout = std::time::Duration::from_millis(config.request_timeout_ms);
            match reqwest::Client::builder().timeout(timeout).build() {
                Ok(client) => ProviderMode::Proxy(ProxyRuntime {
                    base_url: base_url.clone(),
                    client,
                }),
                Err(e) if config.strict_runtime_required() => ProviderMode::Disabled(format!(
                    "failed to initialize EIP-1193 proxy client in production profile: {e}"
                )),
                Err(e) => {
                    tracing::warn!(error = %e, "EIP-1193 proxy client unavailable, using simulated wallet");
                    ProviderMode::Deterministic
                }
            }
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "EIP-1193 proxy URL not configured in production runtime profile".to_owned(),
            )
        } else {
            ProviderMode::Deterministic
        };

        let mut wallet = SimulatedWallet::default();
        let mode = match mode {
            ProviderMode::Deterministic => match SimulatedContracts::deploy(&config) {
                Ok(contracts) => {
                    wallet.contracts = Some(contracts);
                    ProviderMode::Deterministic
                }
                Err(e) => ProviderMode::Disabled(format!("simulated contracts unavailable: {e}")),
            },
            other => other,
        };
        tracing::info!(mode = mode.label(), "EIP-1193 provider configured");

        Self {
            mode,
            state: Arc::new(Mutex::new(wallet)),
            receipt_timeout_ms: config.receipt_timeout_ms,
            receipt_poll_interval_ms: config.receipt_poll_interval_ms.max(1),
        }
    }

    pub fn mode_label(&self) -> &'static str {
        self.mode.label()
    }

    pub fn debug_set_accounts(&self, accounts: Vec<Address>) -> Result<(), PortError> {
        self.wallet()?.accounts = accounts;
        Ok(())
    }

    pub fn debug_set_chain(&self, chain_id: u64) -> Result<(), PortError> {
        let mut g = self.wallet()?;
        g.chain_id = chain_id;
        if !g.known_chains.contains(&chain_id) {
            g.known_chains.push(chain_id);
        }
        Ok(())
    }

    /// Every following prompt is dismissed with code 4001 until reset.
    pub fn debug_reject_prompts(&self, reject: bool) -> Result<(), PortError> {
        self.wallet()?.reject_prompts = reject;
        Ok(())
    }

    pub fn debug_withhold_receipts(&self, withhold: bool) -> Result<(), PortError> {
        self.wallet()?.withhold_receipts = withhold;
        Ok(())
    }

    pub fn debug_remove_provider(&self) -> Result<(), PortError> {
        self.wallet()?.available = false;
        Ok(())
    }

    pub fn debug_requests(&self) -> Result<Vec<String>, PortError> {
        Ok(self.wallet()?.requests.clone())
    }

    pub fn debug_token_owner(&self, token_id: U256) -> Result<Option<Address>, PortError> {
        Ok(self.wallet()?.owners.get(&token_id).copied())
    }

    pub fn debug_service_balance(&self) -> Result<U256, PortError> {
        Ok(self.wallet()?.service_balance)
    }

    fn wallet(&self) -> Result<MutexGuard<'_, SimulatedWallet>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("provider lock poisoned: {e}")))
    }

    /// Single EIP-1193 `request({method, params})` entry point for every mode.
    async fn request(&self, method: &str, params: Value) -> Result<Value, PortError> {
        tracing::debug!(method, %params, "eip1193 request");
        let result = match &self.mode {
            ProviderMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            ProviderMode::Deterministic => {
                let mut wallet = self.wallet()?;
                wallet.handle(method, &params)
            }
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(proxy) => proxy.call(method, params).await,
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => browser_request(method, params).await,
        };
        result
            .map_err(normalize_rpc_error)
            .inspect_err(|e| tracing::debug!(method, error = %e, "eip1193 request failed"))
    }
}

impl ProviderMode {
    fn label(&self) -> &'static str {
        match self {
            Self::Disabled(_) => "disabled",
            Self::Deterministic => "deterministic",
            #[cfg(not(target_arch = "wasm32"))]
            Self::Proxy(_) => "proxy",
            #[cfg(target_arch = "wasm32")]
            Self::Browser => "browser",
        }
    }
}

impl ProviderPort for Eip1193Adapter {
    async fn detect(&self) -> Result<(), PortError> {
        match &self.mode {
            ProviderMode::Disabled(reason) => Err(PortError::NotFound(reason.clone())),
            ProviderMode::Deterministic => {
                if self.wallet()?.available {
                    Ok(())
                } else {
                    Err(PortError::NotFound("window.ethereum missing".to_owned()))
                }
            }
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(_) => Ok(()),
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => browser_provider().map(|_| ()),
        }
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        let result = self
            .request("eth_requestAccounts", serde_json::json!([]))
            .await?;
        let arr = result.as_array().ok_or_else(|| {
            PortError::Transport("eth_requestAccounts: array expected".to_owned())
        })?;
        arr.iter()
            .map(|item| {
                let raw = item.as_str().ok_or_else(|| {
                    PortError::Transport("eth_requestAccounts: string expected".to_owned())
                })?;
                raw.parse()
                    .map_err(|e| PortError::Validation(format!("invalid account address: {e}")))
            })
            .collect()
    }

    async fn chain_id(&self) -> Result<u64, PortError> {
        let result = self.request("eth_chainId", serde_json::json!([])).await?;
        json_chain_id_to_u64(&result)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), PortError> {
        self.request(
            "wallet_switchEthereumChain",
            serde_json::json!([{ "chainId": chain_id_hex(chain_id) }]),
        )
        .await
        .map(|_| ())
        .map_err(|e| match e {
            PortError::Rpc {
                code: UNRECOGNIZED_CHAIN,
                ..
            } => PortError::UnrecognizedChain(chain_id),
            other => other,
        })
    }

    async fn add_chain(&self, network: &NetworkDescriptor) -> Result<(), PortError> {
        self.request(
            "wallet_addEthereumChain",
            serde_json::json!([network.add_chain_params()]),
        )
        .await
        .map(|_| ())
    }

    async fn send_transaction(&self, request: &CallRequest) -> Result<B256, PortError> {
        let result = self
            .request("eth_sendTransaction", serde_json::json!([request.to_rpc_json()]))
            .await?;
        let hash = result.as_str().ok_or_else(|| {
            PortError::Transport("eth_sendTransaction must return hash".to_owned())
        })?;
        hash.parse()
            .map_err(|e| PortError::Validation(format!("invalid tx hash: {e}")))
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, PortError> {
        let attempts = (self.receipt_timeout_ms / self.receipt_poll_interval_ms).max(1);
        for attempt in 0..attempts {
            let result = self
                .request(
                    "eth_getTransactionReceipt",
                    serde_json::json!([tx_hash.to_string()]),
                )
                .await?;
            if !result.is_null() {
                return parse_receipt(result);
            }
            tracing::debug!(%tx_hash, attempt, "receipt not yet available");
            sleep_ms(self.receipt_poll_interval_ms).await;
        }
        Err(PortError::Timeout(format!(
            "no receipt for {tx_hash} after {} ms",
            self.receipt_timeout_ms
        )))
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes, PortError> {
        let result = self
            .request(
                "eth_call",
                serde_json::json!([request.to_rpc_json(), "latest"]),
            )
            .await?;
        let raw = result
            .as_str()
            .ok_or_else(|| PortError::Transport("eth_call must return hex data".to_owned()))?;
        raw.parse()
            .map_err(|e| PortError::Validation(format!("invalid eth_call output: {e}")))
    }
}

impl SimulatedContracts {
    fn deploy(config: &JokeBridgeConfig) -> Result<Self, joke_bridge_core::FlowError> {
        let binder = ContractBinder;
        Ok(Self {
            chain_id: config.required_network.chain_id,
            service: binder.bind_service(config.service_contract)?,
            nft: binder.bind_nft(config.nft_contract)?,
        })
    }
}

impl SimulatedWallet {
    fn handle(&mut self, method: &str, params: &Value) -> Result<Value, PortError> {
        self.requests.push(method.to_owned());
        match method {
            "eth_requestAccounts" => {
                self.prompt()?;
                Ok(serde_json::json!(self
                    .accounts
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()))
            }
            "eth_chainId" => Ok(Value::String(chain_id_hex(self.chain_id))),
            "wallet_switchEthereumChain" => {
                self.prompt()?;
                let requested = json_chain_id_to_u64(&params[0]["chainId"])?;
                if !self.known_chains.contains(&requested) {
                    return Err(rpc_error(
                        UNRECOGNIZED_CHAIN,
                        format!("Unrecognized chain ID {}", chain_id_hex(requested)),
                    ));
                }
                self.chain_id = requested;
                Ok(Value::Null)
            }
            "wallet_addEthereumChain" => {
                self.prompt()?;
                let added = json_chain_id_to_u64(&params[0]["chainId"])?;
                if !self.known_chains.contains(&added) {
                    self.known_chains.push(added);
                }
                Ok(Value::Null)
            }
            "eth_sendTransaction" => {
                self.prompt()?;
                let tx = SimulatedTx::parse(&params[0])?;
                self.execute(tx)
            }
            "eth_getTransactionReceipt" => {
                if self.withhold_receipts {
                    return Ok(Value::Null);
                }
                let hash: B256 = params[0]
                    .as_str()
                    .unwrap_or_default()
                    .parse()
                    .map_err(|e| PortError::Validation(format!("invalid tx hash: {e}")))?;
                Ok(self.receipts.get(&hash).cloned().unwrap_or(Value::Null))
            }
            "eth_call" => {
                let tx = SimulatedTx::parse(&params[0])?;
                self.view(&tx)
            }
            other => Err(rpc_error(-32601, format!("method {other} not supported"))),
        }
    }

    fn prompt(&self) -> Result<(), PortError> {
        if self.reject_prompts {
            return Err(rpc_error(USER_REJECTED, "User rejected the request."));
        }
        Ok(())
    }

    fn deployed(&self) -> Result<&SimulatedContracts, PortError> {
        self.contracts
            .as_ref()
            .filter(|c| c.chain_id == self.chain_id)
            .ok_or_else(|| {
                rpc_error(
                    EXECUTION_REVERTED,
                    format!("no contracts deployed on chain {}", self.chain_id),
                )
            })
    }

    fn execute(&mut self, tx: SimulatedTx) -> Result<Value, PortError> {
        let contracts = self.deployed()?;
        let (service, nft) = (contracts.service.clone(), contracts.nft.clone());

        self.nonce += 1;
        let mut seed = tx.from.to_vec();
        seed.extend_from_slice(&self.nonce.to_be_bytes());
        let tx_hash = keccak256(seed);

        let transfer = nft.event_topic("Transfer").map_err(binding_error)?;
        let mut logs = Vec::new();
        let success = if tx.to == service.address
            && tx.selector() == Some(service.selector("payService").map_err(binding_error)?)
        {
            let paid = tx.value >= self.service_cost;
            if paid {
                self.service_balance += tx.value;
            }
            paid
        } else if tx.to == nft.address
            && tx.selector() == Some(nft.selector("mint").map_err(binding_error)?)
        {
            let token_id = self.next_token_id;
            self.next_token_id += U256::from(1u64);
            self.owners.insert(token_id, tx.from);
            logs.push(transfer_log(nft.address, transfer, Address::ZERO, tx.from, token_id));
            true
        } else if tx.to == nft.address
            && tx.selector() == Some(nft.selector("burn").map_err(binding_error)?)
        {
            match tx.word_arg(0) {
                Some(token_id) if self.owners.get(&token_id) == Some(&tx.from) => {
                    self.owners.remove(&token_id);
                    logs.push(transfer_log(nft.address, transfer, tx.from, Address::ZERO, token_id));
                    true
                }
                _ => false,
            }
        } else {
            false
        };

        self.receipts.insert(
            tx_hash,
            serde_json::json!({
                "transactionHash": tx_hash.to_string(),
                "status": if success { "0x1" } else { "0x0" },
                "blockNumber": format!("0x{:x}", self.nonce),
                "logs": logs,
            }),
        );
        Ok(Value::String(tx_hash.to_string()))
    }

    fn view(&self, tx: &SimulatedTx) -> Result<Value, PortError> {
        let contracts = self.deployed()?;
        let service = &contracts.service;
        if tx.to == service.address {
            if tx.selector() == Some(service.selector("serviceCost").map_err(binding_error)?) {
                return Ok(uint_word(self.service_cost));
            }
            if tx.selector() == Some(service.selector("getContractBalance").map_err(binding_error)?)
            {
                return Ok(uint_word(self.service_balance));
            }
        }
        Err(rpc_error(EXECUTION_REVERTED, "execution reverted"))
    }
}

struct SimulatedTx {
    from: Address,
    to: Address,
    value: U256,
    data: Bytes,
}

impl SimulatedTx {
    fn parse(tx: &Value) -> Result<Self, PortError> {
        let field = |name: &str| {
            tx.get(name)
                .and_then(Value::as_str)
                .ok_or_else(|| PortError::Validation(format!("transaction field {name} missing")))
        };
        let value = match tx.get("value").and_then(Value::as_str) {
            Some(raw) => U256::from_str_radix(raw.trim_start_matches("0x"), 16)
                .map_err(|e| PortError::Validation(format!("invalid value: {e}")))?,
            None => U256::ZERO,
        };
        Ok(Self {
            from: field("from")?
                .parse()
                .map_err(|e| PortError::Validation(format!("invalid from: {e}")))?,
            to: field("to")?
                .parse()
                .map_err(|e| PortError::Validation(format!("invalid to: {e}")))?,
            value,
            data: field("data")?
                .parse()
                .map_err(|e| PortError::Validation(format!("invalid data: {e}")))?,
        })
    }

    fn selector(&self) -> Option<alloy::primitives::Selector> {
        self.data
            .get(..4)
            .and_then(|s| <[u8; 4]>::try_from(s).ok())
            .map(Into::into)
    }

    fn word_arg(&self, index: usize) -> Option<U256> {
        let start = 4 + index * 32;
        self.data
            .get(start..start + 32)
            .map(U256::from_be_slice)
    }
}

fn transfer_log(contract: Address, topic: B256, from: Address, to: Address, id: U256) -> Value {
    serde_json::json!({
        "address": contract.to_string(),
        "topics": [
            topic.to_string(),
            from.into_word().to_string(),
            to.into_word().to_string(),
            B256::from(id.to_be_bytes::<32>()).to_string(),
        ],
        "data": "0x",
    })
}

fn uint_word(value: U256) -> Value {
    Value::String(Bytes::from(value.to_be_bytes::<32>().to_vec()).to_string())
}

fn binding_error(e: joke_bridge_core::FlowError) -> PortError {
    PortError::Validation(e.to_string())
}

fn rpc_error(code: i64, message: impl Into<String>) -> PortError {
    PortError::Rpc {
        code,
        message: message.into(),
    }
}

/// Maps the EIP-1193 user rejection code onto its dedicated variant.
fn normalize_rpc_error(e: PortError) -> PortError {
    match e {
        PortError::Rpc {
            code: USER_REJECTED,
            ..
        } => PortError::UserRejected,
        other => other,
    }
}

fn rpc_error_from_json(err: &Value) -> PortError {
    match err.get("code").and_then(Value::as_i64) {
        Some(code) => rpc_error(
            code,
            err.get("message")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        ),
        None => PortError::Transport(format!("malformed rpc error: {err}")),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: B256,
    status: Option<String>,
    block_number: Option<String>,
    #[serde(default)]
    logs: Vec<RpcLog>,
}

#[derive(Debug, Deserialize)]
struct RpcLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
}

fn parse_receipt(raw: Value) -> Result<TransactionReceipt, PortError> {
    let receipt: RpcReceipt = serde_json::from_value(raw)
        .map_err(|e| PortError::Validation(format!("malformed receipt: {e}")))?;
    let success = match receipt.status.as_deref() {
        Some(status) => parse_chain_id_str(status)? == 1,
        None => true,
    };
    let block_number = receipt
        .block_number
        .as_deref()
        .map(parse_chain_id_str)
        .transpose()?;
    Ok(TransactionReceipt {
        tx_hash: receipt.transaction_hash,
        success,
        block_number,
        logs: receipt
            .logs
            .into_iter()
            .map(|log| ReceiptLog {
                address: log.address,
                topics: log.topics,
                data: log.data,
            })
            .collect(),
    })
}

#[cfg(not(target_arch = "wasm32"))]
impl ProxyRuntime {
    async fn call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(&self.base_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PortError::Transport(format!("eip1193 proxy request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| PortError::Transport(format!("eip1193 proxy json decode failed: {e}")))?;
        if let Some(err) = body.get("error") {
            return Err(rpc_error_from_json(err));
        }
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "eip1193 proxy status {status}: {body}"
            )));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport("eip1193 proxy missing result".to_owned()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep_ms(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

#[cfg(target_arch = "wasm32")]
async fn sleep_ms(ms: u64) {
    let delay = i32::try_from(ms).unwrap_or(i32::MAX);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().map(|window| {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, delay)
        });
        if !matches!(scheduled, Some(Ok(_))) {
            let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

fn json_chain_id_to_u64(value: &Value) -> Result<u64, PortError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    let s = value
        .as_str()
        .ok_or_else(|| PortError::Validation("chain id must be string or number".to_owned()))?;
    parse_chain_id_str(s)
}

fn parse_chain_id_str(raw: &str) -> Result<u64, PortError> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
            .map_err(|e| PortError::Validation(format!("invalid hex quantity {raw}: {e}")))
    } else {
        raw.parse()
            .map_err(|e| PortError::Validation(format!("invalid quantity {raw}: {e}")))
    }
}

#[cfg(target_arch = "wasm32")]
async fn browser_request(method: &str, params: Value) -> Result<Value, PortError> {
    use wasm_bindgen::JsCast;

    let provider = browser_provider()?;
    let request_fn = get_prop(&provider, "request")
        .ok()
        .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
        .ok_or(PortError::NotImplemented(
            "window.ethereum.request is unavailable",
        ))?;

    let request = serde_json::json!({
        "method": method,
        "params": params,
    });
    let request_js = serde_wasm_bindgen::to_value(&request)
        .map_err(|e| PortError::Transport(format!("failed to encode wasm request: {e}")))?;
    let promise_js = request_fn
        .call1(&provider, &request_js)
        .map_err(|e| PortError::Transport(format!("provider request dispatch failed: {e:?}")))?;
    let promise = promise_js
        .dyn_into::<js_sys::Promise>()
        .map_err(|_| PortError::Transport("provider request did not return Promise".to_owned()))?;
    let result_js = wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map_err(js_rpc_error)?;
    if result_js.is_null() || result_js.is_undefined() {
        return Ok(Value::Null);
    }
    serde_wasm_bindgen::from_value(result_js)
        .map_err(|e| PortError::Transport(format!("failed to decode wasm response: {e}")))
}

#[cfg(target_arch = "wasm32")]
fn js_rpc_error(err: wasm_bindgen::JsValue) -> PortError {
    let code = get_prop(&err, "code").ok().and_then(|v| v.as_f64());
    let message = get_prop(&err, "message")
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    match code {
        Some(code) => rpc_error(code as i64, message),
        None => PortError::Transport(format!("provider request rejected: {message}")),
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_provider_available() -> bool {
    browser_provider().is_ok()
}

#[cfg(target_arch = "wasm32")]
fn browser_provider() -> Result<wasm_bindgen::JsValue, PortError> {
    let window =
        web_sys::window().ok_or_else(|| PortError::Transport("missing window".to_owned()))?;
    let provider = get_prop(&window.into(), "ethereum")?;
    if provider.is_null() || provider.is_undefined() {
        return Err(PortError::NotFound("window.ethereum missing".to_owned()));
    }
    Ok(provider)
}

#[cfg(target_arch = "wasm32")]
fn get_prop(target: &wasm_bindgen::JsValue, key: &str) -> Result<wasm_bindgen::JsValue, PortError> {
    js_sys::Reflect::get(target, &wasm_bindgen::JsValue::from_str(key))
        .map_err(|e| PortError::Transport(format!("read provider property {key} failed: {e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ids_parse_from_hex_and_decimal() {
        assert_eq!(parse_chain_id_str("0xaa37dc").expect("hex"), 11_155_420);
        assert_eq!(parse_chain_id_str("10").expect("decimal"), 10);
        assert_eq!(json_chain_id_to_u64(&serde_json::json!(5)).expect("number"), 5);
        assert!(parse_chain_id_str("0xzz").is_err());
    }

    #[test]
    fn rejection_code_maps_to_user_rejected() {
        let err = rpc_error_from_json(&serde_json::json!({"code": 4001, "message": "denied"}));
        assert_eq!(normalize_rpc_error(err), PortError::UserRejected);
        let other = rpc_error_from_json(&serde_json::json!({"code": -32603, "message": "boom"}));
        assert!(matches!(
            normalize_rpc_error(other),
            PortError::Rpc { code: -32603, .. }
        ));
    }

    #[test]
    fn receipt_json_parses_status_and_logs() {
        let receipt = parse_receipt(serde_json::json!({
            "transactionHash": format!("0x{}", "11".repeat(32)),
            "status": "0x0",
            "blockNumber": "0x10",
            "logs": [{
                "address": "0xf3d961368738c109e4859acf4849309757f97428",
                "topics": [format!("0x{}", "22".repeat(32))],
                "data": "0x"
            }]
        }))
        .expect("receipt");
        assert!(!receipt.success);
        assert_eq!(receipt.block_number, Some(16));
        assert_eq!(receipt.logs.len(), 1);
    }
}
