#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use tokio::sync::Notify;

use joke_bridge_core::{
    CallRequest, FlowConfig, JokePayload, JokeSourcePort, NetworkDescriptor, NotifierPort,
    Orchestrator, PortError, ProviderPort, ReceiptLog, TransactionReceipt, OP_SEPOLIA_CHAIN_ID,
};

pub fn account() -> Address {
    "0x1000000000000000000000000000000000000001"
        .parse()
        .expect("valid account")
}

pub fn other_account() -> Address {
    "0x2000000000000000000000000000000000000002"
        .parse()
        .expect("valid account")
}

pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

pub fn transfer_topic() -> B256 {
    keccak256("Transfer(address,address,uint256)".as_bytes())
}

pub fn sample_joke() -> JokePayload {
    JokePayload::new(
        "Why did the scarecrow win an award?",
        "Because he was outstanding in his field.",
    )
}

/// Wallet double driven by a mutable script. Every request is appended to `calls`.
#[derive(Debug)]
pub struct Script {
    pub available: bool,
    pub accounts: Vec<Address>,
    pub reject_accounts: bool,
    pub chain_id: u64,
    pub known_chains: Vec<u64>,
    pub reject_switch: bool,
    pub reject_add: bool,
    pub next_token_id: u64,
    pub mint_emits_transfer: bool,
    pub reverting: Vec<[u8; 4]>,
    pub rejecting: Vec<[u8; 4]>,
    pub service_cost: Option<U256>,
    /// When set, `eth_chainId` waits for a notification before answering.
    pub gate: Option<Arc<Notify>>,
    pub calls: Vec<String>,
    pub sent: Vec<CallRequest>,
    receipts: HashMap<B256, TransactionReceipt>,
    nonce: u64,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            available: true,
            accounts: vec![account()],
            reject_accounts: false,
            chain_id: OP_SEPOLIA_CHAIN_ID,
            known_chains: vec![1, OP_SEPOLIA_CHAIN_ID],
            reject_switch: false,
            reject_add: false,
            next_token_id: 1,
            mint_emits_transfer: true,
            reverting: Vec::new(),
            rejecting: Vec::new(),
            service_cost: Some(U256::from(100_000_000_000_000u64)),
            gate: None,
            calls: Vec::new(),
            sent: Vec::new(),
            receipts: HashMap::new(),
            nonce: 0,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ScriptedProvider {
    pub script: Arc<Mutex<Script>>,
}

impl ScriptedProvider {
    pub fn with(configure: impl FnOnce(&mut Script)) -> Self {
        let provider = Self::default();
        configure(&mut provider.script.lock().expect("script lock"));
        provider
    }

    pub fn edit(&self, configure: impl FnOnce(&mut Script)) {
        configure(&mut self.script.lock().expect("script lock"));
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.lock().expect("script lock").calls.clone()
    }

    pub fn sent(&self) -> Vec<CallRequest> {
        self.script.lock().expect("script lock").sent.clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

fn method_name(data: &[u8]) -> &'static str {
    let known = [
        "payService()",
        "mint(string)",
        "burn(uint256)",
        "serviceCost()",
        "getContractBalance()",
    ];
    known
        .into_iter()
        .find(|sig| data.len() >= 4 && data[..4] == selector(sig))
        .unwrap_or("unknown")
}

impl ProviderPort for ScriptedProvider {
    async fn detect(&self) -> Result<(), PortError> {
        let mut s = self.script.lock().expect("script lock");
        s.calls.push("detect".to_owned());
        if s.available {
            Ok(())
        } else {
            Err(PortError::NotFound("window.ethereum missing".to_owned()))
        }
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        let mut s = self.script.lock().expect("script lock");
        s.calls.push("eth_requestAccounts".to_owned());
        if s.reject_accounts {
            return Err(PortError::UserRejected);
        }
        Ok(s.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, PortError> {
        let gate = {
            let mut s = self.script.lock().expect("script lock");
            s.calls.push("eth_chainId".to_owned());
            s.gate.take()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self.script.lock().expect("script lock").chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), PortError> {
        let mut s = self.script.lock().expect("script lock");
        s.calls.push(format!("wallet_switchEthereumChain:{chain_id}"));
        if s.reject_switch {
            return Err(PortError::UserRejected);
        }
        if !s.known_chains.contains(&chain_id) {
            return Err(PortError::UnrecognizedChain(chain_id));
        }
        s.chain_id = chain_id;
        Ok(())
    }

    async fn add_chain(&self, network: &NetworkDescriptor) -> Result<(), PortError> {
        let mut s = self.script.lock().expect("script lock");
        s.calls
            .push(format!("wallet_addEthereumChain:{}", network.chain_id));
        if s.reject_add {
            return Err(PortError::UserRejected);
        }
        s.known_chains.push(network.chain_id);
        Ok(())
    }

    async fn send_transaction(&self, request: &CallRequest) -> Result<B256, PortError> {
        let mut guard = self.script.lock().expect("script lock");
        let s = &mut *guard;
        let name = method_name(&request.data);
        s.calls.push(format!("eth_sendTransaction:{name}"));
        let sel: [u8; 4] = request.data[..4].try_into().expect("selector");
        if s.rejecting.contains(&sel) {
            return Err(PortError::UserRejected);
        }
        s.sent.push(request.clone());
        s.nonce += 1;
        let tx_hash = B256::from(U256::from(s.nonce).to_be_bytes::<32>());

        let success = !s.reverting.contains(&sel);
        let mut logs = Vec::new();
        if success && name == "mint(string)" && s.mint_emits_transfer {
            let token_id = U256::from(s.next_token_id);
            s.next_token_id += 1;
            logs.push(ReceiptLog {
                address: request.to,
                topics: vec![
                    transfer_topic(),
                    Address::ZERO.into_word(),
                    request.from.into_word(),
                    B256::from(token_id.to_be_bytes::<32>()),
                ],
                data: Bytes::new(),
            });
        }
        s.receipts.insert(
            tx_hash,
            TransactionReceipt {
                tx_hash,
                success,
                block_number: Some(s.nonce),
                logs,
            },
        );
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, PortError> {
        let mut s = self.script.lock().expect("script lock");
        s.calls.push("eth_getTransactionReceipt".to_owned());
        s.receipts
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("receipt {tx_hash}")))
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes, PortError> {
        let mut s = self.script.lock().expect("script lock");
        let name = method_name(&request.data);
        s.calls.push(format!("eth_call:{name}"));
        match name {
            "serviceCost()" => s
                .service_cost
                .map(|cost| Bytes::from(cost.to_be_bytes::<32>().to_vec()))
                .ok_or(PortError::Rpc {
                    code: -32000,
                    message: "execution reverted".to_owned(),
                }),
            "getContractBalance()" => {
                Ok(Bytes::from(U256::from(42u64).to_be_bytes::<32>().to_vec()))
            }
            _ => Err(PortError::Validation(format!("unsupported call {name}"))),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().expect("notifier lock").clone()
    }
}

impl NotifierPort for RecordingNotifier {
    async fn notify(&self, joke_text: &str) -> Result<(), PortError> {
        self.sent
            .lock()
            .expect("notifier lock")
            .push(joke_text.to_owned());
        if self.fail {
            return Err(PortError::Transport("connection refused".to_owned()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FixedJokes {
    pub joke: Option<JokePayload>,
}

impl JokeSourcePort for FixedJokes {
    async fn fetch_joke(&self) -> Result<JokePayload, PortError> {
        self.joke
            .clone()
            .ok_or_else(|| PortError::Transport("joke api down".to_owned()))
    }
}

pub type TestOrchestrator = Orchestrator<ScriptedProvider, RecordingNotifier, FixedJokes>;

pub fn orchestrator_with(provider: ScriptedProvider) -> TestOrchestrator {
    Orchestrator::new(
        provider,
        RecordingNotifier::default(),
        FixedJokes {
            joke: Some(sample_joke()),
        },
        FlowConfig::default(),
    )
}

pub fn orchestrator() -> TestOrchestrator {
    orchestrator_with(ScriptedProvider::default())
}
