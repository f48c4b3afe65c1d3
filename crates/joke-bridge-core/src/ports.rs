use alloy::primitives::{Address, Bytes, B256};
use thiserror::Error;

use crate::domain::{CallRequest, JokePayload, NetworkDescriptor, TransactionReceipt};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("policy error: {0}")]
    Policy(String),
    #[error("request rejected by user")]
    UserRejected,
    #[error("chain {0} is not known to the wallet")]
    UnrecognizedChain(u64),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("timed out: {0}")]
    Timeout(String),
}

/// EIP-1193 wallet surface. Every call may open a wallet prompt.
#[allow(async_fn_in_trait)]
pub trait ProviderPort {
    /// Fails with `NotFound` when no provider is injected.
    async fn detect(&self) -> Result<(), PortError>;
    async fn request_accounts(&self) -> Result<Vec<Address>, PortError>;
    async fn chain_id(&self) -> Result<u64, PortError>;
    async fn switch_chain(&self, chain_id: u64) -> Result<(), PortError>;
    async fn add_chain(&self, network: &NetworkDescriptor) -> Result<(), PortError>;
    async fn send_transaction(&self, request: &CallRequest) -> Result<B256, PortError>;
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, PortError>;
    async fn call(&self, request: &CallRequest) -> Result<Bytes, PortError>;
}

/// Out-of-band channel fired after a confirmed burn.
#[allow(async_fn_in_trait)]
pub trait NotifierPort {
    async fn notify(&self, joke_text: &str) -> Result<(), PortError>;
}

#[allow(async_fn_in_trait)]
pub trait JokeSourcePort {
    async fn fetch_joke(&self) -> Result<JokePayload, PortError>;
}
