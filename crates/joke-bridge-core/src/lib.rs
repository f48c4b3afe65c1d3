pub mod binder;
pub mod domain;
pub mod error;
pub mod executor;
pub mod flow;
pub mod network;
pub mod orchestrator;
pub mod ports;
pub mod session;
pub mod state_machine;

pub use binder::{ContractBinder, NFT_ABI, SERVICE_ABI};
pub use domain::{
    chain_id_hex, BridgeOutcome, CallRequest, ContractHandle, ContractKind, FlowConfig,
    FlowStatus, JokePayload, MintedToken, NativeCurrency, NetworkDescriptor, NetworkOutcome,
    PendingToken, PriceSource, ReceiptLog, Session, TokenId, TransactionReceipt,
    DEFAULT_BRIDGE_PRICE_WEI, DEFAULT_JOKE_PRICE_WEI, OP_SEPOLIA_CHAIN_ID,
};
pub use error::FlowError;
pub use executor::PaidActionExecutor;
pub use flow::{minted_token_id, MintBurnFlow};
pub use network::NetworkGuard;
pub use orchestrator::{CommandResult, FlowCommand, Orchestrator};
pub use ports::{JokeSourcePort, NotifierPort, PortError, ProviderPort};
pub use session::ConnectionSession;
pub use state_machine::{
    bridge_transition, session_transition, BridgeAction, BridgeStatus, FlowState,
    SessionAction, SessionStatus, StateTransition,
};
