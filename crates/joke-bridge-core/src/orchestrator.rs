use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy::primitives::{B256, U256};

use crate::binder::ContractBinder;
use crate::domain::{
    BridgeOutcome, FlowConfig, FlowStatus, JokePayload, MintedToken, PendingToken, Session,
};
use crate::error::FlowError;
use crate::executor::PaidActionExecutor;
use crate::flow::MintBurnFlow;
use crate::network::NetworkGuard;
use crate::ports::{JokeSourcePort, NotifierPort, ProviderPort};
use crate::session::ConnectionSession;
use crate::state_machine::StateTransition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowCommand {
    Connect,
    Disconnect,
    PayForJoke,
    Mint { joke: JokePayload },
    MintCurrentJoke,
    BridgeAndBurn,
}

#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    pub transition: Option<StateTransition>,
    pub tx_hash: Option<B256>,
    pub joke: Option<JokePayload>,
    pub minted: Option<MintedToken>,
    pub bridged: Option<BridgeOutcome>,
}

impl CommandResult {
    fn empty() -> Self {
        Self::default()
    }
}

pub struct Orchestrator<P, N, J>
where
    P: ProviderPort,
    N: NotifierPort,
    J: JokeSourcePort,
{
    pub provider: P,
    pub notifier: N,
    pub jokes: J,
    config: FlowConfig,
    binder: ContractBinder,
    guard: NetworkGuard,
    session: ConnectionSession,
    flow: MintBurnFlow,
    current_joke: Mutex<Option<JokePayload>>,
}

impl<P, N, J> Orchestrator<P, N, J>
where
    P: ProviderPort,
    N: NotifierPort,
    J: JokeSourcePort,
{
    pub fn new(provider: P, notifier: N, jokes: J, config: FlowConfig) -> Self {
        let guard = NetworkGuard::new(config.required_network.clone());
        Self {
            provider,
            notifier,
            jokes,
            config,
            binder: ContractBinder,
            guard,
            session: ConnectionSession::new(),
            flow: MintBurnFlow::new(),
            current_joke: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub async fn handle(&self, command: FlowCommand) -> Result<CommandResult, FlowError> {
        match command {
            FlowCommand::Connect => {
                let transition = self.connect().await?;
                Ok(CommandResult {
                    transition: Some(transition),
                    ..CommandResult::empty()
                })
            }
            FlowCommand::Disconnect => Ok(CommandResult {
                transition: Some(self.disconnect()),
                ..CommandResult::empty()
            }),
            FlowCommand::PayForJoke => {
                let (tx_hash, joke) = self.pay_for_joke().await?;
                Ok(CommandResult {
                    tx_hash: Some(tx_hash),
                    joke: Some(joke),
                    ..CommandResult::empty()
                })
            }
            FlowCommand::Mint { joke } => self.mint_result(&joke).await,
            FlowCommand::MintCurrentJoke => {
                let joke = self.current_joke().ok_or(FlowError::NoJoke)?;
                self.mint_result(&joke).await
            }
            FlowCommand::BridgeAndBurn => {
                let (outcome, transition) = self.bridge_and_burn_with_transition().await?;
                Ok(CommandResult {
                    transition: Some(transition),
                    tx_hash: Some(outcome.burn_tx),
                    bridged: Some(outcome),
                    ..CommandResult::empty()
                })
            }
        }
    }

    pub async fn connect(&self) -> Result<StateTransition, FlowError> {
        let (_, transition) = self
            .session
            .connect(&self.provider, &self.binder, &self.guard, &self.config)
            .await?;
        Ok(transition)
    }

    pub fn disconnect(&self) -> StateTransition {
        self.session.disconnect()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn session(&self) -> Result<Arc<Session>, FlowError> {
        self.session.current()
    }

    /// Pays the joke price, then replaces the current joke with a fresh one.
    pub async fn pay_for_joke(&self) -> Result<(B256, JokePayload), FlowError> {
        let session = self.session.current()?;
        let executor = self.executor();
        let price = executor
            .resolve_price(&session, self.config.joke_price)
            .await?;
        let receipt = executor
            .pay_and_call(&session, &session.service, "payService", &[], price)
            .await?;

        self.set_current_joke(None);
        let joke = self.jokes.fetch_joke().await.map_err(|e| {
            tracing::error!(error = %e, tx_hash = %receipt.tx_hash, "joke fetch failed after payment");
            FlowError::JokeUnavailable(e.to_string())
        })?;
        self.set_current_joke(Some(joke.clone()));
        tracing::info!(tx_hash = %receipt.tx_hash, "joke paid and fetched");
        Ok((receipt.tx_hash, joke))
    }

    pub async fn mint(&self, joke: &JokePayload) -> Result<MintedToken, FlowError> {
        let (minted, _) = self.mint_with_transition(joke).await?;
        Ok(minted)
    }

    pub async fn mint_current_joke(&self) -> Result<MintedToken, FlowError> {
        let joke = self.current_joke().ok_or(FlowError::NoJoke)?;
        self.mint(&joke).await
    }

    pub async fn bridge_and_burn(&self) -> Result<BridgeOutcome, FlowError> {
        let (outcome, _) = self.bridge_and_burn_with_transition().await?;
        Ok(outcome)
    }

    pub async fn service_cost(&self) -> Result<U256, FlowError> {
        let session = self.session.current()?;
        self.executor()
            .read_uint(&session, &session.service, "serviceCost")
            .await
    }

    pub async fn contract_balance(&self) -> Result<U256, FlowError> {
        let session = self.session.current()?;
        let balance = self
            .executor()
            .read_uint(&session, &session.service, "getContractBalance")
            .await
            .inspect_err(|e| tracing::error!(error = %e, "contract balance query failed"))?;
        tracing::info!(%balance, "service contract balance");
        Ok(balance)
    }

    pub fn pending_token(&self) -> Option<PendingToken> {
        self.flow.pending()
    }

    pub fn current_joke(&self) -> Option<JokePayload> {
        self.joke_slot().clone()
    }

    pub fn status(&self) -> FlowStatus {
        let session = self.session.current().ok();
        FlowStatus {
            connected: session.is_some(),
            account: session.as_ref().map(|s| s.account),
            armed_token: session
                .and_then(|s| self.flow.armed_for(s.account))
                .map(|p| p.token_id),
            current_joke: self.current_joke(),
        }
    }

    async fn mint_with_transition(
        &self,
        joke: &JokePayload,
    ) -> Result<(MintedToken, StateTransition), FlowError> {
        let session = self.session.current()?;
        self.flow
            .mint(&self.executor(), &session, joke, &self.config)
            .await
    }

    async fn mint_result(&self, joke: &JokePayload) -> Result<CommandResult, FlowError> {
        let (minted, transition) = self.mint_with_transition(joke).await?;
        Ok(CommandResult {
            transition: Some(transition),
            tx_hash: Some(minted.tx_hash),
            minted: Some(minted),
            ..CommandResult::empty()
        })
    }

    async fn bridge_and_burn_with_transition(
        &self,
    ) -> Result<(BridgeOutcome, StateTransition), FlowError> {
        let session = self.session.current()?;
        self.flow
            .bridge_and_burn(
                &self.executor(),
                &self.notifier,
                &session,
                self.config.bridge_price,
            )
            .await
    }

    fn executor(&self) -> PaidActionExecutor<'_, P> {
        PaidActionExecutor::new(&self.provider, &self.guard)
    }

    fn set_current_joke(&self, joke: Option<JokePayload>) {
        *self.joke_slot() = joke;
    }

    fn joke_slot(&self) -> MutexGuard<'_, Option<JokePayload>> {
        self.current_joke
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
