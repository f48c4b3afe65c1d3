use std::sync::{Mutex, MutexGuard, PoisonError};

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256};

use crate::domain::{
    BridgeOutcome, ContractHandle, FlowConfig, JokePayload, MintedToken, PendingToken,
    PriceSource, Session, TokenId, TransactionReceipt,
};
use crate::error::FlowError;
use crate::executor::PaidActionExecutor;
use crate::ports::{NotifierPort, ProviderPort};
use crate::state_machine::{
    bridge_transition, BridgeAction, BridgeStatus, FlowState, StateTransition,
};

/// Mint -> bridge -> burn sequencing around a single [`PendingToken`].
#[derive(Debug, Default)]
pub struct MintBurnFlow {
    slot: Mutex<BridgeSlot>,
}

#[derive(Debug, Default)]
struct BridgeSlot {
    pending: Option<PendingToken>,
    bridging: bool,
}

impl BridgeSlot {
    fn status(&self) -> BridgeStatus {
        if self.pending.is_some() {
            BridgeStatus::Armed
        } else {
            BridgeStatus::Unarmed
        }
    }
}

impl MintBurnFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<PendingToken> {
        self.lock().pending.clone()
    }

    pub fn is_armed(&self) -> bool {
        self.lock().status() == BridgeStatus::Armed
    }

    /// The pending token `account` may bridge, if any.
    pub fn armed_for(&self, account: Address) -> Option<PendingToken> {
        self.lock().pending.clone().filter(|p| p.owner == account)
    }

    pub async fn mint<P: ProviderPort>(
        &self,
        executor: &PaidActionExecutor<'_, P>,
        session: &Session,
        joke: &JokePayload,
        config: &FlowConfig,
    ) -> Result<(MintedToken, StateTransition), FlowError> {
        if !joke.is_complete() {
            return Err(FlowError::NoJoke);
        }

        let receipt = executor
            .pay_and_call(
                session,
                &session.nft,
                "mint",
                &[DynSolValue::String(joke.token_uri())],
                U256::ZERO,
            )
            .await?;
        let token_id = minted_token_id(&session.nft, session.account, &receipt)?;

        let mut slot = self.lock();
        let (_, transition) = bridge_transition(slot.status(), BridgeAction::MintConfirmed)?;
        if let Some(previous) = slot.pending.as_ref() {
            tracing::warn!(
                previous = %previous.token_id,
                %token_id,
                "minted again before bridging, previous token is no longer tracked"
            );
        }
        slot.pending = Some(PendingToken {
            token_id,
            owner: session.account,
            joke: joke.clone(),
            mint_tx: receipt.tx_hash,
            bridge_payment: None,
        });
        drop(slot);

        tracing::info!(%token_id, tx_hash = %receipt.tx_hash, "nft minted, bridge armed");
        Ok((
            MintedToken {
                token_id,
                tx_hash: receipt.tx_hash,
                explorer_url: config.explorer_tx_url(receipt.tx_hash),
            },
            transition,
        ))
    }

    pub async fn bridge_and_burn<P: ProviderPort, N: NotifierPort>(
        &self,
        executor: &PaidActionExecutor<'_, P>,
        notifier: &N,
        session: &Session,
        bridge_price: PriceSource,
    ) -> Result<(BridgeOutcome, StateTransition), FlowError> {
        let token = self.claim(session.account)?;
        let _claim = ClaimGuard { flow: self };
        let token_id = token.token_id;

        let payment_tx = match token.bridge_payment {
            Some(tx) => {
                tracing::info!(%token_id, %tx, "bridge already paid, retrying burn only");
                tx
            }
            None => {
                let price = executor.resolve_price(session, bridge_price).await?;
                let receipt = executor
                    .pay_and_call(session, &session.service, "payService", &[], price)
                    .await?;
                self.record_payment(token_id, &receipt);
                receipt.tx_hash
            }
        };

        let burn = executor
            .pay_and_call(
                session,
                &session.nft,
                "burn",
                &[DynSolValue::Uint(token_id, 256)],
                U256::ZERO,
            )
            .await
            .inspect_err(|e| {
                tracing::error!(%token_id, error = %e, "burn failed after bridge payment, token stays armed");
            })?;

        let transition = self.clear_burned(token_id)?;

        let notified = match notifier.notify(&token.joke.notification_text()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%token_id, error = %e, "bridge notification failed, burn is kept");
                false
            }
        };

        tracing::info!(%token_id, burn_tx = %burn.tx_hash, notified, "token bridged and burned");
        Ok((
            BridgeOutcome {
                token_id,
                payment_tx,
                burn_tx: burn.tx_hash,
                notified,
            },
            transition,
        ))
    }

    fn claim(&self, account: Address) -> Result<PendingToken, FlowError> {
        let mut slot = self.lock();
        if slot.bridging {
            tracing::warn!("bridge already in flight");
            return Err(FlowError::NotArmed);
        }
        let token = slot.pending.clone().ok_or(FlowError::NotArmed)?;
        if token.owner != account {
            tracing::warn!(owner = %token.owner, %account, "pending token was minted by another account");
            return Err(FlowError::NotArmed);
        }
        slot.bridging = true;
        Ok(token)
    }

    fn record_payment(&self, token_id: TokenId, receipt: &TransactionReceipt) {
        let mut slot = self.lock();
        if let Some(pending) = slot.pending.as_mut().filter(|p| p.token_id == token_id) {
            pending.bridge_payment = Some(receipt.tx_hash);
        }
    }

    fn clear_burned(&self, token_id: TokenId) -> Result<StateTransition, FlowError> {
        let mut slot = self.lock();
        if slot.pending.as_ref().map(|p| p.token_id) != Some(token_id) {
            tracing::info!(%token_id, "newer token minted during bridge, keeping it armed");
            return Ok(StateTransition {
                from: FlowState::Bridge(BridgeStatus::Armed),
                to: FlowState::Bridge(BridgeStatus::Armed),
                reason: "newer_token_kept",
            });
        }
        let (_, transition) = bridge_transition(slot.status(), BridgeAction::BurnConfirmed)?;
        slot.pending = None;
        Ok(transition)
    }

    fn lock(&self) -> MutexGuard<'_, BridgeSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct ClaimGuard<'a> {
    flow: &'a MintBurnFlow,
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        self.flow.lock().bridging = false;
    }
}

/// Token id from the `Transfer` event the NFT contract logged to `account`.
pub fn minted_token_id(
    nft: &ContractHandle,
    account: Address,
    receipt: &TransactionReceipt,
) -> Result<TokenId, FlowError> {
    let transfer = nft.event_topic("Transfer")?;
    receipt
        .logs
        .iter()
        .filter(|log| log.address == nft.address && log.topics.len() == 4)
        .filter(|log| log.topics[0] == transfer)
        .find(|log| Address::from_word(log.topics[2]) == account)
        .map(|log| U256::from_be_bytes(log.topics[3].0))
        .ok_or_else(|| {
            tracing::error!(tx_hash = %receipt.tx_hash, "mint receipt has no Transfer event for account");
            FlowError::TransactionFailed(format!(
                "malformed receipt {}: no Transfer event to {account}",
                receipt.tx_hash
            ))
        })
}
