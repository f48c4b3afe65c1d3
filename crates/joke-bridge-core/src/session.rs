use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::binder::ContractBinder;
use crate::domain::{FlowConfig, Session};
use crate::error::FlowError;
use crate::network::NetworkGuard;
use crate::ports::ProviderPort;
use crate::state_machine::{session_transition, SessionAction, SessionStatus, StateTransition};

/// Owner of the single live [`Session`]. Only `connect` and `disconnect` write it;
/// everything else reads a snapshot through [`ConnectionSession::current`].
#[derive(Debug, Default)]
pub struct ConnectionSession {
    slot: Mutex<SessionSlot>,
}

#[derive(Debug, Default)]
struct SessionSlot {
    session: Option<Arc<Session>>,
    // Bumped by every disconnect so a connect that was in flight cannot resurrect the session.
    generation: u64,
}

impl ConnectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        if self.lock().session.is_some() {
            SessionStatus::Connected
        } else {
            SessionStatus::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status() == SessionStatus::Connected
    }

    pub fn current(&self) -> Result<Arc<Session>, FlowError> {
        self.lock().session.clone().ok_or(FlowError::NotConnected)
    }

    pub async fn connect<P: ProviderPort>(
        &self,
        provider: &P,
        binder: &ContractBinder,
        guard: &NetworkGuard,
        config: &FlowConfig,
    ) -> Result<(Arc<Session>, StateTransition), FlowError> {
        let ticket = self.lock().generation;

        provider.detect().await.map_err(|e| {
            tracing::error!(error = %e, "wallet provider not detected");
            FlowError::from_connect_port(e)
        })?;

        let accounts = provider.request_accounts().await.map_err(|e| {
            tracing::error!(error = %e, "account request failed");
            FlowError::from_connect_port(e)
        })?;
        let account = accounts.first().copied().ok_or_else(|| {
            tracing::error!("wallet returned no accounts");
            FlowError::ProviderUnavailable("wallet returned no accounts".to_owned())
        })?;

        let service = binder.bind_service(config.service_address)?;
        let nft = binder.bind_nft(config.nft_address)?;

        let outcome = guard.ensure_network(provider).await?;
        tracing::debug!(?outcome, "network verified");

        let session = Arc::new(Session {
            account,
            chain_id: guard.required().chain_id,
            service,
            nft,
        });

        let mut slot = self.lock();
        if slot.generation != ticket {
            tracing::warn!(%account, "disconnect happened while connecting, dropping session");
            return Err(FlowError::NotConnected);
        }
        let from = if slot.session.is_some() {
            SessionStatus::Connected
        } else {
            SessionStatus::Disconnected
        };
        let (_, transition) = session_transition(from, SessionAction::Connect);
        slot.session = Some(Arc::clone(&session));
        drop(slot);

        tracing::info!(%account, reason = transition.reason, "wallet connected");
        Ok((session, transition))
    }

    pub fn disconnect(&self) -> StateTransition {
        let mut slot = self.lock();
        slot.generation = slot.generation.wrapping_add(1);
        let from = if slot.session.take().is_some() {
            SessionStatus::Connected
        } else {
            SessionStatus::Disconnected
        };
        drop(slot);

        let (_, transition) = session_transition(from, SessionAction::Disconnect);
        tracing::info!(reason = transition.reason, "wallet disconnected");
        transition
    }

    fn lock(&self) -> MutexGuard<'_, SessionSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
