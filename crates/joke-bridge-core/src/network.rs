use crate::domain::{NetworkDescriptor, NetworkOutcome};
use crate::error::FlowError;
use crate::ports::{PortError, ProviderPort};

/// Keeps the wallet on the required chain. The only built-in retry of the
/// workflow lives here: one `wallet_addEthereumChain` followed by one more switch.
#[derive(Debug, Clone)]
pub struct NetworkGuard {
    required: NetworkDescriptor,
}

impl NetworkGuard {
    pub fn new(required: NetworkDescriptor) -> Self {
        Self { required }
    }

    pub fn required(&self) -> &NetworkDescriptor {
        &self.required
    }

    pub async fn ensure_network<P: ProviderPort>(
        &self,
        provider: &P,
    ) -> Result<NetworkOutcome, FlowError> {
        let required = self.required.chain_id;
        let current = provider.chain_id().await.map_err(|e| {
            tracing::error!(required, error = %e, "failed to read wallet chain id");
            self.unswitchable(format!("chain id query failed: {e}"))
        })?;
        if current == required {
            return Ok(NetworkOutcome::AlreadyOnNetwork);
        }

        tracing::info!(current, required, "wallet on wrong chain, requesting switch");
        match provider.switch_chain(required).await {
            Ok(()) => {
                tracing::info!(required, "network switched");
                return Ok(NetworkOutcome::Switched);
            }
            Err(PortError::UserRejected) => {
                tracing::warn!(required, "network switch rejected in wallet");
                return Err(self.unswitchable("switch rejected by user".to_owned()));
            }
            // Wallets report an unknown chain as 4902, some wrap it in an internal error.
            Err(e) => tracing::warn!(required, error = %e, "switch failed, registering network"),
        }

        provider.add_chain(&self.required).await.map_err(|e| {
            tracing::error!(required, error = %e, "adding network failed");
            self.unswitchable(format!("add network failed: {e}"))
        })?;
        tracing::info!(required, "network added");

        provider.switch_chain(required).await.map_err(|e| {
            tracing::error!(required, error = %e, "switch after add failed");
            self.unswitchable(format!("switch after add failed: {e}"))
        })?;
        tracing::info!(required, "network switched after add");
        Ok(NetworkOutcome::AddedThenSwitched)
    }

    fn unswitchable(&self, reason: String) -> FlowError {
        FlowError::Unswitchable {
            required: self.required.chain_id,
            reason,
        }
    }
}
