use alloy::dyn_abi::DynSolValue;
use alloy::primitives::U256;

use crate::binder::decode_uint;
use crate::domain::{CallRequest, ContractHandle, PriceSource, Session, TransactionReceipt};
use crate::error::FlowError;
use crate::network::NetworkGuard;
use crate::ports::ProviderPort;

/// Submits contract calls on behalf of the session account and waits for
/// confirmation. Receipts are returned uninterpreted.
pub struct PaidActionExecutor<'a, P> {
    provider: &'a P,
    guard: &'a NetworkGuard,
}

impl<'a, P: ProviderPort> PaidActionExecutor<'a, P> {
    pub fn new(provider: &'a P, guard: &'a NetworkGuard) -> Self {
        Self { provider, guard }
    }

    pub async fn pay_and_call(
        &self,
        session: &Session,
        handle: &ContractHandle,
        method: &str,
        args: &[DynSolValue],
        value_wei: U256,
    ) -> Result<TransactionReceipt, FlowError> {
        let data = handle.encode_call(method, args)?;
        if !value_wei.is_zero() && !handle.is_payable(method)? {
            return Err(FlowError::Binding(format!(
                "{method} is not payable but {value_wei} wei was attached"
            )));
        }

        self.guard.ensure_network(self.provider).await?;

        let request = CallRequest {
            from: session.account,
            to: handle.address,
            value: value_wei,
            data,
        };
        let tx_hash = self
            .provider
            .send_transaction(&request)
            .await
            .map_err(|e| {
                tracing::error!(method, contract = %handle.address, error = %e, "transaction submission failed");
                FlowError::from_tx_port(e)
            })?;
        tracing::debug!(method, %tx_hash, "transaction submitted");

        let receipt = self.provider.wait_for_receipt(tx_hash).await.map_err(|e| {
            tracing::error!(method, %tx_hash, error = %e, "waiting for receipt failed");
            FlowError::from_tx_port(e)
        })?;
        if !receipt.success {
            tracing::error!(method, %tx_hash, "transaction reverted");
            return Err(FlowError::TransactionFailed(format!(
                "{method} reverted in {tx_hash}"
            )));
        }

        tracing::info!(method, %tx_hash, value = %value_wei, "transaction confirmed");
        Ok(receipt)
    }

    /// View call on the required chain. The wallet is switched back first if
    /// it has moved, so the value never comes from another network.
    pub async fn read_uint(
        &self,
        session: &Session,
        handle: &ContractHandle,
        method: &str,
    ) -> Result<U256, FlowError> {
        self.guard.ensure_network(self.provider).await?;
        self.view_uint(session, handle, method).await
    }

    /// Price for the next payment. Network failures propagate; an unreadable
    /// `serviceCost()` on the right chain falls back to the configured price.
    pub async fn resolve_price(
        &self,
        session: &Session,
        price: PriceSource,
    ) -> Result<U256, FlowError> {
        match price {
            PriceSource::Fixed(value) => Ok(value),
            PriceSource::ServiceCost { fallback } => {
                self.guard.ensure_network(self.provider).await?;
                match self.view_uint(session, &session.service, "serviceCost").await {
                    Ok(cost) => Ok(cost),
                    Err(e) => {
                        tracing::warn!(error = %e, %fallback, "serviceCost() unavailable, using configured price");
                        Ok(fallback)
                    }
                }
            }
        }
    }

    async fn view_uint(
        &self,
        session: &Session,
        handle: &ContractHandle,
        method: &str,
    ) -> Result<U256, FlowError> {
        let request = CallRequest {
            from: session.account,
            to: handle.address,
            value: U256::ZERO,
            data: handle.encode_call(method, &[])?,
        };
        let output = self
            .provider
            .call(&request)
            .await
            .map_err(FlowError::from_tx_port)?;
        decode_uint(&output)
    }
}
