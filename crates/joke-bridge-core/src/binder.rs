use std::sync::Arc;

use alloy::dyn_abi::{DynSolType, DynSolValue, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::{Address, Bytes, Selector, B256, U256};

use crate::domain::{ContractHandle, ContractKind};
use crate::error::FlowError;

pub const SERVICE_ABI: &str = include_str!("../abi/ServicePayment.json");
pub const NFT_ABI: &str = include_str!("../abi/JokeNft.json");

#[derive(Debug, Clone, Copy, Default)]
pub struct ContractBinder;

impl ContractBinder {
    pub fn bind(
        &self,
        kind: ContractKind,
        abi_json: &str,
        address: Address,
    ) -> Result<ContractHandle, FlowError> {
        let abi: JsonAbi = serde_json::from_str(abi_json)
            .map_err(|e| FlowError::Binding(format!("invalid {kind:?} abi json: {e}")))?;
        Ok(ContractHandle {
            kind,
            address,
            abi: Arc::new(abi),
        })
    }

    pub fn bind_service(&self, address: Address) -> Result<ContractHandle, FlowError> {
        self.bind(ContractKind::Service, SERVICE_ABI, address)
    }

    pub fn bind_nft(&self, address: Address) -> Result<ContractHandle, FlowError> {
        self.bind(ContractKind::Nft, NFT_ABI, address)
    }
}

impl ContractHandle {
    /// `method` is either a bare name (first overload wins) or a full
    /// signature such as `safeTransferFrom(address,address,uint256)`.
    pub fn encode_call(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes, FlowError> {
        let function = select_function(&self.abi, method)?;
        if function.inputs.len() != args.len() {
            return Err(FlowError::Binding(format!(
                "argument count mismatch for {method}: expected {}, got {}",
                function.inputs.len(),
                args.len()
            )));
        }
        let encoded = function
            .abi_encode_input(args)
            .map_err(|e| FlowError::Binding(format!("abi encoding failed for {method}: {e}")))?;
        Ok(Bytes::from(encoded))
    }

    pub fn is_payable(&self, method: &str) -> Result<bool, FlowError> {
        let function = select_function(&self.abi, method)?;
        Ok(function.state_mutability == alloy::json_abi::StateMutability::Payable)
    }

    pub fn selector(&self, method: &str) -> Result<Selector, FlowError> {
        select_function(&self.abi, method).map(Function::selector)
    }

    pub fn event_topic(&self, event: &str) -> Result<B256, FlowError> {
        self.abi
            .event(event)
            .and_then(|overloads| overloads.first())
            .map(|e| e.selector())
            .ok_or_else(|| FlowError::Binding(format!("event not found: {event}")))
    }
}

/// Decodes a single `uint256` return value.
pub fn decode_uint(output: &[u8]) -> Result<U256, FlowError> {
    match DynSolType::Uint(256).abi_decode(output) {
        Ok(DynSolValue::Uint(value, _)) => Ok(value),
        Ok(other) => Err(FlowError::TransactionFailed(format!(
            "unexpected return value: {other:?}"
        ))),
        Err(e) => Err(FlowError::TransactionFailed(format!(
            "malformed uint256 return data: {e}"
        ))),
    }
}

fn select_function<'a>(abi: &'a JsonAbi, method: &str) -> Result<&'a Function, FlowError> {
    let (name, full_sig) = match method.split_once('(') {
        Some((name, _)) => (name, Some(method)),
        None => (method, None),
    };

    let candidates = abi
        .function(name)
        .ok_or_else(|| FlowError::Binding(format!("method not found: {name}")))?;

    if let Some(full_sig) = full_sig {
        return candidates
            .iter()
            .find(|f| f.signature() == full_sig)
            .ok_or_else(|| FlowError::Binding(format!("method signature not found: {full_sig}")));
    }

    candidates
        .first()
        .ok_or_else(|| FlowError::Binding(format!("method has no overloads: {name}")))
}
