//! Bridge between the egui shell and the orchestration crates.
//! This must remain the only shell-facing boundary for wallet operations.

use std::sync::{Arc, Mutex, PoisonError};

use eframe::egui;

use joke_bridge_adapters::{build_orchestrator, JokeBridgeConfig, RuntimeOrchestrator};
use joke_bridge_core::{CommandResult, FlowCommand, FlowError, FlowStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error("async runtime unavailable: {0}")]
    Runtime(String),
}

/// Completed command, written by the background task and taken by the UI.
pub type CommandSlot = Arc<Mutex<Option<(FlowCommand, Result<CommandResult, BridgeError>)>>>;

#[derive(Clone)]
pub struct FlowBridge {
    orchestrator: Arc<RuntimeOrchestrator>,
    #[cfg(not(target_arch = "wasm32"))]
    runtime: Result<Arc<tokio::runtime::Runtime>, String>,
}

impl Default for FlowBridge {
    fn default() -> Self {
        Self::with_config(&JokeBridgeConfig::from_env())
    }
}

impl FlowBridge {
    pub fn with_config(config: &JokeBridgeConfig) -> Self {
        tracing::info!(
            profile = ?config.runtime_profile,
            chain_id = config.required_network.chain_id,
            "building wallet flow"
        );
        Self {
            orchestrator: Arc::new(build_orchestrator(config)),
            #[cfg(not(target_arch = "wasm32"))]
            runtime: tokio::runtime::Runtime::new()
                .map(Arc::new)
                .map_err(|e| e.to_string()),
        }
    }

    pub fn status(&self) -> FlowStatus {
        self.orchestrator.status()
    }

    pub fn provider_mode(&self) -> &'static str {
        self.orchestrator.provider.mode_label()
    }

    /// Runs `command` off the UI thread; the outcome lands in `slot`.
    pub fn dispatch(&self, command: FlowCommand, slot: &CommandSlot, ctx: &egui::Context) {
        let orchestrator = Arc::clone(&self.orchestrator);
        let task_slot = Arc::clone(slot);
        let task_ctx = ctx.clone();
        let task_command = command.clone();
        let task = move || async move {
            let result = orchestrator
                .handle(task_command.clone())
                .await
                .map_err(BridgeError::from);
            if let Err(e) = &result {
                tracing::warn!(command = ?task_command, error = %e, "wallet command failed");
            }
            store(&task_slot, task_command, result);
            task_ctx.request_repaint();
        };

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(task());
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            match &self.runtime {
                Ok(runtime) => {
                    let runtime = Arc::clone(runtime);
                    std::thread::spawn(move || runtime.block_on(task()));
                }
                Err(e) => {
                    store(slot, command, Err(BridgeError::Runtime(e.clone())));
                    ctx.request_repaint();
                }
            }
        }
    }
}

fn store(
    slot: &CommandSlot,
    command: FlowCommand,
    result: Result<CommandResult, BridgeError>,
) {
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some((command, result));
}
