pub mod config;
pub mod eip1193;
pub mod jokes;
pub mod notify;

pub use config::{JokeBridgeConfig, RuntimeProfile};
pub use eip1193::Eip1193Adapter;
pub use jokes::JokeApiAdapter;
pub use notify::CommandNotifier;

use joke_bridge_core::Orchestrator;

pub type RuntimeOrchestrator = Orchestrator<Eip1193Adapter, CommandNotifier, JokeApiAdapter>;

/// Wires every adapter from one configuration.
pub fn build_orchestrator(config: &JokeBridgeConfig) -> RuntimeOrchestrator {
    Orchestrator::new(
        Eip1193Adapter::with_config(config.clone()),
        CommandNotifier::with_config(config),
        JokeApiAdapter::with_config(config),
        config.flow_config(),
    )
}
