use std::sync::{Arc, Mutex};

use joke_bridge_core::{NotifierPort, PortError};

use crate::JokeBridgeConfig;

/// Posts the bridge command for a burned joke to the local command runner.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    mode: NotifierMode,
    template: String,
    sent: Arc<Mutex<Vec<String>>>,
}

#[derive(Debug, Clone)]
enum NotifierMode {
    Disabled(String),
    InMemory,
    Http { url: String, client: reqwest::Client },
}

impl CommandNotifier {
    pub fn with_config(config: &JokeBridgeConfig) -> Self {
        let mode = match &config.notify_url {
            Some(url) => match http_client(config.request_timeout_ms) {
                Ok(client) => NotifierMode::Http {
                    url: url.clone(),
                    client,
                },
                Err(e) => NotifierMode::Disabled(format!("notify client init failed: {e}")),
            },
            None if config.strict_runtime_required() => NotifierMode::Disabled(
                "notify URL not configured in production runtime profile".to_owned(),
            ),
            None => NotifierMode::InMemory,
        };
        Self {
            mode,
            template: config.notify_command_template.clone(),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            mode: NotifierMode::InMemory,
            template: JokeBridgeConfig::default().notify_command_template,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shell command for `joke_text`, quoted for a double-quoted template slot.
    pub fn command_for(&self, joke_text: &str) -> String {
        self.template
            .replace("{joke}", &escape_double_quoted(joke_text))
    }

    pub fn sent_commands(&self) -> Result<Vec<String>, PortError> {
        let g = self
            .sent
            .lock()
            .map_err(|e| PortError::Transport(format!("notifier lock poisoned: {e}")))?;
        Ok(g.clone())
    }

    fn record(&self, command: String) -> Result<(), PortError> {
        self.sent
            .lock()
            .map_err(|e| PortError::Transport(format!("notifier lock poisoned: {e}")))?
            .push(command);
        Ok(())
    }
}

impl NotifierPort for CommandNotifier {
    async fn notify(&self, joke_text: &str) -> Result<(), PortError> {
        let command = self.command_for(joke_text);
        match &self.mode {
            NotifierMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            NotifierMode::InMemory => {
                tracing::info!(%command, "bridge notification recorded");
                self.record(command)
            }
            NotifierMode::Http { url, client } => {
                let response = client
                    .post(url)
                    .json(&serde_json::json!({ "command": command }))
                    .send()
                    .await
                    .map_err(|e| PortError::Transport(format!("notify request failed: {e}")))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(PortError::Transport(format!("notify status {status}")));
                }
                tracing::info!(%url, "bridge notification delivered");
                self.record(command)
            }
        }
    }
}

pub(crate) fn http_client(timeout_ms: u64) -> Result<reqwest::Client, reqwest::Error> {
    let builder = reqwest::Client::builder();
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder.timeout(std::time::Duration::from_millis(timeout_ms));
    #[cfg(target_arch = "wasm32")]
    let _ = timeout_ms;
    builder.build()
}

fn escape_double_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_escapes_shell_metacharacters() {
        let notifier = CommandNotifier::in_memory();
        assert_eq!(
            notifier.command_for("Say \"hi\"___costs $5"),
            "just send-nft-info \"Say \\\"hi\\\"___costs \\$5\""
        );
    }
}
