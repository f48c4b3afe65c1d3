use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Deserialize;

use joke_bridge_core::{JokePayload, JokeSourcePort, PortError};

use crate::notify::http_client;
use crate::JokeBridgeConfig;

#[derive(Debug, Clone)]
pub struct JokeApiAdapter {
    mode: JokeMode,
}

#[derive(Debug, Clone)]
enum JokeMode {
    Disabled(String),
    /// Cycles through a fixed list.
    Fixed {
        jokes: Arc<Vec<JokePayload>>,
        next: Arc<AtomicUsize>,
    },
    Http { url: String, client: reqwest::Client },
}

/// Response shape of the random joke endpoint; extra fields are ignored.
#[derive(Debug, Deserialize)]
struct ApiJoke {
    setup: String,
    punchline: String,
}

impl JokeApiAdapter {
    pub fn with_config(config: &JokeBridgeConfig) -> Self {
        let mode = match &config.joke_api_url {
            Some(url) => match http_client(config.request_timeout_ms) {
                Ok(client) => JokeMode::Http {
                    url: url.clone(),
                    client,
                },
                Err(e) => JokeMode::Disabled(format!("joke client init failed: {e}")),
            },
            None if config.strict_runtime_required() => JokeMode::Disabled(
                "joke API URL not configured in production runtime profile".to_owned(),
            ),
            None => return Self::fixed(builtin_jokes()),
        };
        Self { mode }
    }

    pub fn fixed(jokes: Vec<JokePayload>) -> Self {
        Self {
            mode: JokeMode::Fixed {
                jokes: Arc::new(jokes),
                next: Arc::new(AtomicUsize::new(0)),
            },
        }
    }
}

impl JokeSourcePort for JokeApiAdapter {
    async fn fetch_joke(&self) -> Result<JokePayload, PortError> {
        match &self.mode {
            JokeMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            JokeMode::Fixed { jokes, next } => {
                if jokes.is_empty() {
                    return Err(PortError::NotFound("no jokes configured".to_owned()));
                }
                let index = next.fetch_add(1, Ordering::Relaxed) % jokes.len();
                Ok(jokes[index].clone())
            }
            JokeMode::Http { url, client } => {
                let response = client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| PortError::Transport(format!("joke request failed: {e}")))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(PortError::Transport(format!("joke api status {status}")));
                }
                let joke: ApiJoke = response
                    .json()
                    .await
                    .map_err(|e| PortError::Validation(format!("malformed joke: {e}")))?;
                let joke = JokePayload::new(joke.setup, joke.punchline);
                if !joke.is_complete() {
                    return Err(PortError::Validation("joke is missing a line".to_owned()));
                }
                tracing::debug!(setup = %joke.setup, "joke fetched");
                Ok(joke)
            }
        }
    }
}

fn builtin_jokes() -> Vec<JokePayload> {
    vec![
        JokePayload::new(
            "Why do programmers prefer dark mode?",
            "Because light attracts bugs.",
        ),
        JokePayload::new(
            "Why did the blockchain break up with the database?",
            "It wanted a more committed relationship.",
        ),
        JokePayload::new(
            "How many programmers does it take to change a light bulb?",
            "None, that's a hardware problem.",
        ),
    ]
}
