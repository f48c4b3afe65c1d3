//! Shell state for the joke, mint and bridge panel.

use std::time::Duration;

use web_time::Instant;

use joke_bridge_core::{CommandResult, FlowCommand, FlowStatus, JokePayload, MintedToken};

use crate::bridge::BridgeError;

/// Delay between showing the setup and revealing the punchline.
pub const PUNCHLINE_DELAY: Duration = Duration::from_secs(3);
/// How long the minted-token link stays on screen.
pub const MINTED_NOTICE_TTL: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct ShownJoke {
    pub joke: JokePayload,
    pub shown_at: Instant,
}

#[derive(Debug, Default)]
pub struct ShellState {
    pub status: FlowStatus,
    pub in_flight: Option<FlowCommand>,
    pub joke: Option<ShownJoke>,
    pub jokes_seen: u32,
    pub minted: Option<(MintedToken, Instant)>,
    pub error: Option<String>,
    pub info: Option<String>,
}

impl ShellState {
    pub fn connect_label(&self) -> &'static str {
        if self.status.connected {
            "Disconnect"
        } else {
            "Connect wallet"
        }
    }

    pub fn joke_label(&self, now: Instant) -> &'static str {
        if self.jokes_seen > 1 || self.punchline(now).is_some() {
            "ANOTHER ONE"
        } else {
            "Get joke"
        }
    }

    pub fn setup(&self) -> Option<&str> {
        self.joke.as_ref().map(|shown| shown.joke.setup.as_str())
    }

    pub fn punchline(&self, now: Instant) -> Option<&str> {
        self.joke
            .as_ref()
            .filter(|shown| now.duration_since(shown.shown_at) >= PUNCHLINE_DELAY)
            .map(|shown| shown.joke.punchline.as_str())
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn can_get_joke(&self) -> bool {
        self.status.connected && !self.is_busy()
    }

    pub fn can_mint(&self, now: Instant) -> bool {
        self.status.connected && !self.is_busy() && self.punchline(now).is_some()
    }

    pub fn can_bridge(&self) -> bool {
        self.status.connected && !self.is_busy() && self.status.armed_token.is_some()
    }

    pub fn minted_notice(&self, now: Instant) -> Option<&MintedToken> {
        self.minted
            .as_ref()
            .filter(|(_, at)| now.duration_since(*at) < MINTED_NOTICE_TTL)
            .map(|(minted, _)| minted)
    }

    /// Time until the next timed change on screen, for scheduling a repaint.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        let reveal = self
            .joke
            .as_ref()
            .map(|shown| shown.shown_at + PUNCHLINE_DELAY)
            .filter(|at| *at > now);
        let hide = self
            .minted
            .as_ref()
            .map(|(_, at)| *at + MINTED_NOTICE_TTL)
            .filter(|at| *at > now);
        reveal
            .into_iter()
            .chain(hide)
            .min()
            .map(|at| at.duration_since(now))
    }

    pub fn begin(&mut self, command: &FlowCommand) {
        if matches!(command, FlowCommand::PayForJoke) {
            self.joke = None;
        }
        self.in_flight = Some(command.clone());
        self.error = None;
        self.info = None;
    }

    pub fn finish(
        &mut self,
        command: FlowCommand,
        result: Result<CommandResult, BridgeError>,
        status: FlowStatus,
        now: Instant,
    ) {
        self.in_flight = None;
        self.status = status;
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };

        match command {
            FlowCommand::Connect => {
                self.info = self
                    .status
                    .account
                    .map(|account| format!("Connected as {account}"));
            }
            FlowCommand::Disconnect => {
                self.info = Some("Wallet disconnected".to_owned());
            }
            FlowCommand::PayForJoke => {
                if let Some(joke) = result.joke {
                    self.joke = Some(ShownJoke {
                        joke,
                        shown_at: now,
                    });
                    self.jokes_seen += 1;
                }
            }
            FlowCommand::Mint { .. } | FlowCommand::MintCurrentJoke => {
                if let Some(minted) = result.minted {
                    self.info = Some(format!("Token {} minted", minted.token_id));
                    self.minted = Some((minted, now));
                }
            }
            FlowCommand::BridgeAndBurn => {
                if let Some(bridged) = result.bridged {
                    let mut info = format!("Token {} bridged and burned", bridged.token_id);
                    if !bridged.notified {
                        info.push_str(", notification not delivered");
                    }
                    self.info = Some(info);
                }
            }
        }
    }
}
