//! Main application state and update loop

use std::sync::{Arc, Mutex, PoisonError};

use eframe::egui;
use web_time::Instant;

use joke_bridge_core::FlowCommand;

use crate::bridge::{CommandSlot, FlowBridge};
use crate::state::ShellState;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(148, 206, 0);

pub struct App {
    bridge: FlowBridge,
    state: ShellState,
    /// Async command result receiver
    command_result: CommandSlot,
}

impl App {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let bridge = FlowBridge::default();
        let state = ShellState {
            status: bridge.status(),
            ..ShellState::default()
        };
        Self {
            bridge,
            state,
            command_result: Arc::new(Mutex::new(None)),
        }
    }

    fn run(&mut self, command: FlowCommand, ctx: &egui::Context) {
        if self.state.is_busy() {
            return;
        }
        tracing::debug!(?command, "dispatching");
        self.state.begin(&command);
        self.bridge.dispatch(command, &self.command_result, ctx);
    }

    fn check_command_result(&mut self) {
        let finished = self
            .command_result
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((command, result)) = finished {
            self.state
                .finish(command, result, self.bridge.status(), Instant::now());
        }
    }

    fn render_wallet_row(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            let label = self.state.connect_label();
            let enabled = !self.state.is_busy();
            if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                let command = if self.state.status.connected {
                    FlowCommand::Disconnect
                } else {
                    FlowCommand::Connect
                };
                self.run(command, ctx);
            }
            match self.state.status.account {
                Some(account) => ui.monospace(account.to_string()),
                None => ui.weak("not connected"),
            };
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.weak(format!("provider: {}", self.bridge.provider_mode()));
            });
        });
    }

    fn render_joke_box(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, now: Instant) {
        let frame = egui::Frame::group(ui.style()).inner_margin(16.0);
        let frame = if self.state.joke.is_some() {
            frame.stroke(egui::Stroke::new(2.0, ACCENT))
        } else {
            frame
        };
        frame.show(ui, |ui| {
            ui.set_min_height(90.0);
            ui.set_width(ui.available_width());
            match self.state.setup() {
                Some(setup) => {
                    ui.label(egui::RichText::new(setup).size(18.0));
                }
                None => {
                    ui.weak("Pay for a joke to get one.");
                }
            }
            if let Some(punchline) = self.state.punchline(now) {
                ui.add_space(6.0);
                ui.label(egui::RichText::new(punchline).size(18.0).strong());
            }
        });

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            let joke_label = self.state.joke_label(now);
            if ui
                .add_enabled(self.state.can_get_joke(), egui::Button::new(joke_label))
                .clicked()
            {
                self.run(FlowCommand::PayForJoke, ctx);
            }
            if ui
                .add_enabled(self.state.can_mint(now), egui::Button::new("Mint NFT"))
                .clicked()
            {
                self.run(FlowCommand::MintCurrentJoke, ctx);
            }
            if ui
                .add_enabled(self.state.can_bridge(), egui::Button::new("Bridge"))
                .clicked()
            {
                self.run(FlowCommand::BridgeAndBurn, ctx);
            }
            if self.state.is_busy() {
                ui.spinner();
            }
        });
    }

    fn render_messages(&self, ui: &mut egui::Ui, now: Instant) {
        if let Some(minted) = self.state.minted_notice(now) {
            ui.hyperlink_to("Your NFT is minted", &minted.explorer_url);
        }
        if let Some(token) = self.state.status.armed_token {
            ui.label(format!("Token {token} is ready to bridge"));
        }
        if let Some(info) = &self.state.info {
            ui.label(info);
        }
        if let Some(error) = &self.state.error {
            ui.colored_label(egui::Color32::from_rgb(255, 100, 100), error);
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());
        self.check_command_result();
        let now = Instant::now();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.heading(egui::RichText::new("Joke Bridge").size(22.0).color(ACCENT));
            ui.add_space(4.0);
            self.render_wallet_row(ui, ctx);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(10.0);
            self.render_joke_box(ui, ctx, now);
            ui.add_space(10.0);
            self.render_messages(ui, now);
        });

        if let Some(wait) = self.state.next_deadline(now) {
            ctx.request_repaint_after(wait);
        }
    }
}
