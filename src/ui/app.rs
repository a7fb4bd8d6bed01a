//! Main application struct and eframe integration

use crate::config::Config;
use crate::ui::components::{Controls, Disclosure, TranscriptView};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, TopBottomPanel};

/// Main Hiwar application
pub struct HiwarApp {
    /// Application state
    state: AppState,
    /// Visual theme
    theme: Theme,
}

impl HiwarApp {
    /// Create a new Hiwar application
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        Self {
            state: AppState::new(config),
            theme,
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Hiwar")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    ui.label(
                        RichText::new("Voice Assistant")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(self.state.session.phase.to_string())
                                .size(11.0)
                                .family(egui::FontFamily::Monospace)
                                .color(self.theme.text_muted),
                        );
                    });
                });
            });
    }

    fn show_controls(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("controls")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                Controls::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                TranscriptView::new(&self.state, &self.theme).show(ui);
            });
    }
}

impl eframe::App for HiwarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Pump worker events into the state store
        self.state.poll_events();

        // Until consent, the disclosure is the only thing mounted
        if self.state.session.disclosure_visible {
            CentralPanel::default()
                .frame(egui::Frame::none().fill(self.theme.bg_primary))
                .show(ctx, |ui| {
                    Disclosure::new(&mut self.state, &self.theme).show(ui);
                });
            return;
        }

        self.show_header(ctx);
        self.show_controls(ctx);
        self.show_content(ctx);

        // Keep polling while a session is in flight
        if self.state.session.phase.is_active() {
            ctx.request_repaint();
        }
    }
}
