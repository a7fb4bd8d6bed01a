//! Transcript view
//!
//! Renders the two-party conversation either as two speaker columns or as
//! one interleaved list; which one is a pure display choice. The live
//! caption rides in the user column (or inline) while recording.

use crate::config::ChatLayout;
use crate::session::{Speaker, TranscriptEntry};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Color32, RichText};

/// Transcript component
pub struct TranscriptView<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> TranscriptView<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add_space(self.theme.spacing);
                if self.state.session.transcript.is_empty()
                    && self.state.session.visible_caption().is_none()
                {
                    self.show_empty_state(ui);
                } else {
                    match self.state.config.layout {
                        ChatLayout::Split => self.show_split(ui),
                        ChatLayout::Interleaved => self.show_interleaved(ui),
                    }
                }
                ui.add_space(self.theme.spacing);
            });
    }

    fn show_empty_state(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(self.theme.spacing_lg * 2.0);
            ui.label(
                RichText::new("Press the button below and start talking")
                    .size(16.0)
                    .color(self.theme.text_muted),
            );
        });
    }

    fn show_split(&self, ui: &mut egui::Ui) {
        ui.columns(2, |columns| {
            columns[0].label(
                RichText::new("You")
                    .size(16.0)
                    .strong()
                    .color(self.theme.text_primary),
            );
            for entry in self.state.session.transcript.for_speaker(Speaker::User) {
                Self::bubble(&mut columns[0], self.theme, entry, self.theme.user_bubble);
            }
            if let Some(caption) = self.state.session.visible_caption() {
                self.caption_bubble(&mut columns[0], caption);
            }

            columns[1].label(
                RichText::new("Bot")
                    .size(16.0)
                    .strong()
                    .color(self.theme.text_primary),
            );
            for entry in self.state.session.transcript.for_speaker(Speaker::Bot) {
                Self::bubble(&mut columns[1], self.theme, entry, self.theme.bot_bubble);
            }
        });
    }

    fn show_interleaved(&self, ui: &mut egui::Ui) {
        for entry in self.state.session.transcript.entries() {
            let fill = match entry.speaker {
                Speaker::User => self.theme.user_bubble,
                Speaker::Bot => self.theme.bot_bubble,
            };
            egui::Frame::none()
                .fill(fill)
                .rounding(self.theme.card_rounding)
                .inner_margin(self.theme.spacing_sm)
                .show(ui, |ui| {
                    ui.label(
                        RichText::new(format!("{}: {}", entry.speaker.label(), entry.text))
                            .color(self.theme.text_primary),
                    );
                });
            ui.add_space(self.theme.spacing_sm);
        }
        if let Some(caption) = self.state.session.visible_caption() {
            self.caption_bubble(ui, caption);
        }
    }

    fn bubble(ui: &mut egui::Ui, theme: &Theme, entry: &TranscriptEntry, fill: Color32) {
        egui::Frame::none()
            .fill(fill)
            .rounding(theme.card_rounding)
            .inner_margin(theme.spacing_sm)
            .show(ui, |ui| {
                ui.label(RichText::new(&entry.text).color(theme.text_primary));
            });
        ui.add_space(theme.spacing_sm);
    }

    fn caption_bubble(&self, ui: &mut egui::Ui, caption: &str) {
        egui::Frame::none()
            .fill(self.theme.caption_bubble)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing_sm)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(format!("You (speaking): {}", caption))
                        .italics()
                        .color(self.theme.text_secondary),
                );
            });
    }
}
