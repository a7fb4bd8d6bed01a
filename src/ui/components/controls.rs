//! Recording controls
//!
//! One toggle button: start when idle, stop when recording, disabled
//! whenever the session cannot accept the press.

use crate::session::Phase;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, RichText, Vec2};

/// Record toggle plus the status footer
pub struct Controls<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> Controls<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            self.show_toggle(ui);
        });
    }

    fn show_toggle(self, ui: &mut egui::Ui) {
        let session = &self.state.session;

        let (label, fill) = match session.phase {
            Phase::Idle => ("Start Talking", self.theme.primary),
            Phase::Starting => ("Starting…", self.theme.bg_tertiary),
            Phase::Recording => ("Stop Recording", self.theme.recording),
            Phase::Draining => ("Waiting for reply…", self.theme.bg_tertiary),
        };
        let enabled = session.toggle_enabled();
        let is_recording = session.phase.is_recording();

        let button = egui::Button::new(
            RichText::new(label)
                .size(16.0)
                .color(self.theme.text_primary),
        )
        .fill(fill)
        .rounding(self.theme.button_rounding)
        .min_size(Vec2::new(220.0, 44.0));

        let response = ui.add_enabled(enabled, button);

        if is_recording {
            // Pulsing ring while the microphone is live
            let t = ui.ctx().input(|i| i.time);
            let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;
            let rect = response.rect;
            ui.painter().rect_stroke(
                rect.expand(2.0 + pulse * 3.0),
                self.theme.button_rounding,
                egui::Stroke::new(
                    2.0 * pulse,
                    self.theme.recording.gamma_multiply(1.0 - pulse * 0.5),
                ),
            );
            ui.ctx().request_repaint();
        }

        if response.clicked() {
            self.state.toggle_recording();
        }

        if let Some(error) = &self.state.session.last_error {
            ui.add_space(self.theme.spacing_sm);
            ui.label(RichText::new(error).size(12.0).color(self.theme.error));
        }
    }
}
