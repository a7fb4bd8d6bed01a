//! Consent gate
//!
//! Bilingual disclosure shown before anything else. Until the user
//! accepts, no other part of the UI is mounted, so recording is
//! structurally impossible rather than merely disabled.

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, RichText, Vec2};

const DISCLOSURE_POINTS: &[(&str, &str)] = &[
    (
        "هذا النظام يعتمد على الذكاء الاصطناعي، وليس بديلاً عن الاستشارة الطبية أو النفسية المباشرة.",
        "This system is AI-based and is not a substitute for direct medical or psychological consultation.",
    ),
    (
        "جميع المحادثات مسجلة ومجهولة الهوية لأغراض تحسين الخدمة وضمان السلامة.",
        "All conversations are recorded and anonymized to improve the service and ensure safety.",
    ),
    (
        "قد يتم تصعيد الحالات الحرجة إلى مختصين أو جهات طوارئ.",
        "Critical cases may be escalated to specialists or emergency services.",
    ),
    (
        "يرجى الموافقة على الشروط للمتابعة.",
        "Please accept the terms to continue.",
    ),
];

/// Disclosure/consent component
pub struct Disclosure<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> Disclosure<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(self.theme.spacing_lg);
            ui.heading(RichText::new("Hiwar").color(self.theme.text_primary));
            ui.label(
                RichText::new("Voice Assistant")
                    .size(14.0)
                    .color(self.theme.text_muted),
            );
            ui.add_space(self.theme.spacing_lg);

            egui::Frame::none()
                .fill(self.theme.bg_secondary)
                .rounding(self.theme.card_rounding)
                .inner_margin(self.theme.spacing_lg)
                .show(ui, |ui| {
                    ui.set_max_width(560.0);

                    ui.label(
                        RichText::new("تنويه وخصوصية")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    ui.label(
                        RichText::new("Notice & Privacy")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );
                    ui.add_space(self.theme.spacing);

                    for (arabic, english) in DISCLOSURE_POINTS {
                        ui.with_layout(egui::Layout::top_down(egui::Align::RIGHT), |ui| {
                            ui.label(
                                RichText::new(*arabic)
                                    .size(15.0)
                                    .color(self.theme.text_secondary),
                            );
                        });
                        ui.label(
                            RichText::new(*english)
                                .size(12.0)
                                .color(self.theme.text_muted),
                        );
                        ui.add_space(self.theme.spacing_sm);
                    }

                    ui.add_space(self.theme.spacing);

                    let accept = egui::Button::new(
                        RichText::new("أوافق وأبدأ  ·  I agree, let's begin")
                            .size(16.0)
                            .color(self.theme.text_primary),
                    )
                    .fill(self.theme.primary)
                    .rounding(self.theme.button_rounding)
                    .min_size(Vec2::new(280.0, 44.0));

                    if ui.add(accept).clicked() {
                        self.state.accept_disclosure();
                    }
                });
        });
    }
}
