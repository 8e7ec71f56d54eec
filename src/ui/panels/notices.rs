// MoodLog - ui/panels/notices.rs
//
// User-visible messages: the blocking validation alert and the dismissible
// store error banner.

use crate::app::state::AppState;
use crate::ui::theme;

/// Render the validation alert as a modal. The backdrop blocks the form
/// until the alert is closed; closing clears `state.alert` and leaves the
/// form contents untouched.
pub fn render_alert(ctx: &egui::Context, state: &mut AppState) {
    let Some(message) = state.alert.clone() else {
        return;
    };

    let mut dismissed = false;
    let response = egui::Modal::new(egui::Id::new("validation_alert")).show(ctx, |ui| {
        ui.set_width(320.0);
        ui.heading("Hold on");
        ui.add_space(4.0);
        ui.label(message);
        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
    });

    // Escape and clicks on the backdrop close it too.
    if dismissed || response.should_close() {
        state.alert = None;
    }
}

/// Render the error banner inside `ui`. Returns true when the user
/// dismissed it this frame.
pub fn render_error_banner(ui: &mut egui::Ui, state: &AppState) -> bool {
    let Some(message) = &state.error else {
        return false;
    };

    let mut dismissed = false;
    egui::Frame::default()
        .fill(theme::error_fill(state.dark_mode))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(format!("\u{26a0} {message}")).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("\u{2715}").clicked() {
                        dismissed = true;
                    }
                });
            });
        });
    dismissed
}
