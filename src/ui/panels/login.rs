// MoodLog - ui/panels/login.rs
//
// Sign-in screen shown in place of everything else while the session gate
// is closed. The buttons only raise `state.request_sign_in` and
// `state.request_cancel_sign_in`.

use crate::app::state::AppState;
use crate::core::session::AuthState;
use crate::util::constants::{HERO_SUBTITLE, HERO_TITLE};

/// Render the sign-in screen for `provider`.
pub fn render(ui: &mut egui::Ui, state: &mut AppState, provider: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.25);
        ui.label(egui::RichText::new(HERO_TITLE).size(32.0).strong());
        ui.label(egui::RichText::new(HERO_SUBTITLE).weak());
        ui.add_space(24.0);

        match &state.auth {
            AuthState::Authenticating { .. } => {
                ui.spinner();
                ui.label("Waiting for the browser to finish signing in...");
                ui.add_space(8.0);
                if ui.button("Cancel").clicked() {
                    state.request_cancel_sign_in = true;
                }
            }
            AuthState::Unauthenticated { last_error } => {
                if ui
                    .button(egui::RichText::new(format!("Sign in with {provider}")).size(16.0))
                    .clicked()
                {
                    state.request_sign_in = true;
                }
                if let Some(err) = last_error {
                    ui.add_space(8.0);
                    ui.colored_label(egui::Color32::from_rgb(248, 113, 113), err);
                }
            }
            AuthState::Authenticated(session) => {
                ui.label(format!("Signed in as {}", session.display_name()));
            }
        }
    });
}
