// MoodLog - gui.rs
//
// Top-level eframe::App implementation.
// Drives the Entry Log View each frame: applies finished requests, acts on
// panel request flags, and lays out the panels.

use crate::app::view::EntryLogView;
use crate::ui;
use crate::util::constants::{HERO_SUBTITLE, HERO_TITLE};

/// The MoodLog application.
pub struct MoodLogApp {
    pub view: EntryLogView,
    font_size: f32,
    /// Theme last pushed to the egui context; `None` until the first frame.
    applied_dark_mode: Option<bool>,
}

impl MoodLogApp {
    /// Create a new application instance around an activated view.
    pub fn new(view: EntryLogView, font_size: f32) -> Self {
        Self {
            view,
            font_size,
            applied_dark_mode: None,
        }
    }

    /// Consume the request flags raised by panels during the last frame.
    fn handle_requests(&mut self, ctx: &egui::Context) {
        if std::mem::take(&mut self.view.state.request_toggle_theme) {
            self.view.toggle_theme();
        }
        if std::mem::take(&mut self.view.state.request_refresh) {
            if let Err(e) = self.view.load() {
                self.view.state.error = Some(e.to_string());
            }
        }
        if self.view.state.take_submit_request() {
            // Validation failures already raised the alert; store failures
            // arrive later through poll().
            if let Err(e) = self.view.submit() {
                tracing::debug!(error = %e, "Submit refused");
            }
        }
        if std::mem::take(&mut self.view.state.request_sign_in) {
            match self.view.begin_sign_in() {
                Ok(url) => ctx.open_url(egui::OpenUrl::new_tab(url)),
                Err(e) => tracing::warn!(error = %e, "Sign-in not started"),
            }
        }
        if std::mem::take(&mut self.view.state.request_cancel_sign_in) {
            self.view.cancel_sign_in();
        }
    }
}

impl eframe::App for MoodLogApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.view.poll();
        self.handle_requests(ctx);

        let dark = self.view.state.dark_mode;
        if self.applied_dark_mode != Some(dark) {
            ui::theme::apply(ctx, dark, self.font_size);
            self.applied_dark_mode = Some(dark);
        }

        // Keep polling while anything is outstanding so results appear promptly.
        if self.view.is_busy() || self.view.state.auth.is_authenticating() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        // Gate closed: nothing but the login screen is reachable.
        if !self.view.state.is_unlocked() {
            let provider = self.view.provider_name().unwrap_or("provider").to_string();
            egui::CentralPanel::default().show(ctx, |ui| {
                ui::panels::login::render(ui, &mut self.view.state, &provider);
            });
            return;
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Refresh").clicked() {
                        self.view.state.request_refresh = true;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui
                        .checkbox(&mut self.view.state.show_summary, "Mood Summary")
                        .clicked()
                    {
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("About").clicked() {
                        self.view.state.show_about = true;
                        ui.close_menu();
                    }
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let label = ui::theme::toggle_label(self.view.state.dark_mode);
                    if ui.button(label).on_hover_text("Toggle theme").clicked() {
                        self.view.state.request_toggle_theme = true;
                    }
                    if let Some(session) = self.view.state.auth.session() {
                        ui.label(egui::RichText::new(session.display_name()).weak());
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.view.state.status_message);
                if self.view.is_busy() {
                    ui.spinner();
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let total = self.view.state.entries.len();
                    if total > 0 {
                        ui.label(format!("{total} entries"));
                    }
                });
            });
        });

        ui::panels::summary::render(ctx, &mut self.view.state);

        // Central panel: header, form, feed
        let busy = self.view.is_busy();
        let mut dismiss_error = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            dismiss_error = ui::panels::notices::render_error_banner(ui, &self.view.state);
            egui::ScrollArea::vertical()
                .id_salt("journal_scroll")
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.set_max_width(ui::theme::CONTENT_MAX_WIDTH);
                        ui.add_space(12.0);
                        ui.label(egui::RichText::new(HERO_TITLE).size(30.0).strong());
                        ui.label(egui::RichText::new(HERO_SUBTITLE).weak());
                        ui.add_space(16.0);

                        ui.with_layout(egui::Layout::top_down(egui::Align::LEFT), |ui| {
                            ui::panels::form::render(ui, &mut self.view.state, busy);
                            ui.add_space(16.0);
                            ui.separator();
                            ui::panels::feed::render(ui, &self.view.state);
                        });
                    });
                });
        });
        if dismiss_error {
            self.view.dismiss_error();
        }

        // Dialogs
        ui::panels::notices::render_alert(ctx, &mut self.view.state);
        ui::panels::about::render(ctx, &mut self.view.state);
    }
}
