// MoodLog - ui/panels/summary.rs
//
// Mood summary side panel: one horizontal bar per mood present in the
// loaded entries, plus the mean energy rating.

use crate::app::state::AppState;
use crate::core::stats;
use crate::ui::theme;

/// Render the mood summary panel (if `state.show_summary` is true).
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_summary {
        return;
    }

    let summary = stats::summarise(&state.entries);
    egui::SidePanel::right("mood_summary")
        .resizable(false)
        .exact_width(theme::SUMMARY_PANEL_WIDTH)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Mood Summary");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("\u{2715}").clicked() {
                        state.show_summary = false;
                    }
                });
            });
            ui.separator();

            if summary.total == 0 {
                ui.label(egui::RichText::new("No entries loaded.").weak());
                return;
            }

            let max = summary.max_count().max(1) as f32;
            egui::Grid::new("mood_summary_bars")
                .num_columns(3)
                .spacing([8.0, 4.0])
                .show(ui, |ui| {
                    for (label, count) in &summary.counts {
                        let shown = if label.is_empty() { "(none)" } else { label };
                        ui.label(shown);
                        let width = 100.0 * (*count as f32 / max);
                        let (rect, _) = ui.allocate_exact_size(
                            egui::vec2(100.0, theme::CHART_BAR_HEIGHT),
                            egui::Sense::hover(),
                        );
                        let bar = egui::Rect::from_min_size(
                            rect.min,
                            egui::vec2(width, theme::CHART_BAR_HEIGHT),
                        );
                        ui.painter().rect_filled(bar, 2.0, theme::mood_colour(label));
                        ui.label(count.to_string());
                        ui.end_row();
                    }
                });

            ui.add_space(8.0);
            ui.separator();
            ui.label(format!("Entries: {}", summary.total));
            match summary.mean_energy {
                Some(mean) => ui.label(format!("Mean energy: {mean:.1} / 10")),
                None => ui.label(egui::RichText::new("No energy ratings yet.").weak()),
            };
        });
}
