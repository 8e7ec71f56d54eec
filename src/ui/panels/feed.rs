// MoodLog - ui/panels/feed.rs
//
// Entry feed: one card per loaded entry, in the order the store returned
// them (newest first). Read-only; entries cannot be edited or deleted.

use crate::app::state::AppState;
use crate::core::model::JournalEntry;
use crate::ui::theme;

/// Render the feed of loaded entries.
pub fn render(ui: &mut egui::Ui, state: &AppState) {
    ui.heading("Your Entries");
    ui.add_space(4.0);

    if state.entries.is_empty() {
        ui.label(egui::RichText::new(empty_text(state)).weak().italics());
        return;
    }

    for entry in &state.entries {
        card(ui, entry, state);
        ui.add_space(6.0);
    }
}

/// Placeholder for an empty feed. A first load that failed says so instead
/// of claiming to still be loading.
fn empty_text(state: &AppState) -> &'static str {
    if state.loaded_once {
        "No memories yet. Capture your first one above."
    } else if state.error.is_some() {
        "Could not load memories."
    } else {
        "Loading memories..."
    }
}

fn card(ui: &mut egui::Ui, entry: &JournalEntry, state: &AppState) {
    // Fall back to the picker set when the read did not embed the symbol.
    let symbol = entry
        .symbol()
        .or_else(|| entry.emoji_id.and_then(|id| state.emoji_symbol(id)))
        .unwrap_or("\u{2022}");
    let date = entry
        .created_at
        .with_timezone(&chrono::Local)
        .format("%a %-d %b %Y")
        .to_string();

    egui::Frame::group(ui.style())
        .fill(theme::card_fill(state.dark_mode))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(symbol).size(theme::CARD_EMOJI_SIZE));
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(date).small().weak());
                    ui.horizontal(|ui| {
                        let mood = entry.mood_label();
                        if !mood.is_empty() {
                            ui.colored_label(
                                theme::mood_colour(mood),
                                egui::RichText::new(mood).strong(),
                            );
                        }
                        if let Some(energy) = entry.energy_level {
                            ui.label(egui::RichText::new(format!("\u{26a1} {energy}/10")).weak());
                        }
                    });
                });
            });
            if !entry.description.is_empty() {
                ui.add_space(2.0);
                ui.label(&entry.description);
            }
            if state.debug_mode {
                ui.label(egui::RichText::new(format!("id {}", entry.id)).small().weak());
            }
        });
}
