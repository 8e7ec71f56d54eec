// MoodLog - ui/panels/form.rs
//
// Entry form: mood picker, story field, emoji row, optional energy slider,
// and the submit button. Editing mutates `state.form` directly; submitting
// only raises `state.request_submit` for the app to act on.

use crate::app::state::AppState;
use crate::core::model::Mood;
use crate::ui::theme;
use crate::util::constants::{MAX_ENERGY, MIN_ENERGY};

/// Render the entry form.
pub fn render(ui: &mut egui::Ui, state: &mut AppState, busy: bool) {
    let dark = state.dark_mode;
    let form = &mut state.form;

    ui.label(egui::RichText::new("Your Vibe of the Day").strong());
    egui::ComboBox::from_id_salt("mood_picker")
        .selected_text(form.mood.map(|m| m.label()).unwrap_or("Select Mood"))
        .width(220.0)
        .show_ui(ui, |ui| {
            for mood in Mood::all() {
                ui.selectable_value(&mut form.mood, Some(*mood), mood.label());
            }
        });

    ui.add_space(8.0);
    ui.label(egui::RichText::new("Your Story of the Day").strong());
    ui.add(
        egui::TextEdit::multiline(&mut form.description)
            .hint_text("What made today cinematic?")
            .desired_rows(4)
            .desired_width(f32::INFINITY),
    );

    ui.add_space(8.0);
    ui.label(egui::RichText::new("Describe your day (Emoji)").strong());
    ui.horizontal_wrapped(|ui| {
        for emoji in &state.emojis {
            let selected = form.emoji_id == Some(emoji.id);
            let text = egui::RichText::new(&emoji.symbol).size(theme::EMOJI_BUTTON_SIZE);
            if ui.selectable_label(selected, text).clicked() {
                form.emoji_id = Some(emoji.id);
            }
        }
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.checkbox(&mut form.energy_enabled, "Rate my energy");
        ui.add_enabled(
            form.energy_enabled,
            egui::Slider::new(&mut form.energy, MIN_ENERGY..=MAX_ENERGY).text("/ 10"),
        );
    });

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        let button = egui::Button::new(
            egui::RichText::new("Capture Memory")
                .strong()
                .color(egui::Color32::WHITE),
        )
        .fill(theme::accent(dark));
        if ui.add(button).clicked() {
            state.request_submit = true;
        }
        if busy {
            ui.spinner();
        }
    });
}
