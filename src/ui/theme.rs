// MoodLog - ui/theme.rs
//
// Light/dark visuals, mood colour mapping, and layout constants.
// No dependencies on app state or business logic.

use crate::core::model::Mood;
use egui::Color32;

/// Apply dark or light visuals and the body font size to the whole context.
pub fn apply(ctx: &egui::Context, dark_mode: bool, font_size: f32) {
    let mut visuals = if dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    visuals.selection.bg_fill = accent(dark_mode);
    ctx.set_visuals(visuals);

    ctx.style_mut(|style| {
        for (text_style, size) in [
            (egui::TextStyle::Body, font_size),
            (egui::TextStyle::Button, font_size),
            (egui::TextStyle::Heading, font_size * 1.6),
            (egui::TextStyle::Small, font_size * 0.75),
        ] {
            style
                .text_styles
                .insert(text_style, egui::FontId::proportional(size));
        }
    });
}

/// Label of the theme toggle: the mode it switches *to*.
pub fn toggle_label(dark_mode: bool) -> &'static str {
    if dark_mode {
        "\u{2600}" // sun
    } else {
        "\u{1f319}" // crescent moon
    }
}

/// Highlight colour for selected emoji and the submit button.
pub fn accent(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(139, 92, 246) // Violet 500
    } else {
        Color32::from_rgb(124, 58, 237) // Violet 600
    }
}

/// Card background behind each entry.
pub fn card_fill(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(31, 41, 55) // Gray 800
    } else {
        Color32::from_rgb(249, 250, 251) // Gray 50
    }
}

/// Error banner background.
pub fn error_fill(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(127, 29, 29) // Red 900
    } else {
        Color32::from_rgb(254, 226, 226) // Red 100
    }
}

/// Bar colour for a mood label in the summary chart.
pub fn mood_colour(label: &str) -> Color32 {
    match Mood::from_label(label) {
        Some(Mood::Fine) => Color32::from_rgb(96, 165, 250),          // Blue 400
        Some(Mood::NotFine) => Color32::from_rgb(248, 113, 113),      // Red 400
        Some(Mood::Productive) => Color32::from_rgb(251, 146, 60),    // Orange 400
        Some(Mood::Exhausted) => Color32::from_rgb(107, 114, 128),    // Gray 500
        Some(Mood::Romantic) => Color32::from_rgb(244, 114, 182),     // Pink 400
        Some(Mood::Unmotivated) => Color32::from_rgb(148, 163, 184),  // Slate 400
        Some(Mood::Peaceful) => Color32::from_rgb(74, 222, 128),      // Green 400
        Some(Mood::Overthinking) => Color32::from_rgb(167, 139, 250), // Violet 400
        Some(Mood::Inspired) => Color32::from_rgb(250, 204, 21),      // Yellow 400
        None => Color32::from_rgb(156, 163, 175),                     // Gray 400
    }
}

/// Layout constants.
pub const CONTENT_MAX_WIDTH: f32 = 640.0;
pub const SUMMARY_PANEL_WIDTH: f32 = 240.0;
pub const EMOJI_BUTTON_SIZE: f32 = 26.0;
pub const CARD_EMOJI_SIZE: f32 = 22.0;
pub const CHART_BAR_HEIGHT: f32 = 14.0;
