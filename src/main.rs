// MoodLog - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation
// 3. Record store and (optional) session provider construction
// 4. eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` can still use
// `crate::app::...`, `crate::ui::...` etc.
pub use moodlog::app;

pub use moodlog::core;
pub use moodlog::platform;
pub use moodlog::ui;
pub use moodlog::util;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Configure fonts for the egui context.
///
/// On Windows, loads Segoe UI and Segoe UI Emoji from the system font
/// directory and puts them ahead of the egui built-ins so emoji symbols in
/// the picker and on entry cards render as glyphs rather than squares.
///
/// On non-Windows platforms the egui defaults are used unchanged.
fn configure_fonts(ctx: &egui::Context) {
    #[cfg(target_os = "windows")]
    {
        let mut fonts = egui::FontDefinitions::default();

        let candidates: &[(&str, &str)] = &[
            ("Segoe UI", r"C:\Windows\Fonts\segoeui.ttf"),
            ("Segoe UI Emoji", r"C:\Windows\Fonts\seguiemj.ttf"),
        ];

        let mut loaded_names: Vec<&str> = Vec::new();
        for (name, path) in candidates {
            match std::fs::read(path) {
                Ok(data) => {
                    fonts
                        .font_data
                        .insert((*name).to_owned(), egui::FontData::from_owned(data).into());
                    loaded_names.push(name);
                }
                Err(e) => {
                    tracing::warn!(
                        font = name,
                        error = %e,
                        "Failed to load Windows system font; emoji may render as squares"
                    );
                }
            }
        }

        if !loaded_names.is_empty() {
            if let Some(proportional) = fonts.families.get_mut(&egui::FontFamily::Proportional) {
                for (i, name) in loaded_names.iter().enumerate() {
                    proportional.insert(i, (*name).to_owned());
                }
            }
            ctx.set_fonts(fonts);
            tracing::info!(fonts = ?loaded_names, "Windows system fonts configured");
        }
    }

    #[cfg(not(target_os = "windows"))]
    let _ = ctx;
}

/// MoodLog - a one-entry-a-day mood journal backed by a hosted table store.
#[derive(Parser, Debug)]
#[command(name = "MoodLog", version, about)]
struct Cli {
    /// Project URL of the hosted backend.
    #[arg(long, env = util::constants::ENV_STORE_URL)]
    url: Option<String>,

    /// Public anon key of the hosted backend.
    #[arg(long = "anon-key", env = util::constants::ENV_ANON_KEY, hide_env_values = true)]
    anon_key: Option<String>,

    /// Require sign-in with this OAuth provider (e.g. `github`).
    #[arg(long = "auth")]
    auth: Option<String>,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform::config::PlatformPaths::resolve().config_file());
    let (config, config_warnings) = platform::config::load_config(&config_path);

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "MoodLog starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let settings = match platform::config::resolve_store_settings(
        cli.url.as_deref(),
        cli.anon_key.as_deref(),
        &config,
    ) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    let store = match platform::rest::RestRecordStore::new(&settings.url, &settings.anon_key) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    let provider_name = cli.auth.clone().or_else(|| config.auth_provider.clone());
    if let Some(name) = &provider_name {
        if !platform::config::is_valid_provider_name(name) {
            eprintln!("Error: '{name}' is not a valid OAuth provider name");
            std::process::exit(2);
        }
    }

    let state = app::state::AppState::new(config.dark_mode, provider_name.is_some(), cli.debug);
    let mut view = app::view::EntryLogView::new(store, state);

    if let Some(name) = provider_name {
        match platform::auth::OAuthSessionProvider::new(
            &settings.url,
            &settings.anon_key,
            config.callback_port,
        ) {
            Ok(provider) => {
                tracing::info!(provider = %name, "Sign-in required");
                view = view.with_auth(Arc::new(provider), &name);
            }
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(2);
            }
        }
    }

    view.activate();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([760.0, 900.0])
            .with_min_inner_size([420.0, 480.0]),
        ..Default::default()
    };

    let font_size = config.font_size;
    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |cc| {
            configure_fonts(&cc.egui_ctx);
            Ok(Box::new(gui::MoodLogApp::new(view, font_size)))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch MoodLog GUI: {e}");
        std::process::exit(1);
    }
}
