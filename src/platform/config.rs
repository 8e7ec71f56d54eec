// MoodLog - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for MoodLog configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/moodlog/ or %APPDATA%\MoodLog\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Full path of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[store]` section.
    pub store: StoreSection,
    /// `[auth]` section.
    pub auth: AuthSection,
    /// `[ui]` section.
    pub ui: UiSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[store]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub url: Option<String>,
    /// Public anon key sent as `apikey`.
    pub anon_key: Option<String>,
}

/// `[auth]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// OAuth provider name; absent disables the session gate.
    pub provider: Option<String>,
    /// Loopback port for the redirect listener.
    pub callback_port: Option<u16>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme: "dark" or "light".
    pub theme: Option<String>,
    /// Body font size in points.
    pub font_size: Option<f32>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Store --
    pub store_url: Option<String>,
    pub anon_key: Option<String>,

    // -- Auth --
    pub auth_provider: Option<String>,
    pub callback_port: u16,

    // -- UI --
    /// Dark mode (true) or light mode (false).
    pub dark_mode: bool,
    /// Body font size in points.
    pub font_size: f32,

    // -- Logging --
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            anon_key: None,
            auth_provider: None,
            callback_port: constants::DEFAULT_CALLBACK_PORT,
            dark_mode: false,
            font_size: constants::DEFAULT_FONT_SIZE,
            log_level: None,
        }
    }
}

/// True for names like `github`, `google`, `azure`, `linkedin_oidc`.
pub fn is_valid_provider_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

/// Load and validate `config.toml` at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unreadable or unparseable, returns defaults with a warning
/// so the application still starts but the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) => {
            let e = ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            };
            warnings.push(format!("{e}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            let e = ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source,
            };
            warnings.push(format!("{e}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let (config, mut field_warnings) = validate(raw);
    warnings.append(&mut field_warnings);
    (config, warnings)
}

/// Validate each field, accumulating all problems rather than stopping at
/// the first.
fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();
    let mut reject = |field: &str, value: String, expected: String| {
        warnings.push(
            ConfigError::ValueOutOfRange {
                field: field.to_string(),
                value,
                expected,
            }
            .to_string(),
        );
    };

    // -- Store --
    config.store_url = raw.store.url.filter(|u| !u.trim().is_empty());
    config.anon_key = raw.store.anon_key.filter(|k| !k.trim().is_empty());

    // -- Auth: provider --
    if let Some(provider) = raw.auth.provider {
        let provider = provider.trim().to_lowercase();
        if is_valid_provider_name(&provider) {
            config.auth_provider = Some(provider);
        } else {
            reject(
                "auth.provider",
                provider,
                "a provider name such as \"github\" (sign-in disabled)".to_string(),
            );
        }
    }

    // -- Auth: callback_port --
    if let Some(port) = raw.auth.callback_port {
        if port >= constants::MIN_CALLBACK_PORT {
            config.callback_port = port;
        } else {
            reject(
                "auth.callback_port",
                port.to_string(),
                format!(
                    "{}-65535 (using {})",
                    constants::MIN_CALLBACK_PORT,
                    constants::DEFAULT_CALLBACK_PORT
                ),
            );
        }
    }

    // -- UI: theme --
    if let Some(theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            _ => reject(
                "ui.theme",
                theme,
                "\"dark\" or \"light\" (using light)".to_string(),
            ),
        }
    }

    // -- UI: font_size --
    if let Some(size) = raw.ui.font_size {
        if (constants::MIN_FONT_SIZE..=constants::MAX_FONT_SIZE).contains(&size) {
            config.font_size = size;
        } else {
            reject(
                "ui.font_size",
                size.to_string(),
                format!(
                    "{}-{} (using {})",
                    constants::MIN_FONT_SIZE,
                    constants::MAX_FONT_SIZE,
                    constants::DEFAULT_FONT_SIZE
                ),
            );
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            reject(
                "logging.level",
                level,
                "error, warn, info, debug, or trace (using info)".to_string(),
            );
        }
    }

    (config, warnings)
}

// =============================================================================
// Store settings
// =============================================================================

/// Connection settings for the hosted backend after merging all sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub url: String,
    pub anon_key: String,
}

/// Merge connection settings. `override_*` values come from the CLI or
/// environment and win over config.toml.
pub fn resolve_store_settings(
    override_url: Option<&str>,
    override_key: Option<&str>,
    config: &AppConfig,
) -> Result<StoreSettings, ConfigError> {
    let url = override_url
        .map(str::to_string)
        .or_else(|| config.store_url.clone())
        .filter(|u| !u.trim().is_empty())
        .ok_or(ConfigError::Missing {
            field: "store.url",
            hint: "Pass --url, set MOODLOG_URL, or add [store] url to config.toml.",
        })?;

    let anon_key = override_key
        .map(str::to_string)
        .or_else(|| config.anon_key.clone())
        .filter(|k| !k.trim().is_empty())
        .ok_or(ConfigError::Missing {
            field: "store.anon_key",
            hint: "Pass --anon-key, set MOODLOG_ANON_KEY, or add [store] anon_key to config.toml.",
        })?;

    Ok(StoreSettings {
        url: url.trim().to_string(),
        anon_key: anon_key.trim().to_string(),
    })
}
