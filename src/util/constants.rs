// MoodLog - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "MoodLog";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "MoodLog";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header shown above the entry form.
pub const HERO_TITLE: &str = "MEMORY ARCHIVE";

/// Sub-heading shown under the hero title.
pub const HERO_SUBTITLE: &str = "Chronicle your cinematic journey";

// =============================================================================
// Record store schema
// =============================================================================

/// Table holding journal entries.
pub const ENTRIES_TABLE: &str = "journal_entries";

/// Table holding the emoji reference set.
pub const EMOJIS_TABLE: &str = "emojis";

/// Column list for entry reads: every entry column plus the embedded symbol
/// of the referenced emoji.
pub const ENTRY_SELECT_COLUMNS: &str = "*,emojis(symbol)";

/// Timestamp column that defines feed order.
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Owner column, filtered on when the session gate is enabled.
pub const USER_ID_COLUMN: &str = "user_id";

/// Path prefix of the table API relative to the project URL.
pub const REST_PATH: &str = "rest/v1";

/// Path prefix of the auth API relative to the project URL.
pub const AUTH_PATH: &str = "auth/v1";

// =============================================================================
// Entry limits
// =============================================================================

/// Lowest accepted energy rating.
pub const MIN_ENERGY: u8 = 1;

/// Highest accepted energy rating.
pub const MAX_ENERGY: u8 = 10;

/// Slider position when the energy rating is first enabled.
pub const DEFAULT_ENERGY: u8 = 5;

/// Maximum description length in characters. Longer input is rejected by
/// the form so a pasted file cannot be shipped as one row.
pub const MAX_DESCRIPTION_CHARS: usize = 5_000;

// =============================================================================
// Network
// =============================================================================

/// TCP connect timeout for every store and auth request, in seconds.
///
/// Read time is unbounded: a stalled response leaves the request pending.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default loopback port for the OAuth redirect listener.
pub const DEFAULT_CALLBACK_PORT: u16 = 54321;

/// Lowest loopback port accepted from config (unprivileged range).
pub const MIN_CALLBACK_PORT: u16 = 1024;

/// Path the OAuth provider redirects back to on the loopback listener.
pub const CALLBACK_PATH: &str = "/callback";

/// Number of random bytes in the PKCE code verifier (base64url encoded to
/// 43 chars, the minimum length the auth server accepts).
pub const CODE_VERIFIER_BYTES: usize = 32;

/// How long the loopback listener waits for the OAuth redirect before the
/// attempt fails and the port is released.
pub const SIGN_IN_TIMEOUT_SECS: u64 = 300;

/// Time allowed for the callback page to finish sending once the listener
/// starts shutting down.
pub const CALLBACK_SHUTDOWN_GRACE_SECS: u64 = 2;

// =============================================================================
// Environment variables
// =============================================================================

/// Environment variable overriding `[store] url`.
pub const ENV_STORE_URL: &str = "MOODLOG_URL";

/// Environment variable overriding `[store] anon_key`.
pub const ENV_ANON_KEY: &str = "MOODLOG_ANON_KEY";

// =============================================================================
// UI
// =============================================================================

/// Default font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

/// Minimum user-configurable font size.
pub const MIN_FONT_SIZE: f32 = 10.0;

/// Maximum user-configurable font size.
pub const MAX_FONT_SIZE: f32 = 24.0;

/// Validation message shown when no emoji has been picked.
pub const MISSING_EMOJI_ALERT: &str = "Select an emoji that describes your day!";

// =============================================================================
// Config / logging
// =============================================================================

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default log level when neither RUST_LOG, --debug, nor config sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";
