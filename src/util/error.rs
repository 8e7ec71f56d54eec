// MoodLog - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Every record store and auth call returns one of these; nothing is
// silently dropped on its way to the UI.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all MoodLog operations.
#[derive(Debug)]
pub enum MoodLogError {
    /// A form submission failed client-side validation.
    Validation(ValidationError),

    /// A record store request failed.
    Store(StoreError),

    /// The OAuth sign-in flow failed.
    Auth(AuthError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for MoodLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "{e}"),
            Self::Store(e) => write!(f, "Store error: {e}"),
            Self::Auth(e) => write!(f, "Sign-in error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for MoodLogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::Auth(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Reasons a pending entry cannot be submitted. Raised before any I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No emoji was picked.
    MissingEmoji,

    /// No mood was selected.
    MissingMood,

    /// The description is empty or whitespace only.
    EmptyDescription,

    /// The description exceeds the maximum length.
    DescriptionTooLong { length: usize, max: usize },

    /// The energy rating is outside the accepted range.
    EnergyOutOfRange { value: u8, min: u8, max: u8 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEmoji => {
                f.write_str(super::constants::MISSING_EMOJI_ALERT)
            }
            Self::MissingMood => f.write_str("Select a mood."),
            Self::EmptyDescription => f.write_str("Write something about your day."),
            Self::DescriptionTooLong { length, max } => write!(
                f,
                "Your story is {length} characters long; the limit is {max}."
            ),
            Self::EnergyOutOfRange { value, min, max } => {
                write!(f, "Energy {value} is out of range ({min}-{max}).")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for MoodLogError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

/// Errors from the record store client.
#[derive(Debug)]
pub enum StoreError {
    /// Transport-level failure (DNS, connect, TLS, broken body).
    Http {
        operation: &'static str,
        table: String,
        source: reqwest::Error,
    },

    /// The store answered with a non-success status.
    Status {
        operation: &'static str,
        table: String,
        status: u16,
        body: String,
    },

    /// A row could not be decoded into the expected shape.
    Decode {
        table: String,
        source: serde_json::Error,
    },

    /// A record could not be encoded for sending.
    Encode {
        table: String,
        source: serde_json::Error,
    },

    /// The session gate is enabled and no session is present.
    NotAuthenticated,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http {
                operation,
                table,
                source,
            } => write!(f, "{operation} on '{table}' failed: {source}"),
            Self::Status {
                operation,
                table,
                status,
                body,
            } => {
                if body.is_empty() {
                    write!(f, "{operation} on '{table}' returned HTTP {status}")
                } else {
                    write!(f, "{operation} on '{table}' returned HTTP {status}: {body}")
                }
            }
            Self::Decode { table, source } => {
                write!(f, "Malformed row in '{table}': {source}")
            }
            Self::Encode { table, source } => {
                write!(f, "Cannot encode record for '{table}': {source}")
            }
            Self::NotAuthenticated => f.write_str("Sign in to access your journal."),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::Encode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StoreError> for MoodLogError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ---------------------------------------------------------------------------
// Auth errors
// ---------------------------------------------------------------------------

/// Errors from the OAuth session provider.
#[derive(Debug)]
pub enum AuthError {
    /// The loopback callback listener could not be bound.
    Bind { port: u16, source: io::Error },

    /// The callback request from the browser could not be read.
    Callback { reason: String },

    /// The provider redirected back with an error (e.g. consent denied).
    Denied { description: String },

    /// Exchanging the authorization code for a session failed.
    Exchange { reason: String },

    /// No redirect reached the loopback listener in time.
    TimedOut { secs: u64 },

    /// A URL could not be built from the configured project URL.
    Url { url: String, reason: String },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { port, source } => write!(
                f,
                "Cannot listen for the sign-in callback on 127.0.0.1:{port}: {source}. \
                 Set [auth] callback_port in config.toml to a free port."
            ),
            Self::Callback { reason } => write!(f, "Invalid sign-in callback: {reason}"),
            Self::Denied { description } => write!(f, "Sign-in was refused: {description}"),
            Self::Exchange { reason } => write!(f, "Could not complete sign-in: {reason}"),
            Self::TimedOut { secs } => write!(
                f,
                "No response from the browser within {secs} s. Please try signing in again."
            ),
            Self::Url { url, reason } => write!(f, "Invalid auth URL '{url}': {reason}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<AuthError> for MoodLogError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// A required setting was not supplied by CLI, environment, or file.
    Missing {
        field: &'static str,
        hint: &'static str,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Missing { field, hint } => {
                write!(f, "No value for '{field}'. {hint}")
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for MoodLogError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for MoodLog results.
pub type Result<T> = std::result::Result<T, MoodLogError>;
