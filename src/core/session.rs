// MoodLog - core/session.rs
//
// Authenticated session model, the session-provider abstraction, and the
// sign-in state machine that gates the Entry Log View.
//
// States: Unauthenticated -> Authenticating -> Authenticated.
// There is no sign-out; Authenticated is terminal for the view's lifetime
// (a later sign-in event only replaces the session, e.g. a token refresh).

use crate::util::error::AuthError;
use chrono::{DateTime, Utc};

// =============================================================================
// Session
// =============================================================================

/// An authenticated user context obtained from the OAuth flow.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token for store requests. Never logged.
    pub access_token: String,

    /// Token used to obtain a new access token. Never logged.
    pub refresh_token: Option<String>,

    /// Owner identifier attached to new entries.
    pub user_id: String,

    pub email: Option<String>,

    pub expires_at: Option<DateTime<Utc>>,
}

// Tokens are redacted so a stray `{:?}` cannot leak them into logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Session {
    /// Name to show in the UI: the email when known, otherwise the user ID.
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.user_id)
    }
}

// =============================================================================
// Session provider
// =============================================================================

/// Notification delivered to session-change subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The provider now holds a valid session.
    SignedIn(Session),

    /// A sign-in attempt ended without a session.
    Failed(String),
}

/// Subscriber callback. Invoked on the provider's own thread.
pub type SessionCallback = Box<dyn Fn(&SessionEvent) + Send + Sync>;

/// External identity provider.
pub trait SessionProvider: Send + Sync {
    /// The session held right now, if any.
    fn current_session(&self) -> Option<Session>;

    /// Register `callback` for every subsequent session change.
    fn on_session_change(&self, callback: SessionCallback);

    /// Start an OAuth sign-in with `provider` (e.g. "github").
    ///
    /// Returns the authorize URL the user must open in a browser; the result
    /// arrives later through the change callbacks.
    fn sign_in_with_provider(&self, provider: &str) -> Result<String, AuthError>;

    /// Abandon the pending sign-in, if any. No event is published for it.
    fn cancel_sign_in(&self) {}
}

// =============================================================================
// Auth state machine
// =============================================================================

/// Sign-in progress of the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No session. `last_error` holds the reason the previous attempt failed.
    Unauthenticated { last_error: Option<String> },

    /// Waiting for the provider's callback.
    Authenticating { provider: String },

    Authenticated(Session),
}

impl Default for AuthState {
    fn default() -> Self {
        AuthState::Unauthenticated { last_error: None }
    }
}

impl AuthState {
    /// Unauthenticated -> Authenticating. Returns false (and stays put) from
    /// any other state.
    pub fn begin(&mut self, provider: &str) -> bool {
        match self {
            AuthState::Unauthenticated { .. } => {
                *self = AuthState::Authenticating {
                    provider: provider.to_string(),
                };
                true
            }
            _ => false,
        }
    }

    /// Any state -> Authenticated.
    ///
    /// Accepted from Unauthenticated as well so a provider that already holds
    /// a session at startup skips the login screen.
    pub fn complete(&mut self, session: Session) {
        *self = AuthState::Authenticated(session);
    }

    /// Authenticating -> Unauthenticated with the failure reason. Ignored in
    /// other states so a late failure cannot revoke an established session.
    pub fn fail(&mut self, reason: String) -> bool {
        match self {
            AuthState::Authenticating { .. } => {
                *self = AuthState::Unauthenticated {
                    last_error: Some(reason),
                };
                true
            }
            _ => false,
        }
    }

    /// Authenticating -> Unauthenticated with no error. Returns false from
    /// any other state.
    pub fn cancel(&mut self) -> bool {
        match self {
            AuthState::Authenticating { .. } => {
                *self = AuthState::Unauthenticated { last_error: None };
                true
            }
            _ => false,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn is_authenticating(&self) -> bool {
        matches!(self, AuthState::Authenticating { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            access_token: "secret-token".to_string(),
            refresh_token: Some("secret-refresh".to_string()),
            user_id: "user-1".to_string(),
            email: None,
            expires_at: None,
        }
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut state = AuthState::default();
        assert!(state.begin("github"));
        assert!(state.is_authenticating());
        state.complete(session());
        assert!(state.is_authenticated());
        assert_eq!(state.session().map(|s| s.user_id.as_str()), Some("user-1"));
    }

    #[test]
    fn test_begin_rejected_while_authenticating() {
        let mut state = AuthState::default();
        assert!(state.begin("github"));
        assert!(!state.begin("google"));
        assert_eq!(
            state,
            AuthState::Authenticating {
                provider: "github".to_string()
            }
        );
    }

    #[test]
    fn test_failure_returns_to_unauthenticated_with_reason() {
        let mut state = AuthState::default();
        state.begin("github");
        assert!(state.fail("denied".to_string()));
        assert_eq!(
            state,
            AuthState::Unauthenticated {
                last_error: Some("denied".to_string())
            }
        );
        // A retry is allowed after failure.
        assert!(state.begin("github"));
    }

    #[test]
    fn test_cancel_allows_a_fresh_attempt() {
        let mut state = AuthState::default();
        assert!(!state.cancel());
        assert!(state.begin("github"));
        assert!(state.cancel());
        assert_eq!(state, AuthState::Unauthenticated { last_error: None });
        assert!(state.begin("github"));

        state.complete(session());
        assert!(!state.cancel());
        assert!(state.is_authenticated());
    }

    #[test]
    fn test_late_failure_does_not_revoke_session() {
        let mut state = AuthState::default();
        state.complete(session());
        assert!(!state.fail("late".to_string()));
        assert!(state.is_authenticated());
        assert!(!state.begin("github"));
    }

    #[test]
    fn test_debug_output_redacts_tokens() {
        let rendered = format!("{:?}", session());
        assert!(!rendered.contains("secret-token"));
        assert!(!rendered.contains("secret-refresh"));
        assert!(rendered.contains("user-1"));
    }

    #[test]
    fn test_display_name_prefers_email() {
        let mut s = session();
        assert_eq!(s.display_name(), "user-1");
        s.email = Some("a@example.com".to_string());
        assert_eq!(s.display_name(), "a@example.com");
    }
}
