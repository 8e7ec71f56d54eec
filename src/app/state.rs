// MoodLog - app/state.rs
//
// Application state management. Holds the loaded entries, emoji set,
// pending form, theme flag, sign-in state, and user-visible messages.
// Owned by the Entry Log View; panels read it and raise request flags.

use crate::core::form::EntryForm;
use crate::core::model::{builtin_emojis, Emoji, JournalEntry};
use crate::core::session::AuthState;

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Entries from the most recent successful load, newest first as
    /// returned by the store. Replaced wholesale, never re-sorted.
    pub entries: Vec<JournalEntry>,

    /// Emoji picker options.
    pub emojis: Vec<Emoji>,

    /// Fields of the entry being written.
    pub form: EntryForm,

    /// Dark (true) or light (false) visuals.
    pub dark_mode: bool,

    /// Whether a session is required before anything else is reachable.
    pub auth_required: bool,

    /// Sign-in progress (only meaningful when `auth_required`).
    pub auth: AuthState,

    /// Blocking validation alert; the form stays usable once dismissed.
    pub alert: Option<String>,

    /// Most recent store failure, shown as a banner until dismissed.
    pub error: Option<String>,

    /// True once at least one load has completed successfully.
    pub loaded_once: bool,

    /// Status message for the status bar.
    pub status_message: String,

    /// Whether to show the mood summary side panel.
    pub show_summary: bool,

    /// Whether to show the About dialog.
    pub show_about: bool,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,

    // -- Requests raised by panels, consumed by the app each frame --
    pub request_submit: bool,
    pub request_refresh: bool,
    pub request_toggle_theme: bool,
    pub request_sign_in: bool,
    pub request_cancel_sign_in: bool,
}

impl AppState {
    /// Create initial state.
    pub fn new(dark_mode: bool, auth_required: bool, debug_mode: bool) -> Self {
        Self {
            entries: Vec::new(),
            emojis: builtin_emojis(),
            form: EntryForm::default(),
            dark_mode,
            auth_required,
            auth: AuthState::default(),
            alert: None,
            error: None,
            loaded_once: false,
            status_message: "Ready.".to_string(),
            show_summary: false,
            show_about: false,
            debug_mode,
            request_submit: false,
            request_refresh: false,
            request_toggle_theme: false,
            request_sign_in: false,
            request_cancel_sign_in: false,
        }
    }

    /// True when load and submit may run: no gate, or a session is present.
    pub fn is_unlocked(&self) -> bool {
        !self.auth_required || self.auth.is_authenticated()
    }

    /// Owner ID to stamp on new entries.
    pub fn owner_id(&self) -> Option<&str> {
        if self.auth_required {
            self.auth.session().map(|s| s.user_id.as_str())
        } else {
            None
        }
    }

    /// Consume the submit request. A request raised while the validation
    /// alert is open is dropped; the alert blocks the form.
    pub fn take_submit_request(&mut self) -> bool {
        let requested = std::mem::take(&mut self.request_submit);
        requested && self.alert.is_none()
    }

    /// Symbol of the emoji with `id`, if it is in the picker set.
    pub fn emoji_symbol(&self, id: i64) -> Option<&str> {
        self.emojis
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.symbol.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::Session;

    #[test]
    fn test_ungated_state_is_unlocked_without_owner() {
        let state = AppState::new(false, false, false);
        assert!(state.is_unlocked());
        assert_eq!(state.owner_id(), None);
        assert!(!state.emojis.is_empty(), "picker must start with the built-in set");
    }

    #[test]
    fn test_gated_state_unlocks_after_sign_in() {
        let mut state = AppState::new(false, true, false);
        assert!(!state.is_unlocked());
        state.auth.complete(Session {
            access_token: "t".to_string(),
            refresh_token: None,
            user_id: "u-9".to_string(),
            email: None,
            expires_at: None,
        });
        assert!(state.is_unlocked());
        assert_eq!(state.owner_id(), Some("u-9"));
    }

    #[test]
    fn test_submit_request_dropped_while_alert_open() {
        let mut state = AppState::new(false, false, false);
        state.alert = Some("Please select a mood.".to_string());
        state.request_submit = true;
        assert!(!state.take_submit_request());
        assert!(!state.request_submit);

        state.alert = None;
        state.request_submit = true;
        assert!(state.take_submit_request());
        assert!(!state.take_submit_request());
    }

    #[test]
    fn test_emoji_symbol_lookup() {
        let state = AppState::new(false, false, false);
        assert_eq!(state.emoji_symbol(3), Some("\u{1f525}"));
        assert_eq!(state.emoji_symbol(42), None);
    }
}
