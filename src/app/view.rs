// MoodLog - app/view.rs
//
// Entry Log View: the load / submit / render cycle against the record store,
// plus the optional session gate.
//
// The record store and session provider are injected at construction; the
// view owns the application state exclusively and mutates it only from the
// UI thread, in response to user input or completed requests.
//
// Failure handling:
//   - Validation failures raise a blocking alert; no request is issued.
//   - A failed load leaves the previous list in place and raises the banner.
//   - A failed insert keeps the form contents and raises the banner; no
//     follow-up load is issued.

use crate::app::requests::{StoreManager, StoreProgress};
use crate::app::state::AppState;
use crate::core::model::builtin_emojis;
use crate::core::session::{SessionEvent, SessionProvider};
use crate::core::store::{Query, RecordStore};
use crate::util::constants::{CREATED_AT_COLUMN, ENTRY_SELECT_COLUMNS, USER_ID_COLUMN};
use crate::util::error::{AuthError, MoodLogError, StoreError};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Session provider wiring for the gated configuration.
struct AuthGate {
    provider_name: String,
    provider: Arc<dyn SessionProvider>,
    events: mpsc::Receiver<SessionEvent>,
}

/// The single view of the application.
pub struct EntryLogView {
    pub state: AppState,
    requests: StoreManager,
    gate: Option<AuthGate>,
}

impl EntryLogView {
    /// Create an ungated view over `store`.
    pub fn new(store: Arc<dyn RecordStore>, state: AppState) -> Self {
        Self {
            state,
            requests: StoreManager::new(store),
            gate: None,
        }
    }

    /// Require a session from `provider` before anything else is reachable.
    ///
    /// Subscribes to session changes for the lifetime of the view. A session
    /// the provider already holds is adopted immediately.
    pub fn with_auth(mut self, provider: Arc<dyn SessionProvider>, provider_name: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        provider.on_session_change(Box::new(move |event| {
            let _ = tx.send(event.clone());
        }));

        self.state.auth_required = true;
        if let Some(session) = provider.current_session() {
            tracing::info!(user = %session.user_id, "Existing session adopted");
            self.requests.store().authorize(Some(&session));
            self.state.auth.complete(session);
        }

        self.gate = Some(AuthGate {
            provider_name: provider_name.to_string(),
            provider,
            events: rx,
        });
        self
    }

    /// Name of the configured OAuth provider, when gated.
    pub fn provider_name(&self) -> Option<&str> {
        self.gate.as_ref().map(|g| g.provider_name.as_str())
    }

    /// True while any store request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.requests.in_flight() > 0
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Initial activation: fetch the emoji set and the entry list.
    ///
    /// Does nothing while the session gate is closed; it runs again
    /// automatically once a session arrives.
    pub fn activate(&mut self) {
        if !self.state.is_unlocked() {
            tracing::debug!("Activation deferred until sign-in");
            return;
        }
        self.requests.spawn_load_emojis();
        // Gate is open, so load cannot be refused here.
        let _ = self.load();
    }

    /// Fetch every entry, newest first, replacing the list when it arrives.
    pub fn load(&mut self) -> Result<(), StoreError> {
        if !self.state.is_unlocked() {
            return Err(StoreError::NotAuthenticated);
        }
        let mut query = Query::new()
            .columns(ENTRY_SELECT_COLUMNS)
            .order_desc(CREATED_AT_COLUMN);
        if let Some(owner) = self.state.owner_id() {
            query = query.eq(USER_ID_COLUMN, owner);
        }
        self.state.status_message = "Loading entries...".to_string();
        self.requests.spawn_load_entries(query);
        Ok(())
    }

    /// Validate the form and send one insert.
    ///
    /// On validation failure the alert is raised and nothing is sent.
    pub fn submit(&mut self) -> Result<(), MoodLogError> {
        if !self.state.is_unlocked() {
            return Err(StoreError::NotAuthenticated.into());
        }
        let entry = match self.state.form.validate(self.state.owner_id()) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(reason = %e, "Submission blocked by validation");
                self.state.alert = Some(e.to_string());
                return Err(e.into());
            }
        };

        tracing::info!(mood = %entry.mood, emoji_id = entry.emoji_id, "Submitting entry");
        self.state.status_message = "Saving entry...".to_string();
        self.requests.spawn_insert(entry);
        Ok(())
    }

    /// Flip between dark and light visuals. No I/O.
    pub fn toggle_theme(&mut self) {
        self.state.dark_mode = !self.state.dark_mode;
    }

    /// Clear the error banner.
    pub fn dismiss_error(&mut self) {
        self.state.error = None;
    }

    /// Start the OAuth flow. Returns the URL to open in the browser.
    pub fn begin_sign_in(&mut self) -> Result<String, AuthError> {
        let Some(gate) = self.gate.as_ref() else {
            return Err(AuthError::Callback {
                reason: "sign-in is not configured".to_string(),
            });
        };
        if !self.state.auth.begin(&gate.provider_name) {
            return Err(AuthError::Callback {
                reason: "a sign-in is already in progress".to_string(),
            });
        }

        match gate.provider.sign_in_with_provider(&gate.provider_name) {
            Ok(url) => {
                tracing::info!(provider = %gate.provider_name, "Sign-in started");
                Ok(url)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sign-in could not start");
                self.state.auth.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Abandon a pending sign-in and return to the login screen.
    ///
    /// The provider is told to stop listening for the callback. Returns
    /// false when no sign-in was pending.
    pub fn cancel_sign_in(&mut self) -> bool {
        let Some(gate) = self.gate.as_ref() else {
            return false;
        };
        if !self.state.auth.cancel() {
            return false;
        }
        gate.provider.cancel_sign_in();
        tracing::info!(provider = %gate.provider_name, "Sign-in cancelled");
        true
    }

    // =========================================================================
    // Completion handling
    // =========================================================================

    /// Apply every finished request and session event. Called once per frame.
    pub fn poll(&mut self) {
        let events: Vec<SessionEvent> = match &self.gate {
            Some(gate) => gate.events.try_iter().collect(),
            None => Vec::new(),
        };
        for event in events {
            self.apply_session_event(event);
        }

        for msg in self.requests.poll() {
            self.apply(msg);
        }
    }

    /// Block until no request is outstanding or `timeout` passes, applying
    /// results as they arrive. Returns true when the view went idle.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.is_busy() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if let Some(msg) = self.requests.wait(remaining) {
                self.apply(msg);
            }
        }
        true
    }

    /// Wait up to `timeout` for the next session event and apply it.
    pub fn await_session_event(&mut self, timeout: Duration) -> bool {
        let event = match &self.gate {
            Some(gate) => gate.events.recv_timeout(timeout).ok(),
            None => None,
        };
        match event {
            Some(event) => {
                self.apply_session_event(event);
                true
            }
            None => false,
        }
    }

    fn apply_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SignedIn(session) => {
                let first = !self.state.auth.is_authenticated();
                tracing::info!(user = %session.user_id, "Signed in");
                self.requests.store().authorize(Some(&session));
                self.state.auth.complete(session);
                if first {
                    self.activate();
                }
            }
            SessionEvent::Failed(reason) => {
                tracing::warn!(reason = %reason, "Sign-in failed");
                self.state.auth.fail(reason);
            }
        }
    }

    fn apply(&mut self, msg: StoreProgress) {
        match msg {
            StoreProgress::EntriesLoaded(Ok(decoded)) => {
                let count = decoded.rows.len();
                tracing::debug!(count, skipped = decoded.skipped, "Entries loaded");
                self.state.status_message = if decoded.skipped > 0 {
                    format!("{count} entries ({} unreadable rows skipped).", decoded.skipped)
                } else {
                    format!("{count} entries.")
                };
                self.state.entries = decoded.rows;
                self.state.loaded_once = true;
            }
            StoreProgress::EntriesLoaded(Err(e)) => {
                tracing::warn!(error = %e, "Loading entries failed");
                self.state.status_message = "Could not refresh entries.".to_string();
                self.state.error = Some(e.to_string());
            }
            StoreProgress::EmojisLoaded(Ok(emojis)) if !emojis.is_empty() => {
                tracing::debug!(count = emojis.len(), "Emoji set loaded");
                self.state.emojis = emojis;
            }
            StoreProgress::EmojisLoaded(Ok(_)) => {
                tracing::info!("Emoji table is empty; using built-in set");
                self.state.emojis = builtin_emojis();
            }
            StoreProgress::EmojisLoaded(Err(e)) => {
                tracing::warn!(error = %e, "Loading emojis failed; using built-in set");
            }
            StoreProgress::EntryInserted(Ok(())) => {
                tracing::info!("Entry saved");
                self.state.form.reset();
                self.state.status_message = "Memory captured.".to_string();
                if let Err(e) = self.load() {
                    self.state.error = Some(e.to_string());
                }
            }
            StoreProgress::EntryInserted(Err(e)) => {
                tracing::warn!(error = %e, "Saving entry failed");
                self.state.status_message = "Entry not saved.".to_string();
                self.state.error = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::MemoryStore;
    use crate::core::model::Mood;
    use crate::util::constants::{EMOJIS_TABLE, ENTRIES_TABLE};

    const WAIT: Duration = Duration::from_secs(5);

    fn view(store: &Arc<MemoryStore>) -> EntryLogView {
        EntryLogView::new(store.clone(), AppState::new(false, false, false))
    }

    #[test]
    fn test_activate_loads_entries_and_emojis() {
        let store = Arc::new(MemoryStore::new());
        let mut v = view(&store);
        v.activate();
        assert!(v.settle(WAIT));
        assert_eq!(store.select_count(ENTRIES_TABLE), 1);
        assert_eq!(store.select_count(EMOJIS_TABLE), 1);
        assert!(v.state.loaded_once);
        // Empty emoji table falls back to the built-in picker.
        assert_eq!(v.state.emojis, builtin_emojis());
    }

    #[test]
    fn test_entry_query_is_newest_first_with_embedded_symbol() {
        let store = Arc::new(MemoryStore::new());
        let mut v = view(&store);
        v.load().unwrap();
        assert!(v.settle(WAIT));
        let query = store.last_query(ENTRIES_TABLE).unwrap();
        assert_eq!(query.columns.as_deref(), Some(ENTRY_SELECT_COLUMNS));
        let order = query.order.unwrap();
        assert_eq!(order.column, CREATED_AT_COLUMN);
        assert!(!order.ascending);
        assert!(query.filters.is_empty());
    }

    #[test]
    fn test_toggle_theme_twice_restores_and_issues_no_io() {
        let store = Arc::new(MemoryStore::new());
        let mut v = view(&store);
        let original = v.state.dark_mode;
        v.toggle_theme();
        assert_ne!(v.state.dark_mode, original);
        v.toggle_theme();
        assert_eq!(v.state.dark_mode, original);
        assert!(!v.is_busy());
        assert_eq!(store.select_count(ENTRIES_TABLE), 0);
        assert_eq!(store.insert_count(ENTRIES_TABLE), 0);
    }

    #[test]
    fn test_failed_insert_keeps_form_and_skips_reload() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_inserts(true);
        let mut v = view(&store);
        v.state.form.mood = Some(Mood::Fine);
        v.state.form.description = "Keep me".to_string();
        v.state.form.emoji_id = Some(1);
        let before = v.state.form.clone();

        v.submit().unwrap();
        assert!(v.settle(WAIT));

        assert_eq!(v.state.form, before);
        assert!(v.state.error.is_some());
        assert_eq!(store.select_count(ENTRIES_TABLE), 0);

        v.dismiss_error();
        assert!(v.state.error.is_none());
    }

    #[test]
    fn test_failed_load_keeps_previous_list() {
        let store = Arc::new(MemoryStore::new());
        let mut v = view(&store);
        v.state.form.mood = Some(Mood::Inspired);
        v.state.form.description = "First".to_string();
        v.state.form.emoji_id = Some(7);
        v.submit().unwrap();
        assert!(v.settle(WAIT));
        assert_eq!(v.state.entries.len(), 1);

        store.set_fail_selects(true);
        v.load().unwrap();
        assert!(v.settle(WAIT));
        assert_eq!(v.state.entries.len(), 1);
        assert!(v.state.error.as_deref().unwrap_or("").contains("503"));
    }

    #[test]
    fn test_begin_sign_in_without_gate_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        let mut v = view(&store);
        assert!(v.begin_sign_in().is_err());
        assert!(!v.cancel_sign_in());
        assert_eq!(v.provider_name(), None);
    }

    #[test]
    fn test_unreadable_rows_are_reported_in_status() {
        let store = Arc::new(MemoryStore::new());
        store.seed(
            ENTRIES_TABLE,
            vec![
                serde_json::json!({ "id": 1, "mood": "Fine", "description": "good",
                                    "created_at": "2025-03-01T09:00:00Z" }),
                serde_json::json!({ "id": 2, "created_at": "someday" }),
            ],
        );
        let mut v = view(&store);
        v.load().unwrap();
        assert!(v.settle(WAIT));
        assert!(v.state.loaded_once);
        assert_eq!(v.state.entries.len(), 1);
        assert!(v.state.status_message.contains("1 unreadable"));
    }
}
