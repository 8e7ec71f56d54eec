// MoodLog - tests/e2e_backend.rs
//
// End-to-end tests for the HTTP clients: the REST record store and the
// OAuth session provider, each talking to a real loopback HTTP server.
// No mocking crates; the fake backend is a plain axum server.

mod common;

use common::FakeBackend;
use moodlog::app::state::AppState;
use moodlog::app::view::EntryLogView;
use moodlog::core::model::Mood;
use moodlog::core::session::{AuthState, SessionEvent, SessionProvider};
use moodlog::core::store::{Query, RecordStore};
use moodlog::platform::auth::{code_challenge, OAuthSessionProvider};
use moodlog::platform::rest::RestRecordStore;
use moodlog::util::error::StoreError;
use reqwest::Url;
use std::sync::{mpsc, Arc};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);
const ANON_KEY: &str = "anon-test-key";

fn decoded(target: &str) -> Url {
    Url::parse("http://localhost").unwrap().join(target).unwrap()
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

// =============================================================================
// REST record store
// =============================================================================

#[test]
fn e2e_select_sends_columns_order_filters_and_keys() {
    let backend = FakeBackend::start(vec![(
        200,
        r#"[{"id":1,"mood":"Fine","description":"hi","emoji_id":1,
            "emojis":{"symbol":"x"},"created_at":"2025-01-01T00:00:00Z"}]"#
            .to_string(),
    )]);
    let store = RestRecordStore::new(&backend.url, ANON_KEY).unwrap();

    let rows = store
        .select(
            "journal_entries",
            &Query::new()
                .columns("*,emojis(symbol)")
                .eq("user_id", "u-1")
                .order_desc("created_at"),
        )
        .unwrap();
    assert_eq!(rows.len(), 1);

    let requests = backend.recorded();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "GET");
    let url = decoded(&request.target);
    assert_eq!(url.path(), "/rest/v1/journal_entries");
    assert_eq!(query_value(&url, "select").as_deref(), Some("*,emojis(symbol)"));
    assert_eq!(query_value(&url, "user_id").as_deref(), Some("eq.u-1"));
    assert_eq!(query_value(&url, "order").as_deref(), Some("created_at.desc"));
    assert_eq!(request.header("apikey"), Some(ANON_KEY));
    assert_eq!(
        request.header("authorization"),
        Some(format!("Bearer {ANON_KEY}").as_str())
    );
}

#[test]
fn e2e_insert_posts_single_element_array_with_session_token() {
    let backend = FakeBackend::start(vec![(201, String::new())]);
    let store = RestRecordStore::new(&backend.url, ANON_KEY).unwrap();
    store.authorize(Some(&common::session("u-9")));

    store
        .insert(
            "journal_entries",
            &serde_json::json!({ "mood": "Fine", "description": "d", "emoji_id": 2 }),
        )
        .unwrap();

    let request = &backend.recorded()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(decoded(&request.target).path(), "/rest/v1/journal_entries");
    assert_eq!(request.header("prefer"), Some("return=minimal"));
    assert_eq!(request.header("authorization"), Some("Bearer token-u-9"));

    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    let array = body.as_array().unwrap();
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["mood"], "Fine");
}

#[test]
fn e2e_non_success_status_becomes_store_error() {
    let backend = FakeBackend::start(vec![(
        401,
        r#"{"message":"JWT expired"}"#.to_string(),
    )]);
    let store = RestRecordStore::new(&backend.url, ANON_KEY).unwrap();

    match store.select("journal_entries", &Query::new()) {
        Err(StoreError::Status { status, body, .. }) => {
            assert_eq!(status, 401);
            assert!(body.contains("JWT expired"));
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[test]
fn e2e_view_round_trip_over_http() {
    // activation reads (2), insert, reload
    let backend = FakeBackend::start(vec![
        (200, r#"[{"id":3,"symbol":"🔥"}]"#.to_string()),
        (200, "[]".to_string()),
        (201, String::new()),
        (
            200,
            r#"[{"id":10,"mood":"Productive","description":"Shipped the feature",
                "emoji_id":3,"emojis":{"symbol":"🔥"},
                "created_at":"2025-03-01T12:00:00Z"}]"#
                .to_string(),
        ),
    ]);
    let store = Arc::new(RestRecordStore::new(&backend.url, ANON_KEY).unwrap());
    let mut view = EntryLogView::new(store, AppState::new(false, false, false));

    // The two activation reads run concurrently; only their count is fixed.
    view.activate();
    assert!(view.settle(WAIT));
    let paths: Vec<String> = backend
        .recorded()
        .iter()
        .map(|r| decoded(&r.target).path().to_string())
        .collect();
    assert_eq!(paths.len(), 2);
    assert!(paths.contains(&"/rest/v1/emojis".to_string()));

    view.state.form.mood = Some(Mood::Productive);
    view.state.form.description = "Shipped the feature".to_string();
    view.state.form.emoji_id = Some(3);
    view.submit().unwrap();
    assert!(view.settle(WAIT));

    let requests = backend.recorded();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[2].method, "POST");
    assert_eq!(requests[3].method, "GET");
    assert_eq!(view.state.entries.len(), 1);
    assert_eq!(view.state.entries[0].symbol(), Some("\u{1f525}"));
}

// =============================================================================
// OAuth session provider
// =============================================================================

/// Act as the browser: request `path` on the loopback listener and return
/// the status code.
fn browser_get(port: u16, path: &str) -> u16 {
    reqwest::blocking::get(format!("http://127.0.0.1:{port}{path}"))
        .unwrap()
        .status()
        .as_u16()
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn start_sign_in(provider: &OAuthSessionProvider) -> (Url, u16, mpsc::Receiver<SessionEvent>) {
    let (tx, rx) = mpsc::channel();
    provider.on_session_change(Box::new(move |event| {
        let _ = tx.send(event.clone());
    }));
    let authorize = Url::parse(&provider.sign_in_with_provider("github").unwrap()).unwrap();
    let redirect = Url::parse(&query_value(&authorize, "redirect_to").unwrap()).unwrap();
    let port = redirect.port().unwrap();
    (authorize, port, rx)
}

#[test]
fn e2e_oauth_callback_exchanges_code_for_session() {
    let backend = FakeBackend::start(vec![(
        200,
        r#"{"access_token":"at-1","refresh_token":"rt-1","expires_in":3600,
            "user":{"id":"user-42","email":"me@example.com"}}"#
            .to_string(),
    )]);
    let provider = OAuthSessionProvider::new(&backend.url, ANON_KEY, 0).unwrap();
    let (authorize, port, events) = start_sign_in(&provider);

    assert_eq!(authorize.path(), "/auth/v1/authorize");
    assert_eq!(query_value(&authorize, "provider").as_deref(), Some("github"));
    assert_eq!(
        query_value(&authorize, "code_challenge_method").as_deref(),
        Some("s256")
    );
    let challenge = query_value(&authorize, "code_challenge").unwrap();

    // Browsers often ask for the favicon first; it must not end the flow.
    assert_eq!(browser_get(port, "/favicon.ico"), 404);
    assert_eq!(browser_get(port, "/callback?code=abc123"), 200);

    match events.recv_timeout(WAIT).unwrap() {
        SessionEvent::SignedIn(session) => {
            assert_eq!(session.user_id, "user-42");
            assert_eq!(session.access_token, "at-1");
            assert_eq!(session.email.as_deref(), Some("me@example.com"));
            assert!(session.expires_at.is_some());
        }
        other => panic!("expected sign-in, got {other:?}"),
    }
    assert_eq!(
        provider.current_session().map(|s| s.user_id),
        Some("user-42".to_string())
    );

    let exchange = &backend.recorded()[0];
    assert_eq!(exchange.method, "POST");
    let url = decoded(&exchange.target);
    assert_eq!(url.path(), "/auth/v1/token");
    assert_eq!(query_value(&url, "grant_type").as_deref(), Some("pkce"));
    assert_eq!(exchange.header("apikey"), Some(ANON_KEY));
    let body: serde_json::Value = serde_json::from_str(&exchange.body).unwrap();
    assert_eq!(body["auth_code"], "abc123");
    let verifier = body["code_verifier"].as_str().unwrap();
    assert_ne!(verifier, challenge);
    assert_eq!(code_challenge(verifier), challenge);
}

#[test]
fn e2e_oauth_denied_callback_publishes_failure() {
    let backend = FakeBackend::start(Vec::new());
    let provider = OAuthSessionProvider::new(&backend.url, ANON_KEY, 0).unwrap();
    let (_, port, events) = start_sign_in(&provider);

    browser_get(
        port,
        "/callback?error=access_denied&error_description=User+cancelled",
    );

    match events.recv_timeout(WAIT).unwrap() {
        SessionEvent::Failed(reason) => assert!(reason.contains("User cancelled")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(provider.current_session().is_none());
    assert!(backend.recorded().is_empty());
}

#[test]
fn e2e_oauth_rejected_exchange_publishes_failure() {
    let backend = FakeBackend::start(vec![(
        400,
        r#"{"error":"invalid_grant"}"#.to_string(),
    )]);
    let provider = OAuthSessionProvider::new(&backend.url, ANON_KEY, 0).unwrap();
    let (_, port, events) = start_sign_in(&provider);

    browser_get(port, "/callback?code=stale");

    match events.recv_timeout(WAIT).unwrap() {
        SessionEvent::Failed(reason) => assert!(reason.contains("invalid_grant")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn e2e_oauth_cancelled_sign_in_frees_the_port_for_a_retry() {
    let backend = FakeBackend::start(vec![(
        200,
        r#"{"access_token":"at-2","user":{"id":"user-7"}}"#.to_string(),
    )]);
    let port = free_port();
    let provider = Arc::new(OAuthSessionProvider::new(&backend.url, ANON_KEY, port).unwrap());
    let mut view = EntryLogView::new(
        Arc::new(RestRecordStore::new(&backend.url, ANON_KEY).unwrap()),
        AppState::new(false, true, false),
    )
    .with_auth(provider.clone(), "github");

    // The user closes the browser tab: no redirect ever comes.
    view.begin_sign_in().unwrap();
    assert!(!view.await_session_event(Duration::from_millis(100)));

    assert!(view.cancel_sign_in());
    assert!(!view.state.auth.is_authenticating());
    // Cancelling publishes nothing.
    assert!(!view.await_session_event(Duration::from_millis(100)));

    // Same fixed port binds again.
    view.begin_sign_in().unwrap();
    assert_eq!(browser_get(port, "/callback?code=retry"), 200);
    assert!(view.await_session_event(WAIT));
    assert!(view.state.auth.is_authenticated());
    assert_eq!(provider.current_session().map(|s| s.user_id), Some("user-7".to_string()));
}

#[test]
fn e2e_oauth_sign_in_times_out_and_releases_the_port() {
    let backend = FakeBackend::start(Vec::new());
    let port = free_port();
    let provider = Arc::new(
        OAuthSessionProvider::new(&backend.url, ANON_KEY, port)
            .unwrap()
            .with_timeout(Duration::from_millis(200)),
    );
    let mut view = EntryLogView::new(
        Arc::new(RestRecordStore::new(&backend.url, ANON_KEY).unwrap()),
        AppState::new(false, true, false),
    )
    .with_auth(provider, "github");

    view.begin_sign_in().unwrap();
    assert!(view.await_session_event(WAIT));
    match &view.state.auth {
        AuthState::Unauthenticated { last_error: Some(reason) } => {
            assert!(reason.contains("No response from the browser"));
        }
        other => panic!("expected a timed-out sign-in, got {other:?}"),
    }

    // A retry binds the same port again.
    assert!(view.begin_sign_in().is_ok());
    assert!(backend.recorded().is_empty());
}
