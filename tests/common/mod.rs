// MoodLog - tests/common/mod.rs
//
// Shared helpers for the end-to-end tests: a scripted session provider and
// a loopback axum backend that records every request and answers from a
// script.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use moodlog::core::session::{Session, SessionCallback, SessionEvent, SessionProvider};
use moodlog::util::error::AuthError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// =============================================================================
// Scripted session provider
// =============================================================================

/// Session provider driven by the test: `emit` plays the part of the
/// identity service finishing (or failing) a sign-in.
#[derive(Default)]
pub struct ScriptedProvider {
    current: Mutex<Option<Session>>,
    subscribers: Mutex<Vec<SessionCallback>>,
    pub sign_in_calls: Mutex<Vec<String>>,
    pub refuse_sign_in: Mutex<bool>,
    pub cancel_calls: Mutex<usize>,
}

impl ScriptedProvider {
    pub fn with_session(session: Session) -> Self {
        let provider = Self::default();
        *provider.current.lock().unwrap() = Some(session);
        provider
    }

    pub fn emit(&self, event: SessionEvent) {
        if let SessionEvent::SignedIn(session) = &event {
            *self.current.lock().unwrap() = Some(session.clone());
        }
        for callback in self.subscribers.lock().unwrap().iter() {
            callback(&event);
        }
    }
}

impl SessionProvider for ScriptedProvider {
    fn current_session(&self) -> Option<Session> {
        self.current.lock().unwrap().clone()
    }

    fn on_session_change(&self, callback: SessionCallback) {
        self.subscribers.lock().unwrap().push(callback);
    }

    fn sign_in_with_provider(&self, provider: &str) -> Result<String, AuthError> {
        self.sign_in_calls.lock().unwrap().push(provider.to_string());
        if *self.refuse_sign_in.lock().unwrap() {
            return Err(AuthError::Bind {
                port: 54321,
                source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
            });
        }
        Ok(format!("https://auth.example/authorize?provider={provider}"))
    }

    fn cancel_sign_in(&self) {
        *self.cancel_calls.lock().unwrap() += 1;
    }
}

pub fn session(user_id: &str) -> Session {
    Session {
        access_token: format!("token-{user_id}"),
        refresh_token: None,
        user_id: user_id.to_string(),
        email: Some(format!("{user_id}@example.com")),
        expires_at: None,
    }
}

// =============================================================================
// Fake HTTP backend
// =============================================================================

/// One request as the backend received it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path plus query string, as sent on the request line.
    pub target: String,
    /// Header names lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Script {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responses: Mutex<VecDeque<(u16, String)>>,
    last: Mutex<(u16, String)>,
}

async fn answer(
    State(script): State<Arc<Script>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    script.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        target: uri.to_string(),
        headers: headers
            .iter()
            .map(|(n, v)| (n.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
            .collect(),
        body,
    });

    let mut last = script.last.lock().unwrap();
    if let Some(next) = script.responses.lock().unwrap().pop_front() {
        *last = next;
    }
    let (status, body) = last.clone();
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

/// Loopback HTTP server answering each request with the next scripted
/// `(status, body)`; the last response repeats once the script runs out.
pub struct FakeBackend {
    pub url: String,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeBackend {
    pub fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let script = Arc::new(Script {
            requests: Arc::clone(&requests),
            responses: Mutex::new(responses.into()),
            last: Mutex::new((200, "[]".to_string())),
        });

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                let app = Router::new().fallback(answer).with_state(script);
                axum::serve(listener, app).await.unwrap();
            });
        });

        Self { url, requests }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}
