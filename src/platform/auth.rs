// MoodLog - platform/auth.rs
//
// `SessionProvider` over the hosted auth API (GoTrue dialect), using the
// OAuth authorization-code flow with PKCE and a loopback redirect:
//
//   1. Bind 127.0.0.1:<callback_port>.
//   2. Hand the UI  {url}/auth/v1/authorize?provider=..&redirect_to=..&code_challenge=..
//      to open in the system browser.
//   3. The provider redirects the browser to  http://127.0.0.1:<port>/callback?code=..
//   4. Exchange the code at  {url}/auth/v1/token?grant_type=pkce.
//   5. Publish SignedIn / Failed to every subscriber.
//
// The challenge is S256: base64url(SHA-256(verifier)). The verifier itself
// only travels in the token request.
//
// The listener is a small axum server on a current-thread tokio runtime in
// its own thread. It stops on the first callback, on cancellation, or when
// the sign-in deadline passes; the port is free again once it stops.

use crate::core::session::{Session, SessionCallback, SessionEvent, SessionProvider};
use crate::util::constants::{
    AUTH_PATH, CALLBACK_PATH, CALLBACK_SHUTDOWN_GRACE_SECS, CODE_VERIFIER_BYTES,
    CONNECT_TIMEOUT_SECS, SIGN_IN_TIMEOUT_SECS,
};
use crate::util::error::AuthError;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;
use reqwest::{Client, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::net::TcpListener;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::oneshot;

// =============================================================================
// PKCE
// =============================================================================

/// Generate a fresh PKCE code verifier (43 base64url characters).
pub fn new_code_verifier() -> String {
    let bytes: [u8; CODE_VERIFIER_BYTES] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// S256 code challenge for `verifier`.
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Build the authorize URL the user opens in the browser.
pub fn authorize_url(
    base_url: &Url,
    provider: &str,
    redirect_to: &str,
    code_verifier: &str,
) -> Result<Url, AuthError> {
    let mut url = base_url
        .join(&format!("{AUTH_PATH}/authorize"))
        .map_err(|e| AuthError::Url {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
    url.query_pairs_mut()
        .append_pair("provider", provider)
        .append_pair("redirect_to", redirect_to)
        .append_pair("code_challenge", &code_challenge(code_verifier))
        .append_pair("code_challenge_method", "s256");
    Ok(url)
}

// =============================================================================
// Callback parameters
// =============================================================================

/// Query string of the redirect back to the loopback listener.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// The authorization code carried by a redirect, or why there is none.
///
/// A provider error wins over a code; the description is preferred over the
/// bare error name.
pub fn callback_outcome(params: &CallbackParams) -> Result<String, AuthError> {
    if let Some(reason) = params.error_description.as_ref().or(params.error.as_ref()) {
        return Err(AuthError::Denied {
            description: reason.clone(),
        });
    }
    match params.code.as_deref() {
        Some(code) if !code.is_empty() => Ok(code.to_string()),
        _ => Err(AuthError::Callback {
            reason: "callback carried neither a code nor an error".to_string(),
        }),
    }
}

// =============================================================================
// Token exchange
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user_id: token.user.id,
            email: token.user.email,
            expires_at: token
                .expires_in
                .map(|secs| Utc::now() + ChronoDuration::seconds(secs)),
        }
    }
}

/// Exchanges authorization codes for sessions.
///
/// Async because it runs inside the listener's runtime, where the blocking
/// client may not be used.
#[derive(Clone)]
struct TokenExchanger {
    client: Client,
    token_url: Url,
    anon_key: String,
}

impl TokenExchanger {
    async fn exchange(&self, code: &str, code_verifier: &str) -> Result<Session, AuthError> {
        let exchange_err = |e: reqwest::Error| AuthError::Exchange {
            reason: e.to_string(),
        };
        let body = serde_json::json!({
            "auth_code": code,
            "code_verifier": code_verifier,
        });
        let response = self
            .client
            .post(self.token_url.clone())
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(exchange_err)?;

        let status = response.status();
        let text = response.text().await.map_err(exchange_err)?;
        if !status.is_success() {
            return Err(AuthError::Exchange {
                reason: format!("HTTP {}: {}", status.as_u16(), text.trim()),
            });
        }

        let token: TokenResponse = serde_json::from_str(&text).map_err(|e| AuthError::Exchange {
            reason: format!("unexpected token response: {e}"),
        })?;
        Ok(token.into())
    }
}

// =============================================================================
// Loopback listener
// =============================================================================

type Outcome = Result<Session, AuthError>;

/// Per-attempt state shared with the callback handler.
struct CallbackState {
    exchanger: TokenExchanger,
    verifier: String,
    /// Taken by the first callback; later ones are told the attempt is over.
    outcome: Mutex<Option<oneshot::Sender<Outcome>>>,
}

fn page(status: StatusCode, message: &str) -> (StatusCode, Html<String>) {
    let body = format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>MoodLog</title></head>\
         <body style=\"font-family:sans-serif;text-align:center;margin-top:4em\">\
         <h2>{message}</h2><p>You can close this tab and return to MoodLog.</p></body></html>"
    );
    (status, Html(body))
}

async fn handle_callback(
    State(state): State<Arc<CallbackState>>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<String>) {
    let Some(sender) = lock(&state.outcome).take() else {
        return page(StatusCode::GONE, "This sign-in has already finished");
    };

    let result = match callback_outcome(&params) {
        Ok(code) => state.exchanger.exchange(&code, &state.verifier).await,
        Err(e) => Err(e),
    };
    let response = match &result {
        Ok(_) => page(StatusCode::OK, "Signed in to MoodLog"),
        Err(AuthError::Denied { .. }) => page(StatusCode::OK, "Sign-in was cancelled"),
        Err(AuthError::Callback { .. }) => {
            page(StatusCode::BAD_REQUEST, "Unexpected sign-in response")
        }
        Err(_) => page(StatusCode::OK, "Sign-in failed"),
    };
    if sender.send(result).is_err() {
        tracing::debug!("Callback arrived after the attempt ended");
    }
    response
}

/// Serve the loopback listener until the first callback, cancellation or
/// `deadline`. Returns the event to publish; cancellation publishes none.
async fn serve_callback(
    listener: TcpListener,
    state: Arc<CallbackState>,
    outcome: oneshot::Receiver<Outcome>,
    cancel: oneshot::Receiver<()>,
    deadline: Duration,
) -> Option<SessionEvent> {
    let listener = match tokio::net::TcpListener::from_std(listener) {
        Ok(listener) => listener,
        Err(e) => {
            let err = AuthError::Callback {
                reason: e.to_string(),
            };
            return Some(SessionEvent::Failed(err.to_string()));
        }
    };

    // Any other path (favicon requests and the like) gets the default 404.
    let app = Router::new()
        .route(CALLBACK_PATH, get(handle_callback))
        .with_state(state);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    let event = tokio::select! {
        result = outcome => Some(match result {
            Ok(Ok(session)) => {
                tracing::info!(user = %session.user_id, "OAuth callback completed");
                SessionEvent::SignedIn(session)
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "OAuth callback failed");
                SessionEvent::Failed(e.to_string())
            }
            Err(_) => SessionEvent::Failed("sign-in listener stopped unexpectedly".to_string()),
        }),
        _ = cancel => {
            tracing::debug!("OAuth listener cancelled");
            None
        }
        _ = tokio::time::sleep(deadline) => {
            let err = AuthError::TimedOut {
                secs: deadline.as_secs(),
            };
            tracing::warn!(error = %err, "OAuth callback never arrived");
            Some(SessionEvent::Failed(err.to_string()))
        }
    };

    let _ = stop_tx.send(());
    let grace = Duration::from_secs(CALLBACK_SHUTDOWN_GRACE_SECS);
    match tokio::time::timeout(grace, server).await {
        Ok(Ok(Ok(()))) => tracing::debug!("OAuth listener stopped"),
        Ok(Ok(Err(e))) => tracing::debug!(error = %e, "OAuth listener ended with an error"),
        Ok(Err(e)) => tracing::debug!(error = %e, "OAuth listener task failed"),
        Err(_) => tracing::debug!("OAuth listener shutdown timed out; dropping connections"),
    }
    event
}

// =============================================================================
// Provider
// =============================================================================

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct Shared {
    current: Mutex<Option<Session>>,
    subscribers: Mutex<Vec<SessionCallback>>,
}

impl Shared {
    fn publish(&self, event: SessionEvent) {
        if let SessionEvent::SignedIn(session) = &event {
            *lock(&self.current) = Some(session.clone());
        }
        for callback in lock(&self.subscribers).iter() {
            callback(&event);
        }
    }
}

/// The listener thread of the attempt in progress.
struct PendingSignIn {
    cancel: oneshot::Sender<()>,
    worker: JoinHandle<()>,
}

/// OAuth session provider for the hosted auth API.
pub struct OAuthSessionProvider {
    base_url: Url,
    callback_port: u16,
    timeout: Duration,
    exchanger: TokenExchanger,
    shared: Arc<Shared>,
    pending: Mutex<Option<PendingSignIn>>,
}

impl OAuthSessionProvider {
    /// `callback_port` 0 lets the OS pick a free port.
    pub fn new(url: &str, anon_key: &str, callback_port: u16) -> Result<Self, AuthError> {
        let url_err = |reason: String| AuthError::Url {
            url: url.to_string(),
            reason,
        };
        let base_url = crate::platform::rest::parse_base_url(url).map_err(|e| url_err(e.to_string()))?;
        let token_url = base_url
            .join(&format!("{AUTH_PATH}/token?grant_type=pkce"))
            .map_err(|e| url_err(e.to_string()))?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| url_err(e.to_string()))?;

        Ok(Self {
            base_url,
            callback_port,
            timeout: Duration::from_secs(SIGN_IN_TIMEOUT_SECS),
            exchanger: TokenExchanger {
                client,
                token_url,
                anon_key: anon_key.to_string(),
            },
            shared: Arc::new(Shared::default()),
            pending: Mutex::new(None),
        })
    }

    /// Override how long a sign-in waits for the browser.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Stop the pending listener, if any, and wait until its port is free.
    fn stop_pending(&self) {
        let Some(pending) = lock(&self.pending).take() else {
            return;
        };
        // Fails only when the attempt already finished on its own.
        let _ = pending.cancel.send(());
        if pending.worker.join().is_err() {
            tracing::warn!("OAuth listener thread panicked");
        }
    }
}

impl Drop for OAuthSessionProvider {
    fn drop(&mut self) {
        self.stop_pending();
    }
}

impl SessionProvider for OAuthSessionProvider {
    fn current_session(&self) -> Option<Session> {
        lock(&self.shared.current).clone()
    }

    fn on_session_change(&self, callback: SessionCallback) {
        lock(&self.shared.subscribers).push(callback);
    }

    fn sign_in_with_provider(&self, provider: &str) -> Result<String, AuthError> {
        // A fixed callback port can only serve one attempt at a time.
        self.stop_pending();

        let bind_err = |source| AuthError::Bind {
            port: self.callback_port,
            source,
        };
        let listener = TcpListener::bind(("127.0.0.1", self.callback_port)).map_err(bind_err)?;
        listener.set_nonblocking(true).map_err(bind_err)?;
        let port = listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or(self.callback_port);
        let redirect_to = format!("http://127.0.0.1:{port}{CALLBACK_PATH}");
        let verifier = new_code_verifier();
        let url = authorize_url(&self.base_url, provider, &redirect_to, &verifier)?;

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let state = Arc::new(CallbackState {
            exchanger: self.exchanger.clone(),
            verifier,
            outcome: Mutex::new(Some(outcome_tx)),
        });
        let shared = Arc::clone(&self.shared);
        let deadline = self.timeout;

        let worker = std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::error!(error = %e, "Cannot start the OAuth listener runtime");
                    shared.publish(SessionEvent::Failed(e.to_string()));
                    return;
                }
            };
            let event = runtime.block_on(serve_callback(
                listener, state, outcome_rx, cancel_rx, deadline,
            ));
            if let Some(event) = event {
                shared.publish(event);
            }
        });
        *lock(&self.pending) = Some(PendingSignIn {
            cancel: cancel_tx,
            worker,
        });

        tracing::debug!(port, provider, timeout_secs = deadline.as_secs(), "Waiting for OAuth redirect");
        Ok(url.to_string())
    }

    fn cancel_sign_in(&self) {
        self.stop_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_verifier_is_43_url_safe_chars_and_random() {
        let a = new_code_verifier();
        let b = new_code_verifier();
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(a, b);
    }

    #[test]
    fn test_code_challenge_matches_rfc7636_example() {
        assert_eq!(
            code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuIJiumG-cM"
        );
    }

    #[test]
    fn test_authorize_url_carries_s256_challenge_not_verifier() {
        let base = Url::parse("https://abc.supabase.co/").unwrap();
        let url = authorize_url(&base, "github", "http://127.0.0.1:5/callback", "v3r1f13r").unwrap();
        assert_eq!(url.path(), "/auth/v1/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("provider".to_string(), "github".to_string())));
        assert!(pairs.contains(&(
            "redirect_to".to_string(),
            "http://127.0.0.1:5/callback".to_string()
        )));
        assert!(pairs.contains(&("code_challenge".to_string(), code_challenge("v3r1f13r"))));
        assert!(pairs.contains(&("code_challenge_method".to_string(), "s256".to_string())));
        assert!(!url.as_str().contains("v3r1f13r"));
    }

    #[test]
    fn test_callback_with_code() {
        let params = CallbackParams {
            code: Some("abc123".to_string()),
            ..CallbackParams::default()
        };
        assert_eq!(callback_outcome(&params).unwrap(), "abc123");
    }

    #[test]
    fn test_callback_with_error_prefers_description() {
        let params = CallbackParams {
            code: Some("ignored".to_string()),
            error: Some("access_denied".to_string()),
            error_description: Some("User denied access".to_string()),
        };
        match callback_outcome(&params) {
            Err(AuthError::Denied { description }) => assert_eq!(description, "User denied access"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_callback_without_code_is_an_error() {
        assert!(matches!(
            callback_outcome(&CallbackParams::default()),
            Err(AuthError::Callback { .. })
        ));
        let empty = CallbackParams {
            code: Some(String::new()),
            ..CallbackParams::default()
        };
        assert!(callback_outcome(&empty).is_err());
    }

    #[test]
    fn test_bind_conflict_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();
        let provider = OAuthSessionProvider::new("http://127.0.0.1:9", "k", port).unwrap();
        assert!(matches!(
            provider.sign_in_with_provider("github"),
            Err(AuthError::Bind { .. })
        ));
    }

    #[test]
    fn test_cancel_releases_the_callback_port() {
        let port = {
            let free = TcpListener::bind("127.0.0.1:0").unwrap();
            free.local_addr().unwrap().port()
        };
        let provider = OAuthSessionProvider::new("http://127.0.0.1:9", "k", port).unwrap();
        provider.sign_in_with_provider("github").unwrap();
        assert!(TcpListener::bind(("127.0.0.1", port)).is_err());

        provider.cancel_sign_in();
        assert!(TcpListener::bind(("127.0.0.1", port)).is_ok());
    }
}
