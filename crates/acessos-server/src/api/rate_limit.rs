//! Per-client request rate limiting
//!
//! Fixed one-minute windows keyed by client address. The address is the first
//! `X-Forwarded-For` hop when present, otherwise the peer address.

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

use super::error::ApiError;
use super::AppState;

const WINDOW: Duration = Duration::from_secs(60);

/// Paths that are never limited
const EXEMPT_PREFIXES: &[&str] = &["/api/auth", "/health"];

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter per client
#[derive(Debug)]
pub struct RateLimiter {
    per_minute: u32,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    /// `per_minute == 0` disables limiting
    pub fn new(per_minute: u32) -> Self {
        Self {
            per_minute,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count a request from `client` and report whether it is allowed
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> bool {
        if self.per_minute == 0 {
            return true;
        }

        // A poisoned map only holds counters
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        windows.retain(|_, w| now.duration_since(w.started) < WINDOW);

        let window = windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if window.count >= self.per_minute {
            return false;
        }
        window.count += 1;
        true
    }
}

/// Client address used as the rate-limit key
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware rejecting requests over the limit with 429
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let client = client_key(request.headers(), peer);

    if !state.limiter.check(&client) {
        warn!("Rate limit exceeded for {} on {}", client, path);
        return ApiError::too_many_requests().into_response();
    }

    next.run(request).await
}
