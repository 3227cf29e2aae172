//! # Per-Client Rate Limiting
//!
//! File: cli/src/commands/serve/rate_limit.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A fixed-window limiter keyed by client IP. Each client may make
//! `max_requests` requests per `window`; the window starts with the client's
//! first request and resets once it has elapsed. Requests over the limit are
//! answered with `429` and a `Retry-After` header before reaching any handler.
//!
//! The table lives behind a `std::sync::Mutex`. The lock is held only for a
//! map lookup and never across an `.await`. Expired entries are dropped
//! whenever the table grows past `PRUNE_THRESHOLD` clients.
//!
use super::api_error::ApiError;
use super::config::RateLimitSettings;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Table size at which expired windows are swept.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Fixed-window request counter per client IP.
#[derive(Debug)]
pub struct RateLimiter {
    settings: RateLimitSettings,
    clients: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        Self {
            settings,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Counts one request from `client` and decides whether to admit it.
    pub fn check(&self, client: IpAddr) -> Decision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> Decision {
        let window_len = self.settings.window;
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if clients.len() >= PRUNE_THRESHOLD {
            let before = clients.len();
            clients.retain(|_, w| now.duration_since(w.started) < window_len);
            debug!("Pruned {} expired rate-limit windows", before - clients.len());
        }

        let window = clients.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= window_len {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.settings.max_requests {
            let elapsed = now.duration_since(window.started);
            return Decision::Limited {
                retry_after: window_len.saturating_sub(elapsed),
            };
        }
        window.count += 1;
        Decision::Allowed {
            remaining: self.settings.max_requests - window.count,
        }
    }
}

/// Axum middleware: rejects the request with `429` once the caller's window
/// is used up.
///
/// The client is identified by the peer address from `ConnectInfo`; requests
/// without one (e.g. in-process test calls) share the unspecified address.
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limiter.check(client) {
        Decision::Allowed { remaining } => {
            trace!("Admitted request from {} ({} left in window)", client, remaining);
            Ok(next.run(request).await)
        }
        Decision::Limited { retry_after } => Err(ApiError::RateLimited { retry_after }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitSettings {
            max_requests,
            window: Duration::from_secs(window_secs),
        })
    }

    #[test]
    fn test_limits_after_max_requests() {
        let limiter = limiter(3, 60);
        let client: IpAddr = "10.0.0.1".parse().unwrap();
        let start = Instant::now();

        assert_eq!(limiter.check_at(client, start), Decision::Allowed { remaining: 2 });
        assert_eq!(limiter.check_at(client, start), Decision::Allowed { remaining: 1 });
        assert_eq!(limiter.check_at(client, start), Decision::Allowed { remaining: 0 });

        let later = start + Duration::from_secs(20);
        assert_eq!(
            limiter.check_at(client, later),
            Decision::Limited {
                retry_after: Duration::from_secs(40)
            }
        );
    }

    #[test]
    fn test_window_resets_after_elapsed() {
        let limiter = limiter(1, 60);
        let client: IpAddr = "10.0.0.1".parse().unwrap();
        let start = Instant::now();

        assert!(matches!(limiter.check_at(client, start), Decision::Allowed { .. }));
        assert!(matches!(
            limiter.check_at(client, start + Duration::from_secs(59)),
            Decision::Limited { .. }
        ));
        assert_eq!(
            limiter.check_at(client, start + Duration::from_secs(60)),
            Decision::Allowed { remaining: 0 }
        );
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(matches!(limiter.check_at(a, now), Decision::Allowed { .. }));
        assert!(matches!(limiter.check_at(a, now), Decision::Limited { .. }));
        assert!(matches!(limiter.check_at(b, now), Decision::Allowed { .. }));
    }

    #[test]
    fn test_expired_windows_are_pruned() {
        let limiter = limiter(1, 1);
        let start = Instant::now();
        for i in 0..PRUNE_THRESHOLD {
            let ip = IpAddr::V4(Ipv4Addr::from(i as u32));
            limiter.check_at(ip, start);
        }
        let later = start + Duration::from_secs(5);
        limiter.check_at("192.168.1.1".parse().unwrap(), later);
        assert_eq!(limiter.clients.lock().unwrap().len(), 1);
    }
}
