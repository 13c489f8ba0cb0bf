//! Sliding-window limiter for login attempts, keyed by client address.
//! State is per process; a restart forgets every window.
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Attempt times for one client, oldest first.
#[derive(Default)]
struct Window(VecDeque<Instant>);

impl Window {
    /// Drops attempts that fell out of the window ending at `now`.
    fn expire(&mut self, now: Instant, span: Duration) {
        while self
            .0
            .front()
            .is_some_and(|&at| now.saturating_duration_since(at) >= span)
        {
            self.0.pop_front();
        }
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    clients: Arc<Mutex<HashMap<String, Window>>>,
    max_attempts: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
            max_attempts,
            window,
        }
    }

    pub fn per_minute(max_attempts: usize) -> Self {
        Self::new(max_attempts, Duration::from_secs(60))
    }

    /// Records an attempt for `client` and reports whether it is allowed.
    /// Rejected attempts are not recorded, so a throttled client regains
    /// access once its oldest accepted attempt leaves the window.
    pub async fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now()).await
    }

    async fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut clients = self.clients.lock().await;
        let window = clients.entry(client.to_string()).or_default();
        window.expire(now, self.window);

        let allowed = window.0.len() < self.max_attempts;
        if allowed {
            window.0.push_back(now);
        }
        allowed
    }

    /// Drops clients with no attempt left inside the window. Returns how
    /// many clients are still tracked.
    pub async fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now()).await
    }

    async fn cleanup_at(&self, now: Instant) -> usize {
        let mut clients = self.clients.lock().await;
        let before = clients.len();
        clients.retain(|_, window| {
            window.expire(now, self.window);
            !window.is_empty()
        });

        tracing::debug!(
            "Login limiter cleanup: dropped {}, {} still tracked",
            before - clients.len(),
            clients.len()
        );
        clients.len()
    }
}
