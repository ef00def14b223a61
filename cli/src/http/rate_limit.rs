//! Per-client fixed-window request limiter

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Entries are pruned once the table grows past this many clients.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    clients: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Records one request from `client`; false once the client is over its quota.
    pub fn check(&self, client: IpAddr) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> bool {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        if clients.len() > PRUNE_THRESHOLD {
            let window = self.window;
            clients.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = clients.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const A: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const B: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    #[test]
    fn allows_up_to_quota_per_client() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 2);
        let now = Instant::now();
        assert!(limiter.check_at(A, now));
        assert!(limiter.check_at(A, now));
        assert!(!limiter.check_at(A, now));
        assert!(limiter.check_at(B, now));
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let now = Instant::now();
        assert!(limiter.check_at(A, now));
        assert!(!limiter.check_at(A, now + Duration::from_secs(59)));
        assert!(limiter.check_at(A, now + Duration::from_secs(60)));
    }

    #[test]
    fn zero_quota_rejects_everything() {
        let limiter = RateLimiter::new(Duration::from_secs(1), 0);
        assert!(!limiter.check(A));
    }
}
