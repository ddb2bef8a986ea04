//! Sliding-window rate limiting for provider requests

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const WINDOW: Duration = Duration::from_secs(60);
const TOKEN_POLL: Duration = Duration::from_millis(100);

/// Per-minute request and token budget for one provider
pub struct RateLimiter {
    requests_per_minute: u32,
    tokens_per_minute: u32,
    requests: Mutex<VecDeque<Instant>>,
    tokens: Mutex<VecDeque<(Instant, u32)>>,
}

fn prune<T>(window: &mut VecDeque<T>, now: Instant, at: impl Fn(&T) -> Instant) {
    while let Some(front) = window.front() {
        if now.duration_since(at(front)) > WINDOW {
            window.pop_front();
        } else {
            break;
        }
    }
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32, tokens_per_minute: u32) -> Self {
        Self {
            requests_per_minute: requests_per_minute.max(1),
            tokens_per_minute,
            requests: Mutex::new(VecDeque::new()),
            tokens: Mutex::new(VecDeque::new()),
        }
    }

    /// Wait until a request slot is free, then claim it
    pub async fn acquire(&self) {
        loop {
            match self.try_claim().await {
                None => return,
                Some(wait) => {
                    tracing::debug!("Rate limit reached, waiting {}ms", wait.as_millis());
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Claims a slot, or returns how long to wait for one
    async fn try_claim(&self) -> Option<Duration> {
        let mut requests = self.requests.lock().await;
        let now = Instant::now();
        prune(&mut requests, now, |t| *t);

        if requests.len() >= self.requests_per_minute as usize {
            let oldest = *requests.front()?;
            return Some(WINDOW.saturating_sub(now.duration_since(oldest)) + Duration::from_millis(10));
        }

        requests.push_back(now);
        None
    }

    /// Record tokens spent by a completed request
    pub async fn record_tokens(&self, tokens: u32) {
        let mut usage = self.tokens.lock().await;
        let now = Instant::now();
        prune(&mut usage, now, |(t, _)| *t);
        usage.push_back((now, tokens));
    }

    /// Tokens spent in the last minute
    pub async fn current_token_usage(&self) -> u32 {
        let mut usage = self.tokens.lock().await;
        prune(&mut usage, Instant::now(), |(t, _)| *t);
        usage.iter().fold(0u32, |acc, (_, t)| acc.saturating_add(*t))
    }

    pub async fn has_token_capacity(&self, needed: u32) -> bool {
        self.current_token_usage().await.saturating_add(needed) <= self.tokens_per_minute
    }

    /// Wait until `needed` tokens fit in the last minute's budget.
    ///
    /// A request larger than the whole budget only waits for an empty window.
    pub async fn wait_for_token_capacity(&self, needed: u32) {
        let needed = needed.min(self.tokens_per_minute);
        let mut logged = false;
        while !self.has_token_capacity(needed).await {
            if !logged {
                tracing::debug!("Token budget of {}/min reached, waiting", self.tokens_per_minute);
                logged = true;
            }
            tokio::time::sleep(TOKEN_POLL).await;
        }
    }
}
