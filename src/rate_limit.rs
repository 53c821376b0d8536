//! In-memory throttling of failed PIN attempts.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<Uuid, VecDeque<Instant>>`, one
//! deque of failure timestamps per user. Once a user has `max_failures`
//! failures inside the window, further attempts are refused until the oldest
//! failure ages out. A correct PIN clears the user's history. Every recorded
//! failure also sweeps out users whose failures have all aged out.
//!
//! TRADE-OFFS
//! ==========
//! State is per process and lost on restart. That is acceptable for a demo
//! PIN gate; it only slows guessing, it does not replace real card auth.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

#[derive(Clone, Copy)]
struct AttemptConfig {
    max_failures: usize,
    window: Duration,
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("too many failed attempts (max {limit} per {window_secs}s), retry in {retry_after_secs}s")]
    TooManyFailures { limit: usize, window_secs: u64, retry_after_secs: u64 },
}

// =============================================================================
// ATTEMPT LIMITER
// =============================================================================

#[derive(Clone)]
pub struct AttemptLimiter {
    inner: Arc<Mutex<HashMap<Uuid, VecDeque<Instant>>>>,
    config: AttemptConfig,
}

impl AttemptLimiter {
    #[must_use]
    pub fn new(max_failures: usize, window: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            config: AttemptConfig { max_failures: max_failures.max(1), window },
        }
    }

    /// Run `attempt` unless the user is locked out, counting a failure when it
    /// returns `false`. The lock is held throughout, so concurrent attempts
    /// cannot overshoot the limit.
    pub fn attempt(&self, user_id: Uuid, attempt: impl FnOnce() -> bool) -> Result<bool, AttemptError> {
        self.attempt_at(user_id, Instant::now(), attempt)
    }

    fn attempt_at(&self, user_id: Uuid, now: Instant, attempt: impl FnOnce() -> bool) -> Result<bool, AttemptError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.lockout(&mut inner, user_id, now)?;
        if attempt() {
            inner.remove(&user_id);
            return Ok(true);
        }
        let window = self.config.window;
        inner.retain(|_, failures| {
            prune_window(failures, now, window);
            !failures.is_empty()
        });
        inner.entry(user_id).or_default().push_back(now);
        Ok(false)
    }

    fn lockout(
        &self,
        inner: &mut HashMap<Uuid, VecDeque<Instant>>,
        user_id: Uuid,
        now: Instant,
    ) -> Result<(), AttemptError> {
        let cfg = self.config;
        let Some(failures) = inner.get_mut(&user_id) else {
            return Ok(());
        };
        prune_window(failures, now, cfg.window);
        if failures.is_empty() {
            inner.remove(&user_id);
            return Ok(());
        }
        if failures.len() < cfg.max_failures {
            return Ok(());
        }
        let retry_after = failures
            .front()
            .map_or(cfg.window, |&oldest| cfg.window.saturating_sub(now.duration_since(oldest)));
        Err(AttemptError::TooManyFailures {
            limit: cfg.max_failures,
            window_secs: cfg.window.as_secs(),
            retry_after_secs: retry_after.as_secs().max(1),
        })
    }

    /// Failures currently counted against the user.
    #[must_use]
    pub fn failures(&self, user_id: Uuid) -> usize {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let window = self.config.window;
        let Some(failures) = inner.get_mut(&user_id) else {
            return 0;
        };
        prune_window(failures, Instant::now(), window);
        let count = failures.len();
        if count == 0 {
            inner.remove(&user_id);
        }
        count
    }

    #[cfg(test)]
    fn tracked_users(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
