//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool, the loaded configuration and the in-memory
//! PIN attempt limiter. Route and portal data that never changes lives in
//! `services::catalog` as statics and is not part of the state.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::Config;
use crate::rate_limit::AttemptLimiter;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Failed PIN attempts per user.
    pub pin_attempts: AttemptLimiter,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: Config) -> Self {
        let pin_attempts = AttemptLimiter::new(
            config.pin_max_failures,
            Duration::from_secs(config.pin_failure_window_secs),
        );
        Self { pool, config: Arc::new(config), pin_attempts }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    /// Create a test `AppState` with a dummy `PgPool` (`connect_lazy`, no live DB).
    #[must_use]
    pub fn test_app_state() -> AppState {
        test_app_state_with_config(Config::for_tests())
    }

    /// Same as [`test_app_state`] with a caller-tuned configuration.
    #[must_use]
    pub fn test_app_state_with_config(config: Config) -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("connect_lazy should not fail");
        AppState::new(pool, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn limiter_follows_config() {
        let mut config = Config::for_tests();
        config.pin_max_failures = 2;
        let state = test_helpers::test_app_state_with_config(config);
        let user = Uuid::new_v4();

        assert!(matches!(state.pin_attempts.attempt(user, || false), Ok(false)));
        assert!(matches!(state.pin_attempts.attempt(user, || false), Ok(false)));
        assert!(state.pin_attempts.attempt(user, || true).is_err());
    }

    #[tokio::test]
    async fn clones_share_limiter_and_config() {
        let state = test_helpers::test_app_state();
        let clone = state.clone();
        let user = Uuid::new_v4();
        let _ = clone.pin_attempts.attempt(user, || false);
        assert_eq!(state.pin_attempts.failures(user), 1);
        assert!(Arc::ptr_eq(&state.config, &clone.config));
    }
}
