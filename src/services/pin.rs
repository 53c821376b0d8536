//! PIN and biometric gate in front of balance reveal and lock/unlock.
//!
//! Every card shares the configured demo PIN. Failed attempts are counted per
//! user in the in-memory [`AttemptLimiter`]; malformed input is rejected
//! before it reaches the limiter.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::locale::Locale;
use crate::rate_limit::{AttemptError, AttemptLimiter};

const PIN_LEN: usize = 4;
const DEMO_PIN: &str = "1234";

#[derive(Debug, thiserror::Error)]
pub enum PinError {
    #[error("PIN must be 4 digits")]
    Malformed,
    #[error("incorrect PIN")]
    Incorrect,
    #[error("too many failed attempts; retry in {retry_after_secs}s")]
    TooManyAttempts { retry_after_secs: u64 },
    #[error("biometric verification failed")]
    BiometricFailed,
}

impl ErrorCode for PinError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed => "E_INVALID_PIN",
            Self::Incorrect => "E_INCORRECT_PIN",
            Self::TooManyAttempts { .. } => "E_TOO_MANY_ATTEMPTS",
            Self::BiometricFailed => "E_BIOMETRIC_FAILED",
        }
    }
}

impl From<AttemptError> for PinError {
    fn from(err: AttemptError) -> Self {
        match err {
            AttemptError::TooManyFailures { retry_after_secs, .. } => Self::TooManyAttempts { retry_after_secs },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PinAction {
    ViewBalance,
    Lock,
    Unlock,
}

impl PinAction {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "view-balance" => Some(Self::ViewBalance),
            "lock" => Some(Self::Lock),
            "unlock" => Some(Self::Unlock),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self, locale: Locale) -> &'static str {
        match self {
            Self::ViewBalance => locale.pick("View Balance", "ಬ್ಯಾಲೆನ್ಸ್ ವೀಕ್ಷಿಸಿ"),
            Self::Lock => locale.pick("Lock Card", "ಕಾರ್ಡ್ ಲಾಕ್ ಮಾಡಿ"),
            Self::Unlock => locale.pick("Unlock Card", "ಕಾರ್ಡ್ ಅನ್‌ಲಾಕ್ ಮಾಡಿ"),
        }
    }
}

/// Text for the PIN dialog.
#[derive(Debug, Clone, Serialize)]
pub struct PinPrompt {
    pub action: PinAction,
    pub title: &'static str,
    pub prompt: String,
    /// Only present while the demo PIN is in use.
    pub hint: Option<&'static str>,
}

#[must_use]
pub fn prompt(action: PinAction, locale: Locale, configured_pin: &str) -> PinPrompt {
    let label = action.label(locale);
    let prompt = match locale {
        Locale::En => format!("Enter your 4-digit PIN to {}", label.to_lowercase()),
        Locale::Kn => format!("{label} ಮಾಡಲು ನಿಮ್ಮ 4-ಅಂಕಿಯ ಪಿನ್ ನಮೂದಿಸಿ"),
    };
    let hint = (configured_pin == DEMO_PIN).then(|| locale.pick("Demo PIN: 1234", "ಡೆಮೋ ಪಿನ್: 1234"));
    PinPrompt { action, title: locale.pick("Enter PIN", "ಪಿನ್ ನಮೂದಿಸಿ"), prompt, hint }
}

/// # Errors
///
/// `Malformed` unless `pin` is exactly four ASCII digits.
pub fn validate_format(pin: &str) -> Result<(), PinError> {
    if pin.len() == PIN_LEN && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(PinError::Malformed)
    }
}

/// Check `pin` for `user_id`, recording the outcome in `limiter`.
///
/// # Errors
///
/// `Malformed` (not counted), `TooManyAttempts` while locked out, or
/// `Incorrect` (counted).
pub fn verify(limiter: &AttemptLimiter, expected: &str, user_id: Uuid, pin: &str) -> Result<(), PinError> {
    validate_format(pin)?;
    let matched = limiter.attempt(user_id, || bool::from(pin.as_bytes().ct_eq(expected.as_bytes())))?;
    if matched { Ok(()) } else { Err(PinError::Incorrect) }
}

/// Stand-in for a device biometric prompt.
///
/// # Errors
///
/// `BiometricFailed` with probability `1 - success_rate`.
pub fn verify_biometric(success_rate: f64) -> Result<(), PinError> {
    use rand::Rng;

    if rand::rng().random_bool(success_rate.clamp(0.0, 1.0)) {
        Ok(())
    } else {
        Err(PinError::BiometricFailed)
    }
}

#[cfg(test)]
#[path = "pin_test.rs"]
mod tests;
