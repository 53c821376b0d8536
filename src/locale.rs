//! English / Kannada presentation helpers.
//!
//! DESIGN
//! ======
//! The portals render in `en-IN` or `kn-IN`. Everything user-visible that the
//! service produces (messages, money, dates, times) goes through this module
//! so handlers only pick a `Locale` and pass it down. Digits stay Latin in
//! both locales, matching what browsers emit for `kn-IN`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use time::{Date, Month, Time, UtcOffset};

/// Offset used for every displayed timestamp.
pub const IST: UtcOffset = time::macros::offset!(+5:30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Kn,
}

impl Locale {
    /// Parse a BCP-47-ish tag such as `kn`, `kn-IN` or `en_IN`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Self::En),
            "kn" => Some(Self::Kn),
            _ => None,
        }
    }

    /// First supported language in an `Accept-Language` header, in listed order.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Option<Self> {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .find_map(Self::from_tag)
    }

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::En => "en-IN",
            Self::Kn => "kn-IN",
        }
    }

    #[must_use]
    pub fn pick(self, en: &'static str, kn: &'static str) -> &'static str {
        match self {
            Self::En => en,
            Self::Kn => kn,
        }
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

/// User-facing messages shared by several routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    Unauthorized,
    Forbidden,
    NotFound,
    BadRequest,
    Internal,
    InvalidEmail,
    WeakPassword,
    AlreadyRegistered,
    InvalidCredentials,
    InvalidPin,
    IncorrectPin,
    TooManyAttempts,
    PinVerified,
    CardNotFound,
    CardLocked,
    CardExpired,
    CardLockedOk,
    CardUnlockedOk,
    InsufficientBalance,
    InvalidAmount,
    BiometricFailed,
    InvalidEmployeeId,
    InvalidAdmin,
    AdminDisabled,
    EmployeeNotFound,
    LineUnderConstruction,
    NotMetered,
    EmergencyInitiated,
}

impl Msg {
    #[must_use]
    pub fn text(self, locale: Locale) -> &'static str {
        match self {
            Self::Unauthorized => locale.pick(
                "Please sign in to continue.",
                "ಮುಂದುವರಿಯಲು ದಯವಿಟ್ಟು ಸೈನ್ ಇನ್ ಮಾಡಿ.",
            ),
            Self::Forbidden => locale.pick(
                "You do not have access to this page.",
                "ಈ ಪುಟಕ್ಕೆ ನಿಮಗೆ ಪ್ರವೇಶವಿಲ್ಲ.",
            ),
            Self::NotFound => locale.pick("Not found.", "ಕಂಡುಬಂದಿಲ್ಲ."),
            Self::BadRequest => locale.pick("Invalid request.", "ಅಮಾನ್ಯ ವಿನಂತಿ."),
            Self::Internal => locale.pick(
                "An unexpected error occurred. Please try again.",
                "ಅನಿರೀಕ್ಷಿತ ದೋಷ ಸಂಭವಿಸಿದೆ. ದಯವಿಟ್ಟು ಮತ್ತೆ ಪ್ರಯತ್ನಿಸಿ.",
            ),
            Self::InvalidEmail => locale.pick(
                "Please enter a valid email address.",
                "ದಯವಿಟ್ಟು ಮಾನ್ಯವಾದ ಇಮೇಲ್ ವಿಳಾಸವನ್ನು ನಮೂದಿಸಿ.",
            ),
            Self::WeakPassword => locale.pick(
                "Password should be at least 6 characters.",
                "ಪಾಸ್‌ವರ್ಡ್ ಕನಿಷ್ಠ 6 ಅಕ್ಷರಗಳಿರಬೇಕು.",
            ),
            Self::AlreadyRegistered => locale.pick("User already registered.", "ಬಳಕೆದಾರರು ಈಗಾಗಲೇ ನೋಂದಾಯಿಸಿದ್ದಾರೆ."),
            Self::InvalidCredentials => locale.pick("Invalid login credentials.", "ಅಮಾನ್ಯ ಲಾಗಿನ್ ವಿವರಗಳು."),
            Self::InvalidPin => locale.pick("Please enter a 4-digit PIN", "ದಯವಿಟ್ಟು 4-ಅಂಕಿಯ ಪಿನ್ ನಮೂದಿಸಿ"),
            Self::IncorrectPin => locale.pick("Please enter the correct PIN", "ದಯವಿಟ್ಟು ಸರಿಯಾದ ಪಿನ್ ನಮೂದಿಸಿ"),
            Self::TooManyAttempts => locale.pick(
                "Too many incorrect attempts. Please try again later.",
                "ಹಲವಾರು ತಪ್ಪು ಪ್ರಯತ್ನಗಳು. ದಯವಿಟ್ಟು ನಂತರ ಮತ್ತೆ ಪ್ರಯತ್ನಿಸಿ.",
            ),
            Self::PinVerified => locale.pick(
                "Your PIN has been successfully verified",
                "ನಿಮ್ಮ ಪಿನ್ ಯಶಸ್ವಿಯಾಗಿ ಪರಿಶೀಲಿಸಲಾಗಿದೆ",
            ),
            Self::CardNotFound => locale.pick(
                "Failed to fetch your transport card data",
                "ನಿಮ್ಮ ಸಾರಿಗೆ ಕಾರ್ಡ್ ಮಾಹಿತಿಯನ್ನು ಪಡೆಯಲು ವಿಫಲವಾಗಿದೆ",
            ),
            Self::CardLocked => locale.pick(
                "Your card is locked. Unlock it to continue.",
                "ನಿಮ್ಮ ಕಾರ್ಡ್ ಲಾಕ್ ಆಗಿದೆ. ಮುಂದುವರಿಯಲು ಅನ್‌ಲಾಕ್ ಮಾಡಿ.",
            ),
            Self::CardExpired => locale.pick("Your card has expired.", "ನಿಮ್ಮ ಕಾರ್ಡ್ ಅವಧಿ ಮುಗಿದಿದೆ."),
            Self::CardLockedOk => locale.pick("Your card has been locked", "ನಿಮ್ಮ ಕಾರ್ಡ್ ಲಾಕ್ ಮಾಡಲಾಗಿದೆ"),
            Self::CardUnlockedOk => locale.pick("Your card has been unlocked", "ನಿಮ್ಮ ಕಾರ್ಡ್ ಅನ್‌ಲಾಕ್ ಮಾಡಲಾಗಿದೆ"),
            Self::InsufficientBalance => locale.pick(
                "You don't have enough balance for this transaction.",
                "ಈ ವಹಿವಾಟಿಗೆ ನಿಮ್ಮಲ್ಲಿ ಸಾಕಷ್ಟು ಬ್ಯಾಲೆನ್ಸ್ ಇಲ್ಲ.",
            ),
            Self::InvalidAmount => locale.pick(
                "Please enter a valid amount.",
                "ದಯವಿಟ್ಟು ಮಾನ್ಯವಾದ ಮೊತ್ತವನ್ನು ನಮೂದಿಸಿ.",
            ),
            Self::BiometricFailed => locale.pick(
                "Verification failed. Please try again.",
                "ಪರಿಶೀಲನೆ ವಿಫಲವಾಗಿದೆ. ದಯವಿಟ್ಟು ಮತ್ತೆ ಪ್ರಯತ್ನಿಸಿ.",
            ),
            Self::InvalidEmployeeId => locale.pick(
                "Invalid employee ID. Please try again.",
                "ಉದ್ಯೋಗಿ ID ಅಮಾನ್ಯವಾಗಿದೆ. ದಯವಿಟ್ಟು ಮತ್ತೆ ಪ್ರಯತ್ನಿಸಿ.",
            ),
            Self::InvalidAdmin => locale.pick("Invalid admin credentials.", "ಅಮಾನ್ಯ ನಿರ್ವಾಹಕ ಪ್ರಮಾಣಪತ್ರಗಳು."),
            Self::AdminDisabled => locale.pick("Admin login is not configured.", "ನಿರ್ವಾಹಕ ಲಾಗಿನ್ ಲಭ್ಯವಿಲ್ಲ."),
            Self::EmployeeNotFound => locale.pick("Employee record not found.", "ಉದ್ಯೋಗಿ ದಾಖಲೆ ಕಂಡುಬಂದಿಲ್ಲ."),
            Self::LineUnderConstruction => locale.pick(
                "This line is under construction.",
                "ಈ ಮಾರ್ಗ ನಿರ್ಮಾಣ ಹಂತದಲ್ಲಿದೆ.",
            ),
            Self::NotMetered => locale.pick(
                "Fares for this service are quoted on request.",
                "ಈ ಸೇವೆಯ ದರವನ್ನು ವಿನಂತಿಯ ಮೇರೆಗೆ ತಿಳಿಸಲಾಗುತ್ತದೆ.",
            ),
            Self::EmergencyInitiated => locale.pick(
                "Emergency services will contact you shortly",
                "ತುರ್ತು ಸೇವೆಗಳು ಶೀಘ್ರದಲ್ಲೇ ನಿಮ್ಮನ್ನು ಸಂಪರ್ಕಿಸುತ್ತವೆ",
            ),
        }
    }
}

// =============================================================================
// MONEY
// =============================================================================

/// Format rupees with Indian digit grouping, e.g. `₹1,23,456.50`.
#[must_use]
pub fn format_inr(amount: Decimal, fraction_digits: u32) -> String {
    let mut rounded = amount
        .abs()
        .round_dp_with_strategy(fraction_digits, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(fraction_digits);
    let plain = rounded.to_string();
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (plain.as_str(), None),
    };

    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let grouped = group_indian(int_part);
    match frac_part {
        Some(frac) => format!("{sign}₹{grouped}.{frac}"),
        None => format!("{sign}₹{grouped}"),
    }
}

/// Group an unsigned digit string as `12,34,567`: last three, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    let offset = head.len() % 2;
    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (i + 2 - offset) % 2 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push(',');
    out.push_str(tail);
    out
}

// =============================================================================
// DATES AND TIMES
// =============================================================================

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTHS_EN_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sept", "Oct", "Nov", "Dec",
];

const MONTHS_KN: [&str; 12] = [
    "ಜನವರಿ",
    "ಫೆಬ್ರವರಿ",
    "ಮಾರ್ಚ್",
    "ಏಪ್ರಿಲ್",
    "ಮೇ",
    "ಜೂನ್",
    "ಜುಲೈ",
    "ಆಗಸ್ಟ್",
    "ಸೆಪ್ಟೆಂಬರ್",
    "ಅಕ್ಟೋಬರ್",
    "ನವೆಂಬರ್",
    "ಡಿಸೆಂಬರ್",
];

const MONTHS_KN_SHORT: [&str; 12] = [
    "ಜನವರಿ",
    "ಫೆಬ್ರವರಿ",
    "ಮಾರ್ಚ್",
    "ಏಪ್ರಿ",
    "ಮೇ",
    "ಜೂನ್",
    "ಜುಲೈ",
    "ಆಗ",
    "ಸೆಪ್ಟೆಂ",
    "ಅಕ್ಟೋ",
    "ನವೆಂ",
    "ಡಿಸೆಂ",
];

fn month_index(month: Month) -> usize {
    usize::from(u8::from(month)) - 1
}

/// Day and abbreviated month, e.g. `3 May`.
#[must_use]
pub fn format_short_date(date: Date, locale: Locale) -> String {
    let names = match locale {
        Locale::En => &MONTHS_EN_SHORT,
        Locale::Kn => &MONTHS_KN_SHORT,
    };
    format!("{} {}", date.day(), names[month_index(date.month())])
}

/// Day, full month and year, e.g. `1 April 2024`.
#[must_use]
pub fn format_long_date(date: Date, locale: Locale) -> String {
    let names = match locale {
        Locale::En => &MONTHS_EN,
        Locale::Kn => &MONTHS_KN,
    };
    format!("{} {} {}", date.day(), names[month_index(date.month())], date.year())
}

/// Two-digit 12-hour clock, e.g. `08:35 am`.
#[must_use]
pub fn format_time_12h(time: Time, locale: Locale) -> String {
    let (hour, minute) = (time.hour(), time.minute());
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if hour < 12 {
        locale.pick("am", "ಪೂರ್ವಾಹ್ನ")
    } else {
        locale.pick("pm", "ಅಪರಾಹ್ನ")
    };
    format!("{display_hour:02}:{minute:02} {meridiem}")
}

#[cfg(test)]
#[path = "locale_test.rs"]
mod tests;
