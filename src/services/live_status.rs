//! Fixed per-service status badges for the home page.

use serde::Serialize;

use crate::locale::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Operational,
    Delayed,
    Maintenance,
    Unknown,
}

impl ServiceStatus {
    #[must_use]
    pub fn label(self, locale: Locale) -> &'static str {
        match self {
            Self::Operational => locale.pick("Operational", "ಕಾರ್ಯನಿರ್ವಹಿಸುತ್ತಿದೆ"),
            Self::Delayed => locale.pick("Delayed", "ವಿಳಂಬ"),
            Self::Maintenance => locale.pick("Maintenance", "ನಿರ್ವಹಣೆ"),
            Self::Unknown => locale.pick("Unknown", "ಅಜ್ಞಾತ"),
        }
    }
}

struct ServiceBadge {
    id: u32,
    name: (&'static str, &'static str),
    status: ServiceStatus,
}

const BADGES: [ServiceBadge; 4] = [
    ServiceBadge { id: 1, name: ("BMTC Buses", "ಬಿಎಂಟಿಸಿ ಬಸ್ಸುಗಳು"), status: ServiceStatus::Operational },
    ServiceBadge { id: 2, name: ("Namma Metro", "ನಮ್ಮ ಮೆಟ್ರೋ"), status: ServiceStatus::Operational },
    ServiceBadge { id: 3, name: ("KSRTC Buses", "ಕೆಎಸ್ಆರ್‌ಟಿಸಿ ಬಸ್ಸುಗಳು"), status: ServiceStatus::Delayed },
    ServiceBadge { id: 4, name: ("Auto/Taxi Services", "ಆಟೋ/ಟ್ಯಾಕ್ಸಿ ಸೇವೆಗಳು"), status: ServiceStatus::Maintenance },
];

#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub id: u32,
    pub name: &'static str,
    pub status: ServiceStatus,
    pub label: &'static str,
}

#[must_use]
pub fn badges(locale: Locale) -> Vec<StatusView> {
    BADGES
        .iter()
        .map(|b| StatusView {
            id: b.id,
            name: locale.pick(b.name.0, b.name.1),
            status: b.status,
            label: b.status.label(locale),
        })
        .collect()
}
