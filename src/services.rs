//! Connectable services ("capabilities") a briefing can be generated from.
//!
//! Connecting a service is simulated: the model is told which services are
//! connected and invents plausible updates for them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A named upstream data source the user has toggled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKey {
    Gmail,
    Linkedin,
    Facebook,
    Instagram,
    Techcrunch,
    Calendar,
    Hinge,
    Tinder,
    Bumble,
    Googlenews,
    Applenews,
}

impl ServiceKey {
    /// Every known service, in catalog order.
    pub const ALL: [ServiceKey; 11] = [
        ServiceKey::Gmail,
        ServiceKey::Linkedin,
        ServiceKey::Facebook,
        ServiceKey::Instagram,
        ServiceKey::Techcrunch,
        ServiceKey::Calendar,
        ServiceKey::Hinge,
        ServiceKey::Tinder,
        ServiceKey::Bumble,
        ServiceKey::Googlenews,
        ServiceKey::Applenews,
    ];

    /// Wire/CLI identifier (e.g. `googlenews`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKey::Gmail => "gmail",
            ServiceKey::Linkedin => "linkedin",
            ServiceKey::Facebook => "facebook",
            ServiceKey::Instagram => "instagram",
            ServiceKey::Techcrunch => "techcrunch",
            ServiceKey::Calendar => "calendar",
            ServiceKey::Hinge => "hinge",
            ServiceKey::Tinder => "tinder",
            ServiceKey::Bumble => "bumble",
            ServiceKey::Googlenews => "googlenews",
            ServiceKey::Applenews => "applenews",
        }
    }

    /// Human-readable name shown on cards.
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceKey::Gmail => "Gmail",
            ServiceKey::Linkedin => "LinkedIn",
            ServiceKey::Facebook => "Facebook",
            ServiceKey::Instagram => "Instagram",
            ServiceKey::Techcrunch => "TechCrunch",
            ServiceKey::Calendar => "Google Calendar",
            ServiceKey::Hinge => "Hinge",
            ServiceKey::Tinder => "Tinder",
            ServiceKey::Bumble => "Bumble",
            ServiceKey::Googlenews => "Google News",
            ServiceKey::Applenews => "Apple News",
        }
    }
}

impl std::fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ServiceKey::ALL
            .into_iter()
            .find(|key| key.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = ServiceKey::ALL.iter().map(|k| k.as_str()).collect();
                anyhow::anyhow!(
                    "Unknown service '{}'. Valid values: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// Whether the calendar capability is part of the given set.
pub fn calendar_active(services: &BTreeSet<ServiceKey>) -> bool {
    services.contains(&ServiceKey::Calendar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_key_round_trips_through_str() {
        for key in ServiceKey::ALL {
            assert_eq!(key.as_str().parse::<ServiceKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_service_key_from_str_is_case_insensitive() {
        assert_eq!("GMail".parse::<ServiceKey>().unwrap(), ServiceKey::Gmail);
        assert_eq!(" calendar ".parse::<ServiceKey>().unwrap(), ServiceKey::Calendar);
    }

    #[test]
    fn test_service_key_from_str_invalid() {
        let err = "myspace".parse::<ServiceKey>().unwrap_err();
        assert!(err.to_string().contains("Unknown service 'myspace'"));
        assert!(err.to_string().contains("googlenews"));
    }

    #[test]
    fn test_service_key_serde_lowercase() {
        let json = serde_json::to_string(&ServiceKey::Techcrunch).unwrap();
        assert_eq!(json, "\"techcrunch\"");
        let back: ServiceKey = serde_json::from_str("\"applenews\"").unwrap();
        assert_eq!(back, ServiceKey::Applenews);
    }

    #[test]
    fn test_calendar_active() {
        let mut services = BTreeSet::from([ServiceKey::Gmail]);
        assert!(!calendar_active(&services));
        services.insert(ServiceKey::Calendar);
        assert!(calendar_active(&services));
    }
}
