//! Records extracted from briefing markup.

use crate::services::ServiceKey;
use serde::{Deserialize, Serialize};

/// One entry of the generated schedule.
///
/// Times are kept as the model wrote them (normally `HH:MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start_time: String,
    pub end_time: String,
    pub title: String,
    pub description: String,
}

/// Kind of media a prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            _ => anyhow::bail!(
                "Invalid media type '{}'. Valid values: image, video, audio",
                s
            ),
        }
    }
}

/// A request for one piece of illustrative media, consumed once by the
/// fan-out controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPrompt {
    pub service: ServiceKey,
    pub kind: MediaKind,
    pub prompt: String,
}

impl MediaPrompt {
    pub fn new(service: ServiceKey, kind: MediaKind, prompt: impl Into<String>) -> Self {
        Self {
            service,
            kind,
            prompt: prompt.into(),
        }
    }
}

/// Structured view derived from the response buffer.
///
/// Never mutated directly; re-parsing the same buffer reproduces it exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedBriefing {
    /// Briefing paragraph, trimmed. Empty until `BRIEFING_START` arrives.
    pub briefing: String,
    /// True once the briefing span was ended by a marker rather than by the
    /// end of the buffer.
    pub briefing_closed: bool,
    /// Action plan items in order of appearance, duplicates kept.
    pub plan: Vec<String>,
    /// Schedule entries, only filled when the calendar service is connected.
    pub calendar: Vec<CalendarEvent>,
    /// Media requests in order of appearance.
    pub media_prompts: Vec<MediaPrompt>,
}

impl ParsedBriefing {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if anything at all has been extracted.
    pub fn has_content(&self) -> bool {
        !self.briefing.is_empty()
            || !self.plan.is_empty()
            || !self.calendar.is_empty()
            || !self.media_prompts.is_empty()
    }

    /// Get a summary string for logging.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.briefing.is_empty() {
            parts.push(format!("briefing ({} chars)", self.briefing.chars().count()));
        }

        let plan_count = self.plan.len();
        if plan_count > 0 {
            parts.push(format!(
                "{} plan item{}",
                plan_count,
                if plan_count == 1 { "" } else { "s" }
            ));
        }

        let event_count = self.calendar.len();
        if event_count > 0 {
            parts.push(format!(
                "{} calendar event{}",
                event_count,
                if event_count == 1 { "" } else { "s" }
            ));
        }

        let media_count = self.media_prompts.len();
        if media_count > 0 {
            parts.push(format!(
                "{} media prompt{}",
                media_count,
                if media_count == 1 { "" } else { "s" }
            ));
        }

        if parts.is_empty() {
            "nothing parsed".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_from_str() {
        assert_eq!("image".parse::<MediaKind>().unwrap(), MediaKind::Image);
        assert_eq!("VIDEO".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert_eq!(" audio ".parse::<MediaKind>().unwrap(), MediaKind::Audio);
        assert!("gif".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_media_kind_display() {
        assert_eq!(MediaKind::Image.to_string(), "image");
        assert_eq!(MediaKind::Video.to_string(), "video");
        assert_eq!(MediaKind::Audio.to_string(), "audio");
    }

    #[test]
    fn test_parsed_briefing_empty() {
        let parsed = ParsedBriefing::new();
        assert!(!parsed.has_content());
        assert_eq!(parsed.summary(), "nothing parsed");
    }

    #[test]
    fn test_parsed_briefing_summary() {
        let parsed = ParsedBriefing {
            briefing: "Busy day.".to_string(),
            briefing_closed: true,
            plan: vec!["Call Bob".to_string(), "Review doc".to_string()],
            calendar: vec![CalendarEvent {
                start_time: "09:00".to_string(),
                end_time: "10:00".to_string(),
                title: "Standup".to_string(),
                description: "Daily sync".to_string(),
            }],
            media_prompts: Vec::new(),
        };
        assert!(parsed.has_content());
        assert_eq!(
            parsed.summary(),
            "briefing (9 chars), 2 plan items, 1 calendar event"
        );
    }
}
