//! Briefing markup parsing from the model's output.
//!
//! Extracts structured records from the full response buffer using regex
//! patterns for:
//! - `BRIEFING_START ... BRIEFING_END`
//! - `PLAN_ITEM: text`
//! - `CALENDAR_ITEM: start - end | title | description`
//! - `MEDIA_PROMPT::service::type::prompt`
//!
//! Malformed lines are dropped silently; a half-streamed marker simply
//! produces no record yet.

use super::types::{CalendarEvent, MediaKind, MediaPrompt, ParsedBriefing};
use crate::services::ServiceKey;
use regex::Regex;
use std::sync::LazyLock;

// Compile regexes once using LazyLock
static MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"BRIEFING_START|BRIEFING_END|PLAN_ITEM:|CALENDAR_ITEM:|MEDIA_PROMPT::").unwrap()
});

// Service and type cannot contain ':'; the prompt takes the rest of the line
static MEDIA_PROMPT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*MEDIA_PROMPT::([^:\r\n]*)::([^:\r\n]*)::(.*)$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    BriefingStart,
    BriefingEnd,
    PlanItem,
    CalendarItem,
    MediaPrompt,
}

impl Marker {
    fn from_match(text: &str) -> Self {
        match text {
            "BRIEFING_START" => Marker::BriefingStart,
            "BRIEFING_END" => Marker::BriefingEnd,
            "PLAN_ITEM:" => Marker::PlanItem,
            "CALENDAR_ITEM:" => Marker::CalendarItem,
            _ => Marker::MediaPrompt,
        }
    }

    /// Markers that end the briefing span. `MEDIA_PROMPT::` and a repeated
    /// `BRIEFING_START` do not.
    fn ends_briefing(self) -> bool {
        matches!(
            self,
            Marker::BriefingEnd | Marker::PlanItem | Marker::CalendarItem
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct MarkerHit {
    marker: Marker,
    start: usize,
    end: usize,
}

/// Parser for extracting a [`ParsedBriefing`] from the response buffer.
pub struct BriefingParser {
    /// Whether `CALENDAR_ITEM:` lines are extracted
    calendar_active: bool,
}

impl BriefingParser {
    /// Create a new parser.
    pub fn new(calendar_active: bool) -> Self {
        Self { calendar_active }
    }

    /// Parse the full buffer received so far.
    pub fn parse(&self, text: &str) -> ParsedBriefing {
        let hits: Vec<MarkerHit> = MARKER_REGEX
            .find_iter(text)
            .map(|m| MarkerHit {
                marker: Marker::from_match(m.as_str()),
                start: m.start(),
                end: m.end(),
            })
            .collect();

        let (briefing, briefing_closed) = extract_briefing(text, &hits);

        let mut parsed = ParsedBriefing {
            briefing,
            briefing_closed,
            ..ParsedBriefing::default()
        };

        for (index, hit) in hits.iter().enumerate() {
            match hit.marker {
                Marker::PlanItem => {
                    let item = payload(text, &hits, index).trim();
                    if !item.is_empty() {
                        parsed.plan.push(item.to_string());
                    }
                }
                Marker::CalendarItem if self.calendar_active => {
                    if let Some(event) = parse_calendar_payload(payload(text, &hits, index)) {
                        parsed.calendar.push(event);
                    }
                }
                _ => {}
            }
        }

        parsed.media_prompts = extract_media_prompts(text);

        tracing::trace!(summary = %parsed.summary(), "parsed briefing buffer");

        parsed
    }
}

/// Convenience function to parse a buffer without creating a parser.
pub fn parse_briefing(text: &str, calendar_active: bool) -> ParsedBriefing {
    BriefingParser::new(calendar_active).parse(text)
}

/// Span after the first `BRIEFING_START` up to the earliest terminator.
fn extract_briefing(text: &str, hits: &[MarkerHit]) -> (String, bool) {
    let Some(start) = hits.iter().find(|h| h.marker == Marker::BriefingStart) else {
        return (String::new(), false);
    };

    let terminator = hits
        .iter()
        .find(|h| h.start >= start.end && h.marker.ends_briefing());

    match terminator {
        Some(end) => (text[start.end..end.start].trim().to_string(), true),
        None => (text[start.end..].trim().to_string(), false),
    }
}

/// Text following marker `index`, up to the end of its line or the next
/// marker, whichever comes first.
fn payload<'a>(text: &'a str, hits: &[MarkerHit], index: usize) -> &'a str {
    let from = hits[index].end;
    let line_end = text[from..]
        .find('\n')
        .map(|offset| from + offset)
        .unwrap_or(text.len());
    let next_marker = hits
        .get(index + 1)
        .map(|h| h.start)
        .unwrap_or(text.len());
    &text[from..line_end.min(next_marker)]
}

/// `start - end | title | description`; any other shape yields `None`.
fn parse_calendar_payload(payload: &str) -> Option<CalendarEvent> {
    let fields: Vec<&str> = payload.trim().split('|').collect();
    if fields.len() != 3 {
        return None;
    }

    let times: Vec<&str> = fields[0].trim().split('-').collect();
    if times.len() != 2 {
        return None;
    }

    Some(CalendarEvent {
        start_time: times[0].trim().to_string(),
        end_time: times[1].trim().to_string(),
        title: fields[1].trim().to_string(),
        description: fields[2].trim().to_string(),
    })
}

fn extract_media_prompts(text: &str) -> Vec<MediaPrompt> {
    let mut prompts = Vec::new();

    for cap in MEDIA_PROMPT_REGEX.captures_iter(text) {
        let (Some(service), Some(kind), Some(prompt)) = (cap.get(1), cap.get(2), cap.get(3)) else {
            continue;
        };

        let (service, kind, prompt) = (
            service.as_str().trim(),
            kind.as_str().trim(),
            prompt.as_str().trim(),
        );
        if service.is_empty() || kind.is_empty() || prompt.is_empty() {
            continue;
        }

        match (service.parse::<ServiceKey>(), kind.parse::<MediaKind>()) {
            (Ok(service), Ok(kind)) => prompts.push(MediaPrompt::new(service, kind, prompt)),
            _ => {
                tracing::debug!(service, kind, "discarding media prompt with unknown service or type");
            }
        }
    }

    prompts
}
