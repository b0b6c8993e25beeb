//! Briefing markup parsing for the model's streamed output.
//!
//! The model is instructed to tag its output with line-oriented markers:
//!
//! - `BRIEFING_START ... BRIEFING_END` - the narrative briefing paragraph
//! - `PLAN_ITEM: text` - one action plan item
//! - `CALENDAR_ITEM: 09:00 - 10:00 | Title | Description` - one schedule entry
//! - `MEDIA_PROMPT::service::image|video|audio::prompt` - one media request
//!
//! Parsing always runs over the whole buffer received so far, so it is safe
//! to call after every streamed chunk.

mod parser;
mod types;

pub use parser::{BriefingParser, parse_briefing};
pub use types::{CalendarEvent, MediaKind, MediaPrompt, ParsedBriefing};
