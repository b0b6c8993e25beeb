//! Prompt composition for the briefing request.

use crate::services::{ServiceKey, calendar_active};
use std::collections::BTreeSet;

/// Upper bound on media prompts requested per briefing.
pub const MAX_MEDIA_PROMPTS: usize = 3;

const PERSONA: &str = "You are a world-class executive assistant AI. Your task is to analyze \
updates from various platforms and provide a concise, professional daily briefing and a \
prioritized action plan.";

const SCHEDULE_PERSONA: &str =
    "You will also create a detailed, realistic schedule based on the action plan.";

const SIMULATION: &str = "Please generate a realistic, simulated summary of morning updates for \
these connected services. For example:
- For Gmail, you could mention a few important-sounding email subjects.
- For LinkedIn, you could mention new messages from professional contacts.
- For TechCrunch, summarize a few recent, plausible tech headlines.";

const BRIEFING_RULES: &str = "Based on the simulated information you generate, create the \
briefing and plan. Follow these instructions VERY CAREFULLY:
1. First, create the briefing. It should be a single paragraph. Start the briefing with the \
exact prefix \"BRIEFING_START\". End it with the exact prefix \"BRIEFING_END\".
2. After the briefing, create the action plan. It should be a list of 3-5 actionable items.
3. Each item in the action plan MUST be on a new line and start with the exact prefix \"PLAN_ITEM:\".";

const CALENDAR_RULES: &str = "4. After the action plan, create a schedule for today's calendar.
5. Convert the action plan items into a schedule for a typical workday (e.g., 9 AM to 5 PM). \
Assign realistic time slots.
6. Proactively add wellness events like a \"Bio Break\" or a \"Walking Meeting\" to the schedule.
7. Each calendar event MUST be on a new line and start with the exact prefix \"CALENDAR_ITEM:\".
8. The format for each calendar item MUST be: START_TIME - END_TIME | TITLE | DESCRIPTION. For \
example: \"CALENDAR_ITEM: 09:00 - 10:00 | Draft Q3 Report | Focus on incorporating the latest \
sales data.\"";

/// Compose the briefing prompt for a set of connected services.
///
/// Deterministic: the same set and flag always produce the same text. The
/// calendar clause appears only when the calendar service is connected, and
/// the media clause only when `include_media` is set.
pub fn build_prompt(services: &BTreeSet<ServiceKey>, include_media: bool) -> String {
    let calendar = calendar_active(services);
    let names: Vec<&str> = services.iter().map(|s| s.as_str()).collect();

    let mut sections = vec![PERSONA.to_string()];
    if calendar {
        sections.push(SCHEDULE_PERSONA.to_string());
    }
    sections.push(format!(
        "I have connected the following services: {}.",
        names.join(", ")
    ));
    sections.push(SIMULATION.to_string());
    sections.push(BRIEFING_RULES.to_string());
    if calendar {
        sections.push(CALENDAR_RULES.to_string());
    }
    if include_media {
        sections.push(media_rules(&names));
    }

    sections.join("\n\n")
}

fn media_rules(names: &[&str]) -> String {
    format!(
        "Finally, suggest up to {max} short media pieces that would illustrate the updates. \
Use at most one per service, choosing only from: {services}. Each suggestion MUST be on its own \
line in the exact format: MEDIA_PROMPT::<service>::<image|video|audio>::<prompt>. Use the \
lowercase service name exactly as listed. For audio, the prompt is the text to be spoken. \
For example: \"MEDIA_PROMPT::techcrunch::image::A sleek robot reading a newspaper at sunrise\"",
        max = MAX_MEDIA_PROMPTS,
        services = names.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(keys: &[ServiceKey]) -> BTreeSet<ServiceKey> {
        keys.iter().copied().collect()
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let services = set(&[ServiceKey::Gmail, ServiceKey::Techcrunch]);
        assert_eq!(
            build_prompt(&services, true),
            build_prompt(&services, true)
        );
    }

    #[test]
    fn test_prompt_lists_services_in_stable_order() {
        let a = set(&[ServiceKey::Techcrunch, ServiceKey::Gmail]);
        let b = set(&[ServiceKey::Gmail, ServiceKey::Techcrunch]);
        let prompt = build_prompt(&a, false);
        assert_eq!(prompt, build_prompt(&b, false));
        assert!(prompt.contains("I have connected the following services: gmail, techcrunch."));
    }

    #[test]
    fn test_prompt_contains_markers() {
        let prompt = build_prompt(&set(&[ServiceKey::Gmail]), false);
        assert!(prompt.contains("BRIEFING_START"));
        assert!(prompt.contains("BRIEFING_END"));
        assert!(prompt.contains("PLAN_ITEM:"));
    }

    #[test]
    fn test_calendar_clause_only_with_calendar() {
        let without = build_prompt(&set(&[ServiceKey::Gmail]), false);
        assert!(!without.contains("CALENDAR_ITEM:"));
        assert!(!without.contains("realistic schedule"));

        let with = build_prompt(&set(&[ServiceKey::Gmail, ServiceKey::Calendar]), false);
        assert!(with.contains("CALENDAR_ITEM:"));
        assert!(with.contains("START_TIME - END_TIME | TITLE | DESCRIPTION"));
        assert!(with.contains("realistic schedule"));
    }

    #[test]
    fn test_media_clause_only_when_enabled() {
        let services = set(&[ServiceKey::Instagram]);
        assert!(!build_prompt(&services, false).contains("MEDIA_PROMPT::"));

        let prompt = build_prompt(&services, true);
        assert!(prompt.contains("MEDIA_PROMPT::<service>::<image|video|audio>::<prompt>"));
        assert!(prompt.contains("up to 3"));
        assert!(prompt.contains("choosing only from: instagram."));
    }
}
