//! Terminal rendering of briefing and coaching events.

use crate::briefing::{BriefingEvent, CoachingSession, MediaItem, MediaStatus};
use crate::markup::{CalendarEvent, MediaKind, ParsedBriefing};
use crate::ui::icons::{
    AUDIO, BRIEFING, CALENDAR, CHECK, COACH, CROSS, IMAGE, KEY, PLAN, SPARKLE, VIDEO,
};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Terminal renderer for [`BriefingEvent`]s, built on `indicatif`.
///
/// Two bars are stacked vertically:
/// - Status spinner: what the generation is doing right now
/// - Media bar: how many fanned-out media items have settled
///
/// Cards are printed above the bars as soon as their content is final: the
/// briefing once its marker closes, each plan or calendar entry once the
/// next one starts (the last one when the stream completes).
pub struct BriefingUI {
    multi: MultiProgress,
    status_bar: ProgressBar,
    media_bar: ProgressBar,
    verbose: bool,
    raw: bool,
    briefing_shown: bool,
    plan_shown: usize,
    calendar_shown: usize,
}

impl BriefingUI {
    /// Create the UI. With `raw`, model output is echoed verbatim instead of
    /// being rendered as cards.
    pub fn new(verbose: bool, raw: bool) -> Self {
        let multi = MultiProgress::new();

        let status_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg}")
            .expect("progress bar template is a valid static string");
        let status_bar = multi.add(ProgressBar::new_spinner());
        status_bar.set_style(status_style);
        status_bar.set_prefix("Brief");

        let media_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");
        let media_bar = multi.add(ProgressBar::new(0));
        media_bar.set_style(media_style);
        media_bar.set_prefix("Media");

        Self {
            multi,
            status_bar,
            media_bar,
            verbose,
            raw,
            briefing_shown: false,
            plan_shown: 0,
            calendar_shown: 0,
        }
    }

    /// Handle to the bars, for suspending them around interactive prompts.
    pub fn progress(&self) -> MultiProgress {
        self.multi.clone()
    }

    /// Print a line via `MultiProgress`, falling back to plain output when the
    /// bars are hidden (not a terminal) or the rich UI fails.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.is_hidden() {
            println!("{}", msg.as_ref());
        } else if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    /// Render one event.
    pub fn handle(&mut self, event: &BriefingEvent) {
        match event {
            BriefingEvent::ServicesChanged { .. } => {}
            BriefingEvent::GenerationStarted { services } => {
                self.briefing_shown = false;
                self.plan_shown = 0;
                self.calendar_shown = 0;
                let names: Vec<&str> = services.iter().map(|s| s.display_name()).collect();
                self.status_bar
                    .set_message(format!("Generating briefing for {}", style(names.join(", ")).cyan()));
                self.status_bar.enable_steady_tick(Duration::from_millis(100));
            }
            BriefingEvent::BriefingUpdated { chunk, parsed } => {
                if self.raw {
                    self.print_line(chunk.trim_end_matches('\n'));
                } else {
                    self.reveal(parsed, false);
                }
            }
            BriefingEvent::StreamCompleted {
                parsed,
                media_prompts,
            } => {
                if !self.raw {
                    self.reveal(parsed, true);
                }
                self.status_bar.set_message(format!(
                    "{}Briefing complete ({})",
                    CHECK,
                    parsed.summary()
                ));
                if *media_prompts == 0 {
                    self.status_bar.finish();
                }
            }
            BriefingEvent::GenerationFailed { message } => {
                self.status_bar.abandon_with_message(format!(
                    "{}{}",
                    CROSS,
                    style(message).red().bold()
                ));
            }
            BriefingEvent::MediaStarted { items } => {
                self.media_bar.set_length(items.len() as u64);
                self.media_bar.set_position(0);
                self.media_bar.set_message("generating...");
                self.status_bar
                    .set_message(format!("{}Generating {} media item(s)", SPARKLE, items.len()));
                self.status_bar.enable_steady_tick(Duration::from_millis(100));
            }
            BriefingEvent::MediaSettled { item, .. } => {
                self.media_bar.inc(1);
                self.print_line(format!("  {}", media_line(item)));
            }
            BriefingEvent::CredentialSelectionRequired => {
                self.status_bar.disable_steady_tick();
                self.status_bar
                    .set_message(format!("{}Waiting for an API key selection", KEY));
                self.print_line(format!(
                    "  {}{}",
                    KEY,
                    style("The video model is not available for this API key. Select another key to retry.")
                        .yellow()
                ));
            }
            BriefingEvent::MediaFinished { items } => {
                let done = items.iter().filter(|i| i.status == MediaStatus::Done).count();
                self.media_bar
                    .finish_with_message(format!("{}/{} generated", done, items.len()));
                self.status_bar.finish();
            }
            BriefingEvent::CoachingStarted => {
                self.status_bar
                    .set_message(format!("{}Preparing your end of day coaching...", COACH));
                self.status_bar.enable_steady_tick(Duration::from_millis(100));
            }
            BriefingEvent::CoachingReady { session } => {
                self.status_bar
                    .finish_with_message(format!("{}Coaching session ready", CHECK));
                self.print_coaching(session);
            }
            BriefingEvent::CoachingFailed { message } => {
                self.status_bar.abandon_with_message(format!(
                    "{}{}",
                    CROSS,
                    style(message).red().bold()
                ));
            }
        }
    }

    /// Print whatever became final since the last update.
    fn reveal(&mut self, parsed: &ParsedBriefing, complete: bool) {
        if !self.briefing_shown && (parsed.briefing_closed || complete) && !parsed.briefing.is_empty()
        {
            self.briefing_shown = true;
            self.print_line(format!("\n{}{}", BRIEFING, style("Daily Briefing").bold()));
            self.print_line(format!("  {}", parsed.briefing));
        }

        let plan_ready = final_count(parsed.plan.len(), complete);
        if plan_ready > self.plan_shown {
            if self.plan_shown == 0 {
                self.print_line(format!("\n{}{}", PLAN, style("Action Plan").bold()));
            }
            for (i, item) in parsed.plan[self.plan_shown..plan_ready].iter().enumerate() {
                self.print_line(format!("  {}. {}", self.plan_shown + i + 1, item));
            }
            self.plan_shown = plan_ready;
        }

        let calendar_ready = final_count(parsed.calendar.len(), complete);
        if calendar_ready > self.calendar_shown {
            if self.calendar_shown == 0 {
                self.print_line(format!("\n{}{}", CALENDAR, style("Today's Schedule").bold()));
            }
            for event in &parsed.calendar[self.calendar_shown..calendar_ready] {
                self.print_line(format!("  {}", calendar_line(event)));
            }
            self.calendar_shown = calendar_ready;
        }

        if self.verbose && !complete {
            self.status_bar
                .set_message(format!("Streaming... {}", style(parsed.summary()).dim()));
        }
    }

    fn print_coaching(&self, session: &CoachingSession) {
        self.print_line(format!("\n{}{}", COACH, style("End of Day Coach").bold()));
        self.print_line(format!("  {}", session.transcript));
    }
}

/// Entries that can no longer change: all of them once the stream is
/// complete, otherwise all but the last.
fn final_count(len: usize, complete: bool) -> usize {
    if complete { len } else { len.saturating_sub(1) }
}

fn calendar_line(event: &CalendarEvent) -> String {
    if event.description.is_empty() {
        format!("{}-{}  {}", event.start_time, event.end_time, event.title)
    } else {
        format!(
            "{}-{}  {} {}",
            event.start_time,
            event.end_time,
            event.title,
            style(format!("({})", event.description)).dim()
        )
    }
}

fn media_line(item: &MediaItem) -> String {
    let icon = match item.kind {
        MediaKind::Image => IMAGE,
        MediaKind::Video => VIDEO,
        MediaKind::Audio => AUDIO,
    };
    let outcome = match item.status {
        MediaStatus::Done => style("done".to_string()).green(),
        MediaStatus::Error => style(item.error.clone().unwrap_or_else(|| "failed".to_string())).red(),
        MediaStatus::Loading => style("loading".to_string()).dim(),
    };
    format!(
        "{}{} {}: {}",
        icon,
        item.service.display_name(),
        item.kind,
        outcome
    )
}
