//! Shared UI icons.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");
pub static KEY: Emoji<'_, '_> = Emoji("🔑 ", "[KEY]");

// Card headers
pub static BRIEFING: Emoji<'_, '_> = Emoji("📰 ", "");
pub static PLAN: Emoji<'_, '_> = Emoji("📋 ", "");
pub static CALENDAR: Emoji<'_, '_> = Emoji("📅 ", "");

// Media kinds
pub static IMAGE: Emoji<'_, '_> = Emoji("🖼️  ", "[IMG]");
pub static VIDEO: Emoji<'_, '_> = Emoji("🎬 ", "[VID]");
pub static AUDIO: Emoji<'_, '_> = Emoji("🔊 ", "[AUD]");
pub static COACH: Emoji<'_, '_> = Emoji("🎙️  ", "[COACH]");
