pub mod audio;
pub mod briefing;
pub mod config;
pub mod errors;
pub mod genai;
pub mod markup;
pub mod prompt;
pub mod services;
pub mod ui;
pub mod util;
