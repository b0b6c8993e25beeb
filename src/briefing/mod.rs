//! Briefing generation core.
//!
//! ```text
//! Store (AppState + Action reducer) ──► BriefingEvent channel ──► UI
//!   ▲
//!   │ dispatch
//!   ├── BriefingOrchestrator  text stream → ChunkReceived* → StreamCompleted
//!   ├── MediaFanOut           MediaStarted → MediaSettled* → MediaFinished
//!   └── CoachingRequester     CoachingStarted → CoachingReady | CoachingFailed
//! ```
//!
//! Everything runs on the caller's task. The store is the single writer of
//! application state; consumers observe it through events.

pub mod coaching;
pub mod credentials;
pub mod fanout;
pub mod orchestrator;
pub mod store;

pub use coaching::{CoachingRequester, CoachingSession, play_session};
pub use credentials::{CredentialProvider, DenyCredentials};
pub use fanout::MediaFanOut;
pub use orchestrator::BriefingOrchestrator;
pub use store::{Action, AppState, BriefingEvent, MediaItem, MediaStatus, Store};

use crate::genai::{ImageRequest, SpeechRequest, VideoRequest};
use std::time::Duration;

/// Per-request generation parameters, resolved from configuration.
///
/// The media request templates carry everything but the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub text_model: String,
    pub image: ImageRequest,
    pub video: VideoRequest,
    pub speech: SpeechRequest,
    /// Sample rate of the speech service's PCM output
    pub sample_rate: u32,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    /// Ask the model for media prompts and fan them out after the stream
    pub include_media: bool,
}

#[cfg(test)]
pub(crate) fn test_settings() -> GenerationSettings {
    GenerationSettings {
        text_model: "text-model".to_string(),
        image: ImageRequest {
            model: "image-model".to_string(),
            prompt: String::new(),
            count: 1,
            mime_type: "image/jpeg".to_string(),
            aspect_ratio: "16:9".to_string(),
        },
        video: VideoRequest {
            model: "video-model".to_string(),
            prompt: String::new(),
            count: 1,
            resolution: "720p".to_string(),
            aspect_ratio: "16:9".to_string(),
        },
        speech: SpeechRequest {
            model: "speech-model".to_string(),
            text: String::new(),
            voice: "Kore".to_string(),
        },
        sample_rate: 24_000,
        poll_interval: Duration::from_secs(10),
        max_poll_attempts: 5,
        include_media: true,
    }
}
