//! End-of-day coaching: a spoken pep talk plus an illustration.

use super::GenerationSettings;
use super::store::{Action, Store};
use crate::audio::{AudioOutput, PlaybackGuard, WavSpec, pcm_to_wav};
use crate::errors::GenAiError;
use crate::genai::GenerativeBackend;
use crate::util::data_uri_from_base64;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Spoken by the coach and shown as the transcript.
pub const COACHING_SCRIPT: &str = "You made it through another full day. Take a breath and \
notice what went well: the conversations you showed up for, the tasks you finished, and the \
ones you moved forward. Anything left on the list will still be there tomorrow, and you will \
meet it rested. Pick one small win from today and hold on to it. Now close the laptop, \
stretch, and give the evening to yourself. Great work today.";

/// Image prompt for the coaching illustration.
pub const COACHING_IMAGE_PROMPT: &str = "A calm, warm sunset over a quiet city skyline seen \
from a cozy home office window, soft golden light, a closed laptop and a steaming cup of tea \
on the desk, peaceful and encouraging mood, photorealistic";

/// Result of one coaching request. Built only when both parts succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachingSession {
    /// Base64 raw 16-bit mono PCM
    pub audio_b64: String,
    pub transcript: String,
    /// Data URI of the illustration
    pub image_url: String,
}

/// Issues the two coaching requests concurrently and joins them.
pub struct CoachingRequester {
    backend: Arc<dyn GenerativeBackend>,
    settings: GenerationSettings,
}

impl CoachingRequester {
    pub fn new(backend: Arc<dyn GenerativeBackend>, settings: GenerationSettings) -> Self {
        Self { backend, settings }
    }

    /// Request speech and image together; either failing fails the session.
    pub async fn request(&self) -> Result<CoachingSession, GenAiError> {
        let speech = self
            .backend
            .generate_speech(self.settings.speech.with_text(COACHING_SCRIPT));
        let image = self
            .backend
            .generate_image(self.settings.image.with_prompt(COACHING_IMAGE_PROMPT));

        let (audio_b64, image) = tokio::try_join!(speech, image)?;

        Ok(CoachingSession {
            audio_b64,
            transcript: COACHING_SCRIPT.to_string(),
            image_url: data_uri_from_base64(&image.mime_type, &image.base64_data),
        })
    }

    /// [`request`](Self::request) with its outcome recorded in `store`.
    pub async fn run(&self, store: &mut Store) -> Result<CoachingSession, GenAiError> {
        store.dispatch(Action::CoachingStarted);
        match self.request().await {
            Ok(session) => {
                tracing::info!("coaching session ready");
                store.dispatch(Action::CoachingReady(session.clone()));
                Ok(session)
            }
            Err(err) => {
                tracing::warn!(error = %err, "coaching session failed");
                store.dispatch(Action::CoachingFailed(err.to_string()));
                Err(err)
            }
        }
    }
}

/// Start playing a session's speech. Playback stops when the guard drops.
pub fn play_session(
    session: &CoachingSession,
    sample_rate: u32,
    output: &dyn AudioOutput,
) -> Result<PlaybackGuard, GenAiError> {
    let pcm = BASE64.decode(session.audio_b64.trim())?;
    let wav = pcm_to_wav(&pcm, WavSpec::mono16(sample_rate));
    Ok(output.start(wav)?)
}
