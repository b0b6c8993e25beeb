//! Typed error hierarchy for daybrief.
//!
//! Three top-level enums cover the three subsystems:
//! - `GenAiError`: calls to the generative text/image/video/speech services
//! - `BriefingError`: briefing generation as seen by the user
//! - `AudioError`: WAV container handling and audio playback

use thiserror::Error;

/// Substring the video service uses when the selected credential cannot
/// reach the model.
const MISSING_ENTITY_MARKER: &str = "Requested entity was not found";

/// Errors from the generative services.
#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("{env_var} environment variable is not set.")]
    MissingCredential { env_var: String },

    #[error("Request to generative service failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Generative service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response from generative service: {0}")]
    MalformedResponse(String),

    #[error("Video generation failed: {0}")]
    Operation(String),

    #[error("Video generation did not finish after {attempts} status checks")]
    VideoTimeout { attempts: u32 },

    #[error("An API key must be selected before generating video")]
    CredentialSelectionRequired,

    #[error("Invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error(transparent)]
    Audio(#[from] AudioError),
}

impl GenAiError {
    /// Whether this failure means the selected credential cannot see the
    /// requested model, which is recovered by selecting another key.
    pub fn is_missing_entity(&self) -> bool {
        self.to_string().contains(MISSING_ENTITY_MARKER)
    }
}

impl From<reqwest::Error> for GenAiError {
    fn from(err: reqwest::Error) -> Self {
        GenAiError::Transport(err)
    }
}

/// Errors from briefing generation.
#[derive(Debug, Error)]
pub enum BriefingError {
    #[error("No services connected")]
    NoServices,

    #[error("A briefing is already being generated")]
    AlreadyRunning,

    #[error("Briefing generation failed: {0}")]
    Generation(#[from] GenAiError),
}

impl BriefingError {
    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            BriefingError::NoServices => {
                "Please connect at least one service to generate a briefing.".to_string()
            }
            BriefingError::AlreadyRunning => {
                "A briefing is already being generated. Please wait for it to finish.".to_string()
            }
            BriefingError::Generation(err @ GenAiError::MissingCredential { .. }) => err.to_string(),
            BriefingError::Generation(_) => {
                "Failed to generate daily briefing. Please check your API key and try again."
                    .to_string()
            }
        }
    }
}

/// Errors from WAV handling and playback.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Invalid WAV data: {0}")]
    InvalidWav(String),

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Audio playback is not available in this build")]
    Unavailable,
}
