//! Request and response values exchanged with a generative backend.

use serde::{Deserialize, Serialize};

/// Streaming text generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRequest {
    pub model: String,
    pub prompt: String,
}

/// Image generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub count: u32,
    pub mime_type: String,
    pub aspect_ratio: String,
}

impl ImageRequest {
    /// Same parameters, different prompt.
    pub fn with_prompt(&self, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..self.clone()
        }
    }
}

/// A generated image as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub base64_data: String,
}

/// Video generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRequest {
    pub model: String,
    pub prompt: String,
    pub count: u32,
    pub resolution: String,
    pub aspect_ratio: String,
}

impl VideoRequest {
    /// Same parameters, different prompt.
    pub fn with_prompt(&self, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..self.clone()
        }
    }
}

/// Handle to a long-running video generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoOperation {
    /// Operation resource name used for status checks
    pub name: String,
    pub done: bool,
    /// Locator of the generated video once `done`
    pub video_uri: Option<String>,
}

impl VideoOperation {
    /// A freshly started, unfinished operation.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            video_uri: None,
        }
    }
}

/// Speech synthesis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub model: String,
    pub text: String,
    pub voice: String,
}

impl SpeechRequest {
    /// Same parameters, different text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}
