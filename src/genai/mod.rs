//! Generative service seam.
//!
//! [`GenerativeBackend`] is the only way the briefing core talks to a model.
//! [`GeminiClient`] implements it over the Gemini REST API; tests use an
//! in-memory scripted backend.

mod credentials;
mod gemini;
mod stream;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use credentials::ApiKey;
pub use gemini::GeminiClient;
pub use stream::{SseDecoder, StreamChunk};
pub use types::{GeneratedImage, ImageRequest, SpeechRequest, TextRequest, VideoOperation, VideoRequest};

use crate::errors::GenAiError;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lazily produced text fragments, in order, ending with the stream.
pub type TextStream = BoxStream<'static, Result<String, GenAiError>>;

/// Abstraction over the generative services for testability.
/// Real implementation: `GeminiClient`. Test double: `ScriptedBackend`.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Open a streaming text generation for a single prompt.
    async fn stream_text(&self, request: TextRequest) -> Result<TextStream, GenAiError>;

    /// Generate one image.
    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, GenAiError>;

    /// Start a long-running video generation.
    async fn start_video(&self, request: VideoRequest) -> Result<VideoOperation, GenAiError>;

    /// Fetch the current status of a video operation.
    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoOperation, GenAiError>;

    /// Materialize the bytes behind a finished video's locator.
    async fn download_video(&self, uri: &str) -> Result<Vec<u8>, GenAiError>;

    /// Synthesize speech; returns base64 raw 16-bit mono PCM.
    async fn generate_speech(&self, request: SpeechRequest) -> Result<String, GenAiError>;
}
