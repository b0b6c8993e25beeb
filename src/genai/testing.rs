//! Scripted in-memory backend for tests.

use super::{
    GeneratedImage, GenerativeBackend, ImageRequest, SpeechRequest, TextRequest, TextStream,
    VideoOperation, VideoRequest,
};
use crate::errors::GenAiError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Mutex;

type ErrorFactory = Box<dyn Fn() -> GenAiError + Send + Sync>;

struct ScriptedFailure {
    remaining: Option<u32>,
    make: ErrorFactory,
}

/// Test double for [`GenerativeBackend`].
///
/// Text requests replay fixed chunks. Media requests succeed with
/// deterministic payloads unless a failure was scripted for their prompt.
/// Every call is recorded as `"<kind>:<detail>"`.
pub(crate) struct ScriptedBackend {
    chunks: Vec<String>,
    open_failure: Option<ErrorFactory>,
    mid_stream_failure: Option<(usize, ErrorFactory)>,
    failures: Mutex<HashMap<String, ScriptedFailure>>,
    polls_until_done: u32,
    pcm: Vec<u8>,
    poll_counts: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            open_failure: None,
            mid_stream_failure: None,
            failures: Mutex::new(HashMap::new()),
            polls_until_done: 0,
            pcm: vec![0x00, 0x01, 0xff, 0x7f],
            poll_counts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_chunks(mut self, chunks: &[&str]) -> Self {
        self.chunks = chunks.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Fail when the text stream is opened.
    pub fn fail_open(mut self, make: impl Fn() -> GenAiError + Send + Sync + 'static) -> Self {
        self.open_failure = Some(Box::new(make));
        self
    }

    /// Yield `after` chunks, then fail the stream.
    pub fn fail_after(
        mut self,
        after: usize,
        make: impl Fn() -> GenAiError + Send + Sync + 'static,
    ) -> Self {
        self.mid_stream_failure = Some((after, Box::new(make)));
        self
    }

    /// Fail every media request whose prompt (or speech text) is `prompt`.
    pub fn fail_prompt(
        self,
        prompt: &str,
        make: impl Fn() -> GenAiError + Send + Sync + 'static,
    ) -> Self {
        self.insert_failure(prompt, None, Box::new(make))
    }

    /// Fail the first `times` requests for `prompt`, then succeed.
    pub fn fail_prompt_times(
        self,
        prompt: &str,
        times: u32,
        make: impl Fn() -> GenAiError + Send + Sync + 'static,
    ) -> Self {
        self.insert_failure(prompt, Some(times), Box::new(make))
    }

    /// Number of status checks before a video operation reports done.
    pub fn with_polls_until_done(mut self, polls: u32) -> Self {
        self.polls_until_done = polls;
        self
    }

    pub fn with_pcm(mut self, pcm: Vec<u8>) -> Self {
        self.pcm = pcm;
        self
    }

    /// All recorded calls, in issue order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls of one kind (`"text"`, `"image"`, ...).
    pub fn call_count(&self, kind: &str) -> usize {
        let prefix = format!("{}:", kind);
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(&prefix))
            .count()
    }

    fn insert_failure(self, prompt: &str, remaining: Option<u32>, make: ErrorFactory) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(prompt.to_string(), ScriptedFailure { remaining, make });
        self
    }

    fn record(&self, kind: &str, detail: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", kind, detail));
    }

    fn check_failure(&self, prompt: &str) -> Result<(), GenAiError> {
        let mut failures = self.failures.lock().unwrap();
        let Some(failure) = failures.get_mut(prompt) else {
            return Ok(());
        };
        match failure.remaining.as_mut() {
            Some(0) => Ok(()),
            Some(n) => {
                *n -= 1;
                Err((failure.make)())
            }
            None => Err((failure.make)()),
        }
    }
}

/// Error with the service's missing-entity message.
pub(crate) fn missing_entity() -> GenAiError {
    GenAiError::Api {
        status: 404,
        message: "Requested entity was not found.".to_string(),
    }
}

/// Plain service failure.
pub(crate) fn server_error() -> GenAiError {
    GenAiError::Api {
        status: 500,
        message: "Internal error".to_string(),
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn stream_text(&self, request: TextRequest) -> Result<TextStream, GenAiError> {
        self.record("text", &request.model);
        if let Some(make) = &self.open_failure {
            return Err(make());
        }

        let mut items: Vec<Result<String, GenAiError>> =
            self.chunks.iter().cloned().map(Ok).collect();
        if let Some((after, make)) = &self.mid_stream_failure {
            items.truncate(*after);
            items.push(Err(make()));
        }
        Ok(futures::stream::iter(items).boxed())
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, GenAiError> {
        self.record("image", &request.prompt);
        self.check_failure(&request.prompt)?;
        Ok(GeneratedImage {
            mime_type: request.mime_type,
            base64_data: BASE64.encode(request.prompt.as_bytes()),
        })
    }

    async fn start_video(&self, request: VideoRequest) -> Result<VideoOperation, GenAiError> {
        self.record("video", &request.prompt);
        self.check_failure(&request.prompt)?;
        let name = format!("operations/{}", request.prompt);
        if self.polls_until_done == 0 {
            return Ok(VideoOperation {
                video_uri: Some(format!("scripted://{}", name)),
                done: true,
                name,
            });
        }
        Ok(VideoOperation::pending(name))
    }

    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoOperation, GenAiError> {
        self.record("poll", &operation.name);
        let mut counts = self.poll_counts.lock().unwrap();
        let count = counts.entry(operation.name.clone()).or_insert(0);
        *count += 1;

        let done = *count >= self.polls_until_done;
        Ok(VideoOperation {
            name: operation.name.clone(),
            done,
            video_uri: done.then(|| format!("scripted://{}", operation.name)),
        })
    }

    async fn download_video(&self, uri: &str) -> Result<Vec<u8>, GenAiError> {
        self.record("download", uri);
        Ok(format!("video bytes for {}", uri).into_bytes())
    }

    async fn generate_speech(&self, request: SpeechRequest) -> Result<String, GenAiError> {
        self.record("speech", &request.text);
        self.check_failure(&request.text)?;
        Ok(BASE64.encode(&self.pcm))
    }
}
