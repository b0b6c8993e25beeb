//! Gemini REST API client.

use super::credentials::ApiKey;
use super::stream::{ApiErrorBody, ApiErrorDetail, SseDecoder, StreamChunk};
use super::types::{
    GeneratedImage, ImageRequest, SpeechRequest, TextRequest, VideoOperation, VideoRequest,
};
use super::{GenerativeBackend, TextStream};
use crate::errors::GenAiError;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::VecDeque;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini text, Imagen, Veo and TTS endpoints.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// The shared credential handle, for installing a newly selected key.
    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<reqwest::Response, GenAiError> {
        let key = self.api_key.resolve()?;
        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, key)
            .json(body)
            .send()
            .await?;
        check_status(response).await
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, GenAiError> {
        let key = self.api_key.resolve()?;
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, key)
            .send()
            .await?;
        check_status(response).await
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn stream_text(&self, request: TextRequest) -> Result<TextStream, GenAiError> {
        let url = format!(
            "{}?alt=sse",
            self.model_url(&request.model, "streamGenerateContent")
        );
        tracing::debug!(model = %request.model, prompt_chars = request.prompt.len(), "opening text stream");

        let response = self.post_json(&url, &text_body(&request.prompt)).await?;
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();

        Ok(sse_text_stream(body))
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, GenAiError> {
        let url = self.model_url(&request.model, "predict");
        tracing::debug!(model = %request.model, "requesting image");

        let predictions: PredictResponse = self
            .post_json(&url, &image_body(&request))
            .await?
            .json()
            .await?;

        let prediction = predictions
            .predictions
            .into_iter()
            .find(|p| p.bytes_base64_encoded.is_some())
            .ok_or_else(|| GenAiError::MalformedResponse("no image was returned".to_string()))?;

        Ok(GeneratedImage {
            mime_type: prediction.mime_type.unwrap_or(request.mime_type),
            base64_data: prediction.bytes_base64_encoded.unwrap_or_default(),
        })
    }

    async fn start_video(&self, request: VideoRequest) -> Result<VideoOperation, GenAiError> {
        let url = self.model_url(&request.model, "predictLongRunning");
        tracing::debug!(model = %request.model, "starting video operation");

        let body: OperationBody = self
            .post_json(&url, &video_body(&request))
            .await?
            .json()
            .await?;
        body.into_operation()
    }

    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoOperation, GenAiError> {
        let url = format!("{}/v1beta/{}", self.base_url, operation.name);
        let body: OperationBody = self.get(&url).await?.json().await?;
        body.into_operation()
    }

    async fn download_video(&self, uri: &str) -> Result<Vec<u8>, GenAiError> {
        tracing::debug!(uri, "downloading video");
        let bytes = self.get(uri).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn generate_speech(&self, request: SpeechRequest) -> Result<String, GenAiError> {
        let url = self.model_url(&request.model, "generateContent");
        tracing::debug!(model = %request.model, voice = %request.voice, "requesting speech");

        let chunk: StreamChunk = self
            .post_json(&url, &speech_body(&request))
            .await?
            .json()
            .await?;

        chunk
            .inline_data()
            .map(|data| data.data.clone())
            .ok_or_else(|| GenAiError::MalformedResponse("no audio was returned".to_string()))
    }
}

/// Turn a non-2xx response into `GenAiError::Api`, preferring the JSON
/// error message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GenAiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.error.message)
        .unwrap_or(text);

    tracing::warn!(status = %status, %message, "generative service returned an error");
    Err(GenAiError::Api {
        status: status.as_u16(),
        message,
    })
}

struct SseState {
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    finished: bool,
}

/// Decode an SSE byte stream into text fragments, in arrival order.
fn sse_text_stream(body: BoxStream<'static, reqwest::Result<Vec<u8>>>) -> TextStream {
    let state = SseState {
        body,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(payload) = state.pending.pop_front() {
                match decode_text_frame(&payload) {
                    Ok(text) if text.is_empty() => continue,
                    item => return Some((item, state)),
                }
            }

            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(bytes)) => {
                    let frames = state.decoder.push(&bytes);
                    state.pending.extend(frames);
                }
                Some(Err(err)) => {
                    state.finished = true;
                    state.pending.clear();
                    return Some((Err(GenAiError::Transport(err)), state));
                }
                None => {
                    state.finished = true;
                    let tail = state.decoder.finish();
                    state.pending.extend(tail);
                }
            }
        }
    })
    .boxed()
}

/// Text carried by one SSE frame; error frames become errors.
fn decode_text_frame(payload: &str) -> Result<String, GenAiError> {
    if let Ok(body) = serde_json::from_str::<ApiErrorBody>(payload) {
        return Err(GenAiError::Api {
            status: body.error.code,
            message: body.error.message,
        });
    }

    let chunk: StreamChunk = serde_json::from_str(payload)
        .map_err(|e| GenAiError::MalformedResponse(format!("invalid stream frame: {}", e)))?;

    if let Some(reason) = chunk.block_reason() {
        return Err(GenAiError::MalformedResponse(format!(
            "prompt was blocked: {}",
            reason
        )));
    }

    Ok(chunk.text())
}

fn text_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
    })
}

fn image_body(request: &ImageRequest) -> Value {
    json!({
        "instances": [{ "prompt": request.prompt }],
        "parameters": {
            "sampleCount": request.count,
            "aspectRatio": request.aspect_ratio,
            "outputOptions": { "mimeType": request.mime_type }
        }
    })
}

fn video_body(request: &VideoRequest) -> Value {
    json!({
        "instances": [{ "prompt": request.prompt }],
        "parameters": {
            "sampleCount": request.count,
            "aspectRatio": request.aspect_ratio,
            "resolution": request.resolution
        }
    })
}

fn speech_body(request: &SpeechRequest) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": request.text }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": request.voice } }
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationBody {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<ApiErrorDetail>,
    #[serde(default)]
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    #[serde(default)]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    #[serde(default)]
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    #[serde(default)]
    uri: Option<String>,
}

impl OperationBody {
    fn into_operation(self) -> Result<VideoOperation, GenAiError> {
        if let Some(error) = self.error {
            return Err(GenAiError::Operation(error.message));
        }

        let video_uri = self
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().find_map(|s| s.video))
            .and_then(|v| v.uri);

        if self.done && video_uri.is_none() {
            return Err(GenAiError::MalformedResponse(
                "finished video operation has no video".to_string(),
            ));
        }

        Ok(VideoOperation {
            name: self.name,
            done: self.done,
            video_uri,
        })
    }
}
