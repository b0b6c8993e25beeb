//! Concurrent media generation for the prompts of a finished briefing.
//!
//! One future per prompt, all driven on the caller's task. Each item
//! settles on its own; a failure never cancels its siblings. When the video
//! service reports a missing entity the credential gate is raised, and once
//! the batch has settled the user gets a single chance to select another key
//! before the whole batch is re-run.

use super::GenerationSettings;
use super::credentials::CredentialProvider;
use super::store::{Action, MediaItem, Store};
use crate::audio::{WavSpec, pcm_to_wav};
use crate::errors::GenAiError;
use crate::genai::GenerativeBackend;
use crate::markup::{MediaKind, MediaPrompt};
use crate::util::{data_uri, data_uri_from_base64};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::sync::Arc;

const VIDEO_MIME: &str = "video/mp4";
const AUDIO_MIME: &str = "audio/wav";

/// Runs the queued media prompts of a [`Store`].
pub struct MediaFanOut {
    backend: Arc<dyn GenerativeBackend>,
    credentials: Arc<dyn CredentialProvider>,
    settings: GenerationSettings,
}

impl MediaFanOut {
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        credentials: Arc<dyn CredentialProvider>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            backend,
            credentials,
            settings,
        }
    }

    /// Generate every queued prompt and return the settled items.
    ///
    /// The queue is consumed: it is empty afterwards whatever the outcome.
    pub async fn run(&self, store: &mut Store) -> Vec<MediaItem> {
        let prompts = store.state().media_prompts.clone();
        if prompts.is_empty() {
            store.dispatch(Action::MediaFinished);
            return Vec::new();
        }

        tracing::info!(items = prompts.len(), "starting media fan-out");
        let mut rerun_used = false;
        loop {
            let blocked = self.run_batch(store, &prompts).await;
            if !blocked || !store.state().needs_credential_selection || rerun_used {
                break;
            }

            rerun_used = true;
            if !self.credentials.ensure_selected().await {
                tracing::info!("no credential selected, media batch not re-run");
                break;
            }
            store.dispatch(Action::CredentialSelected);
            tracing::info!("credential selected, re-running media batch");
        }

        store.dispatch(Action::MediaFinished);
        store.state().media.clone()
    }

    /// Run one batch. Returns whether any item was blocked on the credential.
    async fn run_batch(&self, store: &mut Store, prompts: &[MediaPrompt]) -> bool {
        store.dispatch(Action::MediaStarted(
            prompts.iter().map(MediaItem::loading).collect(),
        ));
        let gate_raised = store.state().needs_credential_selection;

        let mut pending: FuturesUnordered<_> = prompts
            .iter()
            .enumerate()
            .map(|(index, prompt)| async move { (index, self.generate(prompt, gate_raised).await) })
            .collect();

        let mut blocked = false;
        while let Some((index, result)) = pending.next().await {
            let result = match result {
                Ok(url) => {
                    tracing::debug!(index, "media item done");
                    Ok(url)
                }
                Err(err) => {
                    if err.is_missing_entity() {
                        store.dispatch(Action::CredentialSelectionRequired);
                        blocked = true;
                    } else if matches!(err, GenAiError::CredentialSelectionRequired) {
                        blocked = true;
                    }
                    tracing::warn!(index, error = %err, "media item failed");
                    Err(err.to_string())
                }
            };
            store.dispatch(Action::MediaSettled { index, result });
        }

        blocked
    }

    async fn generate(&self, prompt: &MediaPrompt, gate_raised: bool) -> Result<String, GenAiError> {
        match prompt.kind {
            MediaKind::Image => self.generate_image(&prompt.prompt).await,
            MediaKind::Video if gate_raised => Err(GenAiError::CredentialSelectionRequired),
            MediaKind::Video => self.generate_video(&prompt.prompt).await,
            MediaKind::Audio => self.generate_audio(&prompt.prompt).await,
        }
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, GenAiError> {
        let image = self
            .backend
            .generate_image(self.settings.image.with_prompt(prompt))
            .await?;
        Ok(data_uri_from_base64(&image.mime_type, &image.base64_data))
    }

    /// Start the operation, poll until done or out of attempts, then fetch.
    async fn generate_video(&self, prompt: &str) -> Result<String, GenAiError> {
        let mut operation = self
            .backend
            .start_video(self.settings.video.with_prompt(prompt))
            .await?;

        let mut attempts = 0;
        while !operation.done {
            if attempts >= self.settings.max_poll_attempts {
                return Err(GenAiError::VideoTimeout { attempts });
            }
            tokio::time::sleep(self.settings.poll_interval).await;
            operation = self.backend.poll_video(&operation).await?;
            attempts += 1;
            tracing::debug!(operation = %operation.name, attempts, done = operation.done, "video status");
        }

        let uri = operation.video_uri.ok_or_else(|| {
            GenAiError::MalformedResponse("finished video operation has no video".to_string())
        })?;
        let bytes = self.backend.download_video(&uri).await?;
        Ok(data_uri(VIDEO_MIME, &bytes))
    }

    async fn generate_audio(&self, text: &str) -> Result<String, GenAiError> {
        let pcm_b64 = self
            .backend
            .generate_speech(self.settings.speech.with_text(text))
            .await?;
        let pcm = BASE64.decode(pcm_b64.trim())?;
        let wav = pcm_to_wav(&pcm, WavSpec::mono16(self.settings.sample_rate));
        Ok(data_uri(AUDIO_MIME, &wav))
    }
}
