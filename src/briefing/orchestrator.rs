//! Streams one briefing from the text model into the store.

use super::credentials::{CredentialProvider, DenyCredentials};
use super::fanout::MediaFanOut;
use super::store::{Action, Store};
use super::GenerationSettings;
use crate::errors::{BriefingError, GenAiError};
use crate::genai::{GenerativeBackend, TextRequest};
use crate::markup::ParsedBriefing;
use crate::prompt::build_prompt;
use crate::services::ServiceKey;
use futures::StreamExt;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Drives generations: prompt, text stream, then optionally media.
pub struct BriefingOrchestrator {
    backend: Arc<dyn GenerativeBackend>,
    credentials: Arc<dyn CredentialProvider>,
    settings: GenerationSettings,
}

impl BriefingOrchestrator {
    pub fn new(backend: Arc<dyn GenerativeBackend>, settings: GenerationSettings) -> Self {
        Self {
            backend,
            credentials: Arc::new(DenyCredentials),
            settings,
        }
    }

    /// Use `provider` when video generation needs a different credential.
    pub fn with_credentials(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = provider;
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Fan-out controller sharing this orchestrator's backend and settings.
    pub fn media_fan_out(&self) -> MediaFanOut {
        MediaFanOut::new(
            self.backend.clone(),
            self.credentials.clone(),
            self.settings.clone(),
        )
    }

    /// Stream a briefing for `services` into `store`.
    ///
    /// Every fragment is dispatched as it arrives, so the parsed view in the
    /// store grows while the stream is open. Returns the final parsed view.
    pub async fn start_generation(
        &self,
        store: &mut Store,
        services: &BTreeSet<ServiceKey>,
    ) -> Result<ParsedBriefing, BriefingError> {
        if services.is_empty() {
            let err = BriefingError::NoServices;
            store.dispatch(Action::ValidationFailed(err.user_message()));
            return Err(err);
        }
        if store.state().loading {
            return Err(BriefingError::AlreadyRunning);
        }

        let span = tracing::info_span!(
            "generation",
            id = %Uuid::new_v4(),
            services = services.len()
        );

        async {
            store.dispatch(Action::GenerationStarted {
                services: services.clone(),
            });

            let request = TextRequest {
                model: self.settings.text_model.clone(),
                prompt: build_prompt(services, self.settings.include_media),
            };

            match self.consume_stream(store, request).await {
                Ok(chunks) => {
                    store.dispatch(Action::StreamCompleted);
                    let parsed = store.state().parsed.clone();
                    tracing::info!(chunks, parsed = %parsed.summary(), "briefing stream complete");
                    Ok(parsed)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "briefing stream failed");
                    let err = BriefingError::Generation(err);
                    store.dispatch(Action::GenerationFailed(err.user_message()));
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Stream a briefing, then fan out its media prompts if media is enabled.
    pub async fn generate_briefing(
        &self,
        store: &mut Store,
        services: &BTreeSet<ServiceKey>,
    ) -> Result<ParsedBriefing, BriefingError> {
        let parsed = self.start_generation(store, services).await?;
        if self.settings.include_media {
            self.media_fan_out().run(store).await;
        }
        Ok(parsed)
    }

    async fn consume_stream(
        &self,
        store: &mut Store,
        request: TextRequest,
    ) -> Result<usize, GenAiError> {
        let mut stream = self.backend.stream_text(request).await?;
        let mut chunks = 0usize;

        while let Some(fragment) = stream.next().await {
            store.dispatch(Action::ChunkReceived(fragment?));
            chunks += 1;
            tracing::trace!(chunks, "chunk applied");
        }

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::briefing::store::{BriefingEvent, MediaStatus};
    use crate::briefing::test_settings;
    use crate::genai::testing::{ScriptedBackend, server_error};

    fn services(keys: &[ServiceKey]) -> BTreeSet<ServiceKey> {
        keys.iter().copied().collect()
    }

    fn orchestrator(backend: &Arc<ScriptedBackend>) -> BriefingOrchestrator {
        BriefingOrchestrator::new(backend.clone(), test_settings())
    }

    #[tokio::test]
    async fn test_streams_example_briefing() {
        let backend = Arc::new(ScriptedBackend::new().with_chunks(&[
            "BRIEFING_START Today is ",
            "busy. BRIEFING_END PLAN_ITEM: Call Bob ",
            "PLAN_ITEM: Review doc",
        ]));
        let mut store = Store::new();

        let parsed = orchestrator(&backend)
            .start_generation(&mut store, &services(&[ServiceKey::Gmail]))
            .await
            .unwrap();

        assert_eq!(parsed.briefing, "Today is busy.");
        assert_eq!(parsed.plan, vec!["Call Bob", "Review doc"]);
        assert!(parsed.calendar.is_empty());

        let state = store.state();
        assert!(!state.loading);
        assert!(state.stream_complete);
        assert!(state.error.is_none());
        assert_eq!(
            state.response,
            "BRIEFING_START Today is busy. BRIEFING_END PLAN_ITEM: Call Bob PLAN_ITEM: Review doc"
        );
        assert_eq!(backend.call_count("text"), 1);
    }

    #[tokio::test]
    async fn test_briefing_revealed_before_stream_ends() {
        let backend = Arc::new(ScriptedBackend::new().with_chunks(&[
            "BRIEFING_START Quiet morning. BRIEFING_END\n",
            "PLAN_ITEM: Reply to Ann\n",
            "PLAN_ITEM: Ship it\n",
        ]));
        let (mut store, mut rx) = Store::channel();

        orchestrator(&backend)
            .start_generation(&mut store, &services(&[ServiceKey::Gmail]))
            .await
            .unwrap();
        drop(store);

        let mut updates = Vec::new();
        while let Some(event) = rx.recv().await {
            if let BriefingEvent::BriefingUpdated { parsed, .. } = event {
                updates.push(parsed);
            }
        }
        assert_eq!(updates.len(), 3);
        assert!(updates[0].briefing_closed);
        assert_eq!(updates[0].briefing, "Quiet morning.");
        assert_eq!(updates[1].plan, vec!["Reply to Ann"]);
        assert_eq!(updates[2].plan, vec!["Reply to Ann", "Ship it"]);
    }

    #[tokio::test]
    async fn test_no_services_is_rejected_without_request() {
        let backend = Arc::new(ScriptedBackend::new());
        let mut store = Store::new();

        let err = orchestrator(&backend)
            .start_generation(&mut store, &BTreeSet::new())
            .await
            .unwrap_err();

        assert!(matches!(err, BriefingError::NoServices));
        assert_eq!(
            store.state().error.as_deref(),
            Some("Please connect at least one service to generate a briefing.")
        );
        assert!(!store.state().loading);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_double_trigger_is_rejected() {
        let backend = Arc::new(ScriptedBackend::new().with_chunks(&["BRIEFING_START x"]));
        let mut store = Store::new();
        store.dispatch(Action::GenerationStarted {
            services: services(&[ServiceKey::Gmail]),
        });
        store.dispatch(Action::ChunkReceived("BRIEFING_START in flight".to_string()));

        let err = orchestrator(&backend)
            .start_generation(&mut store, &services(&[ServiceKey::Gmail]))
            .await
            .unwrap_err();

        assert!(matches!(err, BriefingError::AlreadyRunning));
        assert_eq!(store.state().response, "BRIEFING_START in flight");
        assert_eq!(backend.call_count("text"), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_message() {
        let backend = Arc::new(ScriptedBackend::new().fail_open(|| {
            GenAiError::MissingCredential {
                env_var: "API_KEY".to_string(),
            }
        }));
        let mut store = Store::new();

        let err = orchestrator(&backend)
            .start_generation(&mut store, &services(&[ServiceKey::Gmail]))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "API_KEY environment variable is not set.");
        assert_eq!(
            store.state().error.as_deref(),
            Some("API_KEY environment variable is not set.")
        );
        assert!(!store.state().loading);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_keeps_partial_content() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .with_chunks(&["BRIEFING_START Partial ", "news", "never seen"])
                .fail_after(2, server_error),
        );
        let mut store = Store::new();

        let err = orchestrator(&backend)
            .start_generation(&mut store, &services(&[ServiceKey::Techcrunch]))
            .await
            .unwrap_err();

        assert!(matches!(err, BriefingError::Generation(GenAiError::Api { .. })));
        let state = store.state();
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to generate daily briefing. Please check your API key and try again.")
        );
        assert_eq!(state.response, "BRIEFING_START Partial news");
        assert_eq!(state.parsed.briefing, "Partial news");
        assert!(!state.stream_complete);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_calendar_only_parsed_when_connected() {
        let chunks = [
            "BRIEFING_START Day BRIEFING_END\n",
            "CALENDAR_ITEM: 09:00 - 10:00 | Standup | Daily sync\n",
        ];

        let backend = Arc::new(ScriptedBackend::new().with_chunks(&chunks));
        let mut store = Store::new();
        let parsed = orchestrator(&backend)
            .start_generation(&mut store, &services(&[ServiceKey::Gmail]))
            .await
            .unwrap();
        assert!(parsed.calendar.is_empty());

        let mut store = Store::new();
        let parsed = orchestrator(&backend)
            .start_generation(&mut store, &services(&[ServiceKey::Calendar]))
            .await
            .unwrap();
        assert_eq!(parsed.calendar.len(), 1);
        assert_eq!(parsed.calendar[0].title, "Standup");
    }

    #[tokio::test]
    async fn test_generate_briefing_fans_out_media() {
        let backend = Arc::new(ScriptedBackend::new().with_chunks(&[
            "BRIEFING_START Hi BRIEFING_END\n",
            "MEDIA_PROMPT::instagram::image::A beach\n",
            "MEDIA_PROMPT::gmail::audio::Good morning\n",
        ]));
        let mut store = Store::new();

        orchestrator(&backend)
            .generate_briefing(
                &mut store,
                &services(&[ServiceKey::Instagram, ServiceKey::Gmail]),
            )
            .await
            .unwrap();

        let state = store.state();
        assert_eq!(state.media.len(), 2);
        assert!(state.media.iter().all(|m| m.status == MediaStatus::Done));
        assert!(state.media_prompts.is_empty());
        assert!(!state.media_active);
    }

    #[tokio::test]
    async fn test_generate_briefing_without_media() {
        let backend = Arc::new(
            ScriptedBackend::new().with_chunks(&["MEDIA_PROMPT::instagram::image::A beach\n"]),
        );
        let mut settings = test_settings();
        settings.include_media = false;
        let mut store = Store::new();

        BriefingOrchestrator::new(backend.clone(), settings)
            .generate_briefing(&mut store, &services(&[ServiceKey::Instagram]))
            .await
            .unwrap();

        assert!(store.state().media.is_empty());
        assert_eq!(backend.call_count("image"), 0);
    }
}
