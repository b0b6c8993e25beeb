//! Interactive API key selection for the media credential gate.

use async_trait::async_trait;
use daybrief::briefing::CredentialProvider;
use daybrief::genai::ApiKey;
use dialoguer::{Password, theme::ColorfulTheme};
use indicatif::MultiProgress;

/// Prompts for a replacement key and installs it into the shared handle.
pub struct PromptCredentials {
    api_key: ApiKey,
    interactive: bool,
    progress: Option<MultiProgress>,
}

impl PromptCredentials {
    /// With `interactive == false` every request is declined.
    pub fn new(api_key: ApiKey, interactive: bool) -> Self {
        Self {
            api_key,
            interactive,
            progress: None,
        }
    }

    /// Hide these bars while the prompt is on screen.
    pub fn with_progress(mut self, progress: MultiProgress) -> Self {
        self.progress = Some(progress);
        self
    }
}

#[async_trait]
impl CredentialProvider for PromptCredentials {
    async fn ensure_selected(&self) -> bool {
        if !self.interactive {
            return false;
        }

        let progress = self.progress.clone();
        let prompt = tokio::task::spawn_blocking(move || {
            let ask = || {
                Password::with_theme(&ColorfulTheme::default())
                    .with_prompt("Enter an API key with access to the video model (empty to skip)")
                    .allow_empty_password(true)
                    .interact()
            };
            match progress {
                Some(progress) => progress.suspend(ask),
                None => ask(),
            }
        })
        .await;

        match prompt {
            Ok(Ok(key)) if !key.trim().is_empty() => {
                self.api_key.install(key.trim());
                tracing::info!("installed replacement API key");
                true
            }
            Ok(Ok(_)) => false,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "credential prompt failed");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "credential prompt task failed");
                false
            }
        }
    }
}
