//! Briefing generation command: `daybrief generate`.

use anyhow::{Context, Result};
use daybrief::briefing::{Action, BriefingEvent, BriefingOrchestrator, MediaItem, Store};
use daybrief::config::DaybriefConfig;
use daybrief::genai::GeminiClient;
use daybrief::services::ServiceKey;
use daybrief::ui::BriefingUI;
use daybrief::util::DataUri;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use super::credentials::PromptCredentials;
use crate::Cli;

pub struct GenerateOptions {
    pub services: Vec<ServiceKey>,
    pub no_media: bool,
    pub media_dir: Option<PathBuf>,
    pub raw: bool,
    pub model: Option<String>,
}

/// Render store events on their own task until the store is dropped.
pub(crate) fn spawn_renderer(
    mut ui: BriefingUI,
    mut events: UnboundedReceiver<BriefingEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            ui.handle(&event);
        }
    })
}

pub async fn cmd_generate(cli: &Cli, project_dir: PathBuf, options: GenerateOptions) -> Result<()> {
    let mut config = DaybriefConfig::with_cli_args(project_dir, cli.verbose, cli.yes)?;
    config.cli_text_model = options.model.clone();
    if options.no_media {
        config.cli_media_enabled = Some(false);
    }
    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    let api_key = config.api_key();
    let backend = Arc::new(GeminiClient::new(config.base_url(), api_key.clone()));
    let interactive = !cli.yes && console::user_attended();
    let ui = BriefingUI::new(cli.verbose, options.raw);
    let credentials = PromptCredentials::new(api_key, interactive).with_progress(ui.progress());
    let orchestrator = BriefingOrchestrator::new(backend, config.generation_settings())
        .with_credentials(Arc::new(credentials));

    let (mut store, events) = Store::channel();
    for service in &options.services {
        if !store.state().connected.contains(service) {
            store.dispatch(Action::ToggleService(*service));
        }
    }
    let renderer = spawn_renderer(ui, events);

    let services = store.state().connected.clone();
    let result = orchestrator.generate_briefing(&mut store, &services).await;
    let media = store.state().media.clone();
    drop(store);
    renderer.await.context("Briefing renderer task failed")?;

    if let Err(err) = result {
        anyhow::bail!("{}", err.user_message());
    }

    if let Some(dir) = &options.media_dir {
        let saved = save_media(dir, &media)?;
        println!("Saved {} media file(s) to {}", saved, dir.display());
    }

    Ok(())
}

/// Write every finished media item into `dir`. Returns how many were written.
fn save_media(dir: &Path, media: &[MediaItem]) -> Result<usize> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create media directory {}", dir.display()))?;

    let mut saved = 0;
    for (index, item) in media.iter().enumerate() {
        let Some(data) = item.url.as_deref().and_then(DataUri::parse) else {
            continue;
        };
        let path = dir.join(format!(
            "{:02}-{}-{}.{}",
            index + 1,
            item.service,
            item.kind,
            data.extension()
        ));
        std::fs::write(&path, &data.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        saved += 1;
    }
    Ok(saved)
}
