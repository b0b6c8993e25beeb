//! End of day coaching command: `daybrief coach`.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use daybrief::audio::{WavHeader, WavSpec, default_output, pcm_to_wav};
use daybrief::briefing::{CoachingRequester, Store, play_session};
use daybrief::config::DaybriefConfig;
use daybrief::errors::AudioError;
use daybrief::genai::GeminiClient;
use daybrief::ui::BriefingUI;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::generate::spawn_renderer;
use crate::Cli;

pub async fn cmd_coach(
    cli: &Cli,
    project_dir: PathBuf,
    save_audio: Option<&Path>,
    no_playback: bool,
) -> Result<()> {
    let config = DaybriefConfig::with_cli_args(project_dir, cli.verbose, cli.yes)?;
    let settings = config.generation_settings();
    let backend = Arc::new(GeminiClient::new(config.base_url(), config.api_key()));
    let requester = CoachingRequester::new(backend, settings.clone());

    let (mut store, events) = Store::channel();
    let renderer = spawn_renderer(BriefingUI::new(cli.verbose, false), events);
    let result = requester.run(&mut store).await;
    drop(store);
    renderer.await.context("Coaching renderer task failed")?;

    let session = result.context("Failed to prepare the coaching session")?;

    if let Some(path) = save_audio {
        let pcm = BASE64
            .decode(session.audio_b64.trim())
            .context("Speech audio was not valid base64")?;
        let wav = pcm_to_wav(&pcm, WavSpec::mono16(settings.sample_rate));
        let duration = WavHeader::parse(&wav)
            .map(|header| header.duration_secs())
            .unwrap_or_default();
        std::fs::write(path, &wav)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "Saved {:.1}s of coaching audio to {}",
            duration,
            path.display()
        );
    }

    if no_playback {
        return Ok(());
    }

    match default_output() {
        Ok(output) => {
            let guard = play_session(&session, settings.sample_rate, output.as_ref())?;
            tokio::select! {
                _ = guard.wait() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("playback interrupted");
                }
            }
        }
        Err(AudioError::Unavailable) => {
            println!("Audio playback is not available in this build; use --save-audio to keep the session.");
        }
        Err(err) => return Err(err).context("Failed to open the audio output"),
    }

    Ok(())
}
