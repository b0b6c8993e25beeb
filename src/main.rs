use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use daybrief::services::ServiceKey;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "daybrief")]
#[command(version, about = "Streamed AI daily briefings with generated media")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Never prompt; decline any interactive step
    #[arg(long, global = true)]
    pub yes: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a daily briefing for the given services
    Generate {
        /// Connected service (repeatable, or comma-separated)
        #[arg(short, long = "service", value_delimiter = ',')]
        services: Vec<ServiceKey>,

        /// Skip media prompts and media generation
        #[arg(long)]
        no_media: bool,

        /// Save generated media into this directory
        #[arg(long)]
        media_dir: Option<PathBuf>,

        /// Print the raw model output instead of cards
        #[arg(long)]
        raw: bool,

        /// Override the text model
        #[arg(long, env = "DAYBRIEF_TEXT_MODEL")]
        model: Option<String>,
    },
    /// Run the end of day coaching session
    Coach {
        /// Write the spoken session to a WAV file
        #[arg(long)]
        save_audio: Option<PathBuf>,

        /// Do not play the audio
        #[arg(long)]
        no_playback: bool,
    },
    /// List the services a briefing can be generated from
    Services,
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default daybrief.toml file
    Init,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "daybrief=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env feeds both RUST_LOG and clap's env fallbacks
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Generate {
            services,
            no_media,
            media_dir,
            raw,
            model,
        } => {
            let options = cmd::GenerateOptions {
                services: services.clone(),
                no_media: *no_media,
                media_dir: media_dir.clone(),
                raw: *raw,
                model: model.clone(),
            };
            cmd::cmd_generate(&cli, project_dir, options).await?;
        }
        Commands::Coach {
            save_audio,
            no_playback,
        } => {
            cmd::cmd_coach(&cli, project_dir, save_audio.as_deref(), *no_playback).await?;
        }
        Commands::Services => cmd::cmd_services(),
        Commands::Config { command } => cmd::cmd_config(&project_dir, command.clone())?,
    }

    Ok(())
}
