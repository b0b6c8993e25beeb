//! Configuration view and validation commands: `daybrief config`.

use anyhow::Result;
use daybrief::config::{CONFIG_DIR, CONFIG_FILE, DaybriefConfig, DaybriefToml};
use std::path::Path;

use super::super::ConfigCommands;

fn print_effective(config: &DaybriefConfig) {
    let settings = config.generation_settings();
    println!("Effective values (with env/CLI overrides):");
    println!("  base_url = \"{}\"", config.base_url());
    println!("  text_model = \"{}\"", settings.text_model);
    println!("  image_model = \"{}\"", settings.image.model);
    println!("  video_model = \"{}\"", settings.video.model);
    println!("  speech_model = \"{}\"", settings.speech.model);
    println!("  voice = \"{}\"", settings.speech.voice);
    println!(
        "  video polling = every {}s, up to {} checks",
        settings.poll_interval.as_secs(),
        settings.max_poll_attempts
    );
    println!("  media = {}", settings.include_media);
    println!(
        "  api key = {}",
        if config.api_key().is_set() { "set" } else { "not set" }
    );
    println!();
}

pub fn cmd_config(project_dir: &Path, command: Option<ConfigCommands>) -> Result<()> {
    let config_dir = project_dir.join(CONFIG_DIR);
    let config_path = config_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Daybrief Configuration");
            println!("======================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No daybrief.toml found at {}", config_path.display());
                println!("Run 'daybrief config init' to create one.");
            }
            println!();

            let config = DaybriefConfig::new(project_dir.to_path_buf())?;
            print_effective(&config);
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No daybrief.toml found. Using defaults (valid).");
                return Ok(());
            }

            let warnings = DaybriefToml::load(&config_path)?.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("daybrief.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            std::fs::create_dir_all(&config_dir)?;
            DaybriefToml::default().save(&config_path)?;

            println!("Created daybrief.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [models] text, image, video, speech");
            println!("  - [video] poll_interval_secs, max_poll_attempts");
            println!("  - [speech] voice, sample_rate");
            println!();
        }
    }

    Ok(())
}
