//! Unified configuration for daybrief.
//!
//! Settings are read from `.daybrief/daybrief.toml` and layered
//! (file → environment → CLI). Every key is optional.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "https://generativelanguage.googleapis.com"
//! key_env = "API_KEY"
//!
//! [models]
//! text = "gemini-2.5-flash"
//! image = "imagen-4.0-generate-001"
//! video = "veo-3.1-fast-generate-preview"
//! speech = "gemini-2.5-flash-preview-tts"
//!
//! [image]
//! mime_type = "image/jpeg"
//! aspect_ratio = "16:9"
//!
//! [video]
//! resolution = "720p"
//! aspect_ratio = "16:9"
//! poll_interval_secs = 10
//! max_poll_attempts = 60
//!
//! [speech]
//! voice = "Kore"
//! sample_rate = 24000
//!
//! [media]
//! enabled = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::briefing::GenerationSettings;
use crate::genai::{ApiKey, ImageRequest, SpeechRequest, VideoRequest};

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".daybrief";

/// Name of the configuration file inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "daybrief.toml";

/// Environment variable consulted when the configured key variable is unset.
pub const FALLBACK_KEY_ENV: &str = "GEMINI_API_KEY";

/// Highest speech sample rate accepted without a warning.
pub const MAX_SAMPLE_RATE: u32 = 384_000;

/// API endpoint and credential settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    /// Base URL of the Gemini REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key
    #[serde(default = "default_key_env")]
    pub key_env: String,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_key_env() -> String {
    "API_KEY".to_string()
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            key_env: default_key_env(),
        }
    }
}

/// Model identifiers per generation kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsSection {
    #[serde(default = "default_text_model")]
    pub text: String,
    #[serde(default = "default_image_model")]
    pub image: String,
    #[serde(default = "default_video_model")]
    pub video: String,
    #[serde(default = "default_speech_model")]
    pub speech: String,
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "imagen-4.0-generate-001".to_string()
}

fn default_video_model() -> String {
    "veo-3.1-fast-generate-preview".to_string()
}

fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

impl Default for ModelsSection {
    fn default() -> Self {
        Self {
            text: default_text_model(),
            image: default_image_model(),
            video: default_video_model(),
            speech: default_speech_model(),
        }
    }
}

/// Image generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSection {
    #[serde(default = "default_image_mime_type")]
    pub mime_type: String,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
}

fn default_image_mime_type() -> String {
    "image/jpeg".to_string()
}

fn default_aspect_ratio() -> String {
    "16:9".to_string()
}

impl Default for ImageSection {
    fn default() -> Self {
        Self {
            mime_type: default_image_mime_type(),
            aspect_ratio: default_aspect_ratio(),
        }
    }
}

/// Video generation and polling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSection {
    #[serde(default = "default_resolution")]
    pub resolution: String,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    /// Seconds between operation status checks
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Status checks before giving up with a timeout
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_resolution() -> String {
    "720p".to_string()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_max_poll_attempts() -> u32 {
    60
}

impl Default for VideoSection {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            aspect_ratio: default_aspect_ratio(),
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

/// Speech (TTS) parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSection {
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Sample rate of the raw PCM the speech model returns
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_voice() -> String {
    "Kore".to_string()
}

fn default_sample_rate() -> u32 {
    24_000
}

impl Default for SpeechSection {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            sample_rate: default_sample_rate(),
        }
    }
}

/// Media fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSection {
    /// Ask the model for media prompts and generate them after the stream
    #[serde(default = "default_media_enabled")]
    pub enabled: bool,
}

fn default_media_enabled() -> bool {
    true
}

impl Default for MediaSection {
    fn default() -> Self {
        Self {
            enabled: default_media_enabled(),
        }
    }
}

/// Root of `daybrief.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaybriefToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub models: ModelsSection,
    #[serde(default)]
    pub image: ImageSection,
    #[serde(default)]
    pub video: VideoSection,
    #[serde(default)]
    pub speech: SpeechSection,
    #[serde(default)]
    pub media: MediaSection,
}

impl DaybriefToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse daybrief.toml")
    }

    /// Load configuration from `<dir>/daybrief.toml`.
    /// Returns default configuration if the file doesn't exist.
    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize daybrief.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for (name, value) in [
            ("models.text", &self.models.text),
            ("models.image", &self.models.image),
            ("models.video", &self.models.video),
            ("models.speech", &self.models.speech),
            ("api.key_env", &self.api.key_env),
        ] {
            if value.trim().is_empty() {
                warnings.push(format!("{} is empty", name));
            }
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            warnings.push(format!(
                "Invalid api.base_url '{}': should start with http:// or https://",
                self.api.base_url
            ));
        }

        if self.video.poll_interval_secs == 0 {
            warnings.push("video.poll_interval_secs is 0: status checks will not wait".to_string());
        }

        if self.video.max_poll_attempts == 0 {
            warnings.push(
                "video.max_poll_attempts is 0: every video will time out immediately".to_string(),
            );
        }

        if !matches!(self.video.resolution.as_str(), "720p" | "1080p") {
            warnings.push(format!(
                "Unknown video.resolution '{}': expected 720p or 1080p",
                self.video.resolution
            ));
        }

        if self.speech.sample_rate == 0 {
            warnings.push("speech.sample_rate is 0".to_string());
        } else if self.speech.sample_rate > MAX_SAMPLE_RATE {
            warnings.push(format!(
                "speech.sample_rate {} is above {} Hz",
                self.speech.sample_rate, MAX_SAMPLE_RATE
            ));
        }

        warnings
    }
}

/// Configuration that combines `DaybriefToml` with environment and CLI
/// overrides.
#[derive(Debug, Clone)]
pub struct DaybriefConfig {
    /// Path to the project directory
    pub project_dir: PathBuf,
    /// Path to the .daybrief directory
    pub config_dir: PathBuf,
    /// Parsed daybrief.toml
    pub toml: DaybriefToml,
    /// CLI override: verbose mode
    pub verbose: bool,
    /// CLI override: never prompt
    pub yes: bool,
    /// CLI override for the text model
    pub cli_text_model: Option<String>,
    /// CLI override for media generation
    pub cli_media_enabled: Option<bool>,
}

impl DaybriefConfig {
    /// Create a config from a project directory.
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let config_dir = project_dir.join(CONFIG_DIR);
        let toml = DaybriefToml::load_or_default(&config_dir)?;

        Ok(Self {
            project_dir,
            config_dir,
            toml,
            verbose: false,
            yes: false,
            cli_text_model: None,
            cli_media_enabled: None,
        })
    }

    /// Create a config with CLI overrides.
    pub fn with_cli_args(project_dir: PathBuf, verbose: bool, yes: bool) -> Result<Self> {
        let mut config = Self::new(project_dir)?;
        config.verbose = verbose;
        config.yes = yes;
        Ok(config)
    }

    /// Path to daybrief.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Base URL (env → file).
    pub fn base_url(&self) -> String {
        self.base_url_from(|name| std::env::var(name).ok())
    }

    fn base_url_from(&self, env: impl Fn(&str) -> Option<String>) -> String {
        env("DAYBRIEF_BASE_URL").unwrap_or_else(|| self.toml.api.base_url.clone())
    }

    /// Text model (CLI → env → file).
    pub fn text_model(&self) -> String {
        self.text_model_from(|name| std::env::var(name).ok())
    }

    fn text_model_from(&self, env: impl Fn(&str) -> Option<String>) -> String {
        self.cli_text_model
            .clone()
            .or_else(|| env("DAYBRIEF_TEXT_MODEL"))
            .unwrap_or_else(|| self.toml.models.text.clone())
    }

    /// Whether media prompts are requested and generated (CLI → file).
    pub fn media_enabled(&self) -> bool {
        self.cli_media_enabled.unwrap_or(self.toml.media.enabled)
    }

    /// Credential handle reading the configured variable, then the fallback.
    pub fn api_key(&self) -> ApiKey {
        let mut vars = vec![self.toml.api.key_env.clone()];
        if self.toml.api.key_env != FALLBACK_KEY_ENV {
            vars.push(FALLBACK_KEY_ENV.to_string());
        }
        ApiKey::from_env(vars)
    }

    /// Resolve per-request generation parameters.
    pub fn generation_settings(&self) -> GenerationSettings {
        let toml = &self.toml;
        GenerationSettings {
            text_model: self.text_model(),
            image: ImageRequest {
                model: toml.models.image.clone(),
                prompt: String::new(),
                count: 1,
                mime_type: toml.image.mime_type.clone(),
                aspect_ratio: toml.image.aspect_ratio.clone(),
            },
            video: VideoRequest {
                model: toml.models.video.clone(),
                prompt: String::new(),
                count: 1,
                resolution: toml.video.resolution.clone(),
                aspect_ratio: toml.video.aspect_ratio.clone(),
            },
            speech: SpeechRequest {
                model: toml.models.speech.clone(),
                text: String::new(),
                voice: toml.speech.voice.clone(),
            },
            sample_rate: toml.speech.sample_rate,
            poll_interval: Duration::from_secs(toml.video.poll_interval_secs),
            max_poll_attempts: toml.video.max_poll_attempts,
            include_media: self.media_enabled(),
        }
    }

    /// Validate configuration and return warnings.
    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}
