use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{MAX_WORKERS_CAP, MIN_AI_TEXT_LEN};
use crate::summary::SummaryType;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM summarization settings (OpenAI-compatible API)
    #[serde(default)]
    pub ai: AiConfig,
    /// Text extraction and OCR settings
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API key; falls back to OPENAI_API_KEY when unset
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// Chat completions endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens for short summaries
    #[serde(default = "default_short_max_tokens")]
    pub short_max_tokens: u32,
    /// Maximum tokens for medium and long summaries
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Cleaned text must be longer than this for the LLM to be used
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_ai_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            short_max_tokens: default_short_max_tokens(),
            max_tokens: default_max_tokens(),
            min_text_length: default_min_text_length(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AiConfig {
    /// Check if an API key is configured
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Worker threads for page extraction (None = CPU count). Capped at 8.
    #[serde(default)]
    pub max_workers: Option<usize>,
    /// Fall back to OCR for image-only PDFs
    #[serde(default = "default_true")]
    pub ocr: bool,
    #[serde(default = "default_ocr_dpi")]
    pub ocr_dpi: u32,
    /// Tesseract language code
    #[serde(default = "default_ocr_language")]
    pub ocr_language: String,
    /// Explicit tesseract binary (otherwise searched)
    #[serde(default)]
    pub tesseract_cmd: Option<PathBuf>,
    /// Explicit pdftoppm binary (otherwise searched)
    #[serde(default)]
    pub pdftoppm_cmd: Option<PathBuf>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            ocr: true,
            ocr_dpi: default_ocr_dpi(),
            ocr_language: default_ocr_language(),
            tesseract_cmd: None,
            pdftoppm_cmd: None,
        }
    }
}

impl ExtractConfig {
    /// Effective worker count: configured or CPU count, clamped to 1..=8
    pub fn workers(&self) -> usize {
        clamp_workers(self.max_workers.unwrap_or_else(num_cpus::get))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default)]
    pub default_type: SummaryType,
}

pub fn clamp_workers(n: usize) -> usize {
    n.clamp(1, MAX_WORKERS_CAP)
}

fn default_ai_model() -> String {
    "gpt-4o".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_short_max_tokens() -> u32 {
    800
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_min_text_length() -> usize {
    MIN_AI_TEXT_LEN
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_ocr_dpi() -> u32 {
    300
}

fn default_ocr_language() -> String {
    "eng".to_string()
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("mailsum");
        Ok(dir)
    }

    /// Config file path, honoring MAILSUM_CONFIG
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os("MAILSUM_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the config file if present, then apply environment fallbacks.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };

        config.apply_env(std::env::var("OPENAI_API_KEY").ok());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Fill the API key from the environment when the file has none
    fn apply_env(&mut self, env_key: Option<String>) {
        if !self.ai.is_enabled()
            && let Some(key) = env_key.filter(|k| !k.trim().is_empty())
        {
            self.ai.api_key = Some(key);
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create config directory: {}", dir.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
