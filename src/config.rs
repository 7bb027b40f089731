//! Run configuration loaded from `config.json`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const EXPECTED_FORMAT: &str = r#"The format is {"api_key": "your_key"}"#;

/// Settings for one run. Only `api_key` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_key: String,
    #[serde(default)]
    pub print_to_console: bool,
    #[serde(default)]
    pub mock_calls: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_max_reply_tokens")]
    pub max_reply_tokens: u32,
    /// Longest code fragment sent to the provider, in characters. 0 disables
    /// truncation.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    #[serde(default)]
    pub debug_log: Option<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("documented")
}

fn default_model() -> String {
    "gpt-3.5-turbo-instruct".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_reply_tokens() -> u32 {
    700
}

fn default_max_input_chars() -> usize {
    12_000
}

impl Config {
    /// Parse and validate configuration text.
    pub fn parse(raw: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(raw)
            .with_context(|| format!("invalid configuration. {}", EXPECTED_FORMAT))?;
        if config.api_key.trim().is_empty() {
            bail!("api_key is empty. {}", EXPECTED_FORMAT);
        }
        Ok(config)
    }
}

/// Load the configuration file at `path`.
pub fn load(path: &Path) -> Result<Config> {
    if !path.is_file() {
        bail!(
            "please add your API key to the file {}. {}",
            path.display(),
            EXPECTED_FORMAT
        );
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Config::parse(&raw).with_context(|| format!("bad configuration in {}", path.display()))
}
