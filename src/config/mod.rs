//! Configuration system (layered: code > env > config file > defaults).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::assembler::DEFAULT_MODEL;
use crate::error::{ExamusError, Result};
use crate::persona::SYSTEM_PROMPT;
use crate::provider::ollama::DEFAULT_BASE_URL;
use crate::storage::default_data_dir;
use crate::types::{ContextMode, FramingMode, GenerationSettings};

/// Name of the optional config file inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolved configuration for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamusConfig {
    pub base_url: String,
    pub model: String,
    pub settings: GenerationSettings,
    pub framing: FramingMode,
    pub context: ContextMode,
    /// Where history and the config file live.
    pub data_dir: PathBuf,
    pub system_prompt: String,
}

impl Default for ExamusConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            settings: GenerationSettings::default(),
            framing: FramingMode::default(),
            context: ContextMode::default(),
            data_dir: default_data_dir(),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub framing: Option<FramingMode>,
    pub context: Option<ContextMode>,
    pub system_prompt: Option<String>,
}

impl ConfigFile {
    /// Read a config file; a missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(toml::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }
}

impl ExamusConfig {
    /// Load from `.env`, the process environment, and the config file.
    ///
    /// Recognised variables: `EXAMUS_BASE_URL` (or `OLLAMA_BASE_URL`),
    /// `EXAMUS_MODEL`, `EXAMUS_TEMPERATURE`, `EXAMUS_MAX_TOKENS`,
    /// `EXAMUS_FRAMING`, `EXAMUS_CONTEXT`, `EXAMUS_DATA_DIR`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup("EXAMUS_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        let file = ConfigFile::load(&config.data_dir.join(CONFIG_FILE_NAME))?;
        config.apply_file(file);

        if let Some(url) = lookup("EXAMUS_BASE_URL").or_else(|| lookup("OLLAMA_BASE_URL")) {
            config.base_url = url;
        }
        if let Some(model) = lookup("EXAMUS_MODEL") {
            config.model = model;
        }
        if let Some(raw) = lookup("EXAMUS_TEMPERATURE") {
            config.settings.temperature = parse_var("EXAMUS_TEMPERATURE", &raw)?;
        }
        if let Some(raw) = lookup("EXAMUS_MAX_TOKENS") {
            config.settings.max_tokens = parse_var("EXAMUS_MAX_TOKENS", &raw)?;
        }
        if let Some(raw) = lookup("EXAMUS_FRAMING") {
            config.framing = parse_var("EXAMUS_FRAMING", &raw)?;
        }
        if let Some(raw) = lookup("EXAMUS_CONTEXT") {
            config.context = parse_var("EXAMUS_CONTEXT", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Overlay values from a config file.
    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(url) = file.base_url {
            self.base_url = url;
        }
        if let Some(model) = file.model {
            self.model = model;
        }
        if let Some(t) = file.temperature {
            self.settings.temperature = t;
        }
        if let Some(max) = file.max_tokens {
            self.settings.max_tokens = max;
        }
        if let Some(framing) = file.framing {
            self.framing = framing;
        }
        if let Some(context) = file.context {
            self.context = context;
        }
        if let Some(prompt) = file.system_prompt {
            self.system_prompt = prompt;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ExamusError::Configuration("model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.settings.temperature) {
            return Err(ExamusError::Configuration(format!(
                "temperature {} is outside 0.0..=2.0",
                self.settings.temperature
            )));
        }
        if self.settings.max_tokens == 0 {
            return Err(ExamusError::Configuration("max_tokens must be positive".into()));
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ExamusError::Configuration(format!("invalid {name} '{raw}': {e}")))
}
