use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::providers::configs::{
    ModelConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};
use crate::transcript::{FileTranscriptStore, MemoryTranscriptStore, TranscriptStore};

pub const ENV_PREFIX: &str = "EXPLORA";

/// Optional settings file looked up in the working directory (`explora.toml`).
pub const CONFIG_FILE: &str = "explora";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub kind: StoreKind,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl StoreSettings {
    pub fn build(&self) -> Arc<dyn TranscriptStore> {
        match self.kind {
            StoreKind::Memory => Arc::new(MemoryTranscriptStore::new()),
            StoreKind::File => Arc::new(FileTranscriptStore::new(
                self.dir.clone().unwrap_or_else(FileTranscriptStore::default_dir),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub provider: ModelConfig,
    #[serde(default)]
    pub store: StoreSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("provider.model", DEFAULT_MODEL)?
            .set_default("provider.temperature", f64::from(DEFAULT_TEMPERATURE))?
            .set_default("provider.max_tokens", i64::from(DEFAULT_MAX_TOKENS))?
            .set_default("provider.response_format", "json_object")?
            .set_default("store.kind", "memory")?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            ConfigError::Other(err)
        })
    }
}
