// src/settings.rs

use std::path::{Path, PathBuf};

use clap::Parser;
use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File, Map};
use serde::{Deserialize, Serialize};
use tracing::warn;

const DEFAULT_QUERY: &str = "AFTER-TAX INCOME";

/// Environment variables read into the settings. Anything else in the
/// environment map is ignored.
const ENV_KEYS: [&str; 5] = [
    "HUGGING_FACE_MODEL",
    "HUGGING_FACE_TOKEN",
    "AZURE_OPENAI_KEY",
    "AZURE_OPENAI_ENDPOINT",
    "MONGO_LINK",
];

#[derive(Parser, Debug)]
#[command(version, about = "Answer a question with context retrieved from a vector index")]
pub struct Args {
    /// Question to answer.
    #[arg(value_name = "QUERY", default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Path to an optional TOML file overriding the search and completion settings.
    #[arg(short, value_name = "CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    pub database: String,
    pub collection: String,
    pub index: String,
    pub path: String,
    pub num_candidates: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSettings {
    pub deployment: String,
    pub api_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub hugging_face_model: String,
    pub hugging_face_token: String,
    pub azure_openai_key: String,
    pub azure_openai_endpoint: String,
    pub mongo_link: String,
    pub search: SearchSettings,
    pub completion: CompletionSettings,
}

impl Settings {
    /// Load settings from the process environment and, if given, a TOML file.
    pub fn from_env(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env = ENV_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| ((*key).to_string(), v)))
            .collect();
        Self::load(path, env)
    }

    /// Layer defaults, the optional TOML file, then the known keys of `env`.
    ///
    /// Missing credentials and endpoints stay empty; the service that needs
    /// them reports the failure.
    pub fn load(path: Option<&Path>, mut env: Map<String, String>) -> Result<Self, ConfigError> {
        env.retain(|key, _| ENV_KEYS.contains(&key.as_str()));

        let mut builder = ConfigBuilder::<DefaultState>::default()
            .set_default("hugging_face_model", "")?
            .set_default("hugging_face_token", "")?
            .set_default("azure_openai_key", "")?
            .set_default("azure_openai_endpoint", "")?
            .set_default("mongo_link", "")?
            .set_default("search.database", "property")?
            .set_default("search.collection", "data")?
            .set_default("search.index", "PlotSemanticSearch")?
            .set_default("search.path", "embedding")?
            .set_default("search.num_candidates", 100)?
            .set_default("search.limit", 1)?
            .set_default("completion.deployment", "asssessiq-gpt-4o")?
            .set_default("completion.api_version", "2023-07-01-preview")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let cfg = builder
            .add_source(Environment::default().source(Some(env)))
            .build()?;

        let settings: Self = cfg.try_deserialize()?;
        for key in settings.missing() {
            warn!("{key} is not set");
        }
        Ok(settings)
    }

    /// Environment variables that ended up empty.
    fn missing(&self) -> Vec<&'static str> {
        let values = [
            &self.hugging_face_model,
            &self.hugging_face_token,
            &self.azure_openai_key,
            &self.azure_openai_endpoint,
            &self.mongo_link,
        ];
        ENV_KEYS
            .into_iter()
            .zip(values)
            .filter(|(_, value)| value.is_empty())
            .map(|(key, _)| key)
            .collect()
    }
}
