//! Configuration loader.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env
//! vars into typed structs. Every field has a default, so an empty config
//! resolves to the development setup (both corpora on localhost).

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default = "CorpusConfig::default_icd")]
    pub icd: CorpusConfig,
    #[serde(default = "CorpusConfig::default_legal")]
    pub legal: CorpusConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Length of the vectors the corpora's vector columns hold. Query
    /// vectors of any other length are rejected before the datastore is
    /// touched.
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_embedding_url")]
    pub base_url: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { dimension: default_dimension(), base_url: default_embedding_url() }
    }
}

/// Connection parameters for one corpus database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl CorpusConfig {
    fn with_database(database: &str) -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: database.to_string(),
            user: default_user(),
            password: String::new(),
            max_connections: default_max_connections(),
            idle_timeout_secs: default_idle_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    pub fn default_icd() -> Self {
        Self::with_database("vnd")
    }

    pub fn default_legal() -> Self {
        Self::with_database("npa")
    }
}

fn default_dimension() -> usize {
    1024
}

fn default_embedding_url() -> String {
    "https://bge-m3.sk-ai.kz".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_idle_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Self::from_figment(&figment)
    }

    /// Extract and validate from an already assembled Figment. `load`
    /// funnels through here; tests provide their own providers.
    pub fn from_figment(figment: &Figment) -> anyhow::Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.embedding.dimension == 0 {
            return Err(Error::InvalidConfig(
                "embedding.dimension must be non-zero".to_string(),
            ));
        }
        for (name, corpus) in [("icd", &self.icd), ("legal", &self.legal)] {
            if corpus.host.is_empty() {
                return Err(Error::InvalidConfig(format!("{name}.host must not be empty")));
            }
            if corpus.database.is_empty() {
                return Err(Error::InvalidConfig(format!("{name}.database must not be empty")));
            }
            if corpus.max_connections == 0 {
                return Err(Error::InvalidConfig(format!(
                    "{name}.max_connections must be at least 1"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig::default(),
            icd: CorpusConfig::default_icd(),
            legal: CorpusConfig::default_legal(),
        }
    }
}
