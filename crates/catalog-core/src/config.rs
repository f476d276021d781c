//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars into typed `Settings`. Provides helpers to expand `~`
//! and `${VAR}` and to resolve relative paths against a known base directory.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_CACHE_TTL_SECS, DEFAULT_REFRESH_INTERVAL, MAX_BULK_DOCUMENTS, REFRESH_DISABLED};
use crate::mapping::IndexMapping;
use crate::types::FailurePolicy;
use crate::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Load `config.toml`, then `config.<RUST_ENV>.toml`, then an optional
    /// explicit file, then `APP_*` env vars (`__` separates nested keys).
    pub fn load_with(extra: Option<&Path>) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        if let Some(path) = extra {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub elastic: ElasticSettings,
    pub text: TextSettings,
    pub cache: CacheSettings,
    pub sync: SyncSettings,
    pub index: MappingSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.sync.max_bulk_documents == 0 {
            return Err(Error::InvalidConfig("sync.max_bulk_documents must be at least 1".into()));
        }
        let refresh = self.sync.refresh_interval.trim();
        if refresh.is_empty() || refresh == REFRESH_DISABLED {
            return Err(Error::InvalidConfig(format!(
                "sync.refresh_interval must be an interactive interval, got '{}'",
                self.sync.refresh_interval
            )));
        }
        if self.cache.record_prefix.is_empty() {
            return Err(Error::InvalidConfig("cache.record_prefix must not be empty".into()));
        }
        Ok(())
    }

    /// Mapping used when an index is recreated on a full run.
    pub fn mapping(&self) -> Result<IndexMapping> {
        match &self.index.mapping_file {
            Some(file) => IndexMapping::from_file(&expand_path(file)),
            None => Ok(IndexMapping::game_data(&self.sync.document_type)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticSettings {
    pub prod_url: String,
    pub local_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ElasticSettings {
    fn default() -> Self {
        Self {
            prod_url: String::new(),
            local_url: "http://localhost:9200".to_string(),
            username: None,
            password: None,
            timeout_secs: 60,
        }
    }
}

impl ElasticSettings {
    /// `prod` and `staging` deploy to the production endpoint; every other
    /// environment uses the local one.
    pub fn endpoint_for(&self, environment: &str) -> Result<&str> {
        let url = if is_production_like(environment) { &self.prod_url } else { &self.local_url };
        if url.is_empty() {
            return Err(Error::InvalidConfig(format!("no elastic endpoint configured for environment '{}'", environment)));
        }
        Ok(url)
    }
}

pub fn is_production_like(environment: &str) -> bool {
    matches!(environment, "prod" | "staging")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    pub index_dir: String,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self { index_dir: "./data/indexes/catalog".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub dir: String,
    pub ttl_secs: u64,
    pub record_prefix: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { dir: "./data/cache".to_string(), ttl_secs: DEFAULT_CACHE_TTL_SECS, record_prefix: "xiv".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub max_bulk_documents: usize,
    pub document_type: String,
    pub refresh_interval: String,
    pub failure_policy: FailurePolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            max_bulk_documents: MAX_BULK_DOCUMENTS,
            document_type: "search".to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL.to_string(),
            failure_policy: FailurePolicy::FailFast,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingSettings {
    pub mapping_file: Option<String>,
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
