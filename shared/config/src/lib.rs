pub mod resources;

pub use resources::ResourceRegistry;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Unable to read resources file {path}: {source}")]
    ResourcesFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid resources file: {0}")]
    ResourcesParse(#[from] serde_json::Error),

    #[error("Resources file {0} defines no resources")]
    EmptyRegistry(String),

    #[error("Default resource {0} is not in the registry")]
    UnknownDefaultResource(String),
}

#[derive(Clone, Debug)]
pub struct BrowserConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding one `<resource>.db` per resource.
    pub build_dir: PathBuf,
    /// Working directory of the build command.
    pub project_dir: PathBuf,
    pub build_command: String,
    pub build_timeout: Duration,
    pub templates_dir: PathBuf,
    /// Resource served under `/ontology`.
    pub default_resource: String,
    pub max_post_bytes: usize,
    pub max_post_terms: usize,
    pub search_limit: usize,
    pub registry: ResourceRegistry,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            build_dir: PathBuf::from("../build"),
            project_dir: PathBuf::from(".."),
            build_command: "make".to_string(),
            build_timeout: Duration::from_secs(900),
            templates_dir: PathBuf::from("templates"),
            default_resource: "ONTIE".to_string(),
            max_post_bytes: 1024 * 1024,
            max_post_terms: 10_000,
            search_limit: 30,
            registry: ResourceRegistry::builtin(),
        }
    }
}

impl BrowserConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let registry = match get("RESOURCES_PATH") {
            Some(path) => ResourceRegistry::from_path(path)?,
            None => defaults.registry,
        };

        let config = Self {
            host: get("BROWSER_HOST").unwrap_or(defaults.host),
            port: parse_or(&get, "BROWSER_PORT", defaults.port)?,
            build_dir: get("BUILD_DIR").map(PathBuf::from).unwrap_or(defaults.build_dir),
            project_dir: get("PROJECT_DIR").map(PathBuf::from).unwrap_or(defaults.project_dir),
            build_command: get("BUILD_COMMAND").unwrap_or(defaults.build_command),
            build_timeout: Duration::from_secs(parse_or(
                &get,
                "BUILD_TIMEOUT_SECS",
                defaults.build_timeout.as_secs(),
            )?),
            templates_dir: get("TEMPLATES_DIR").map(PathBuf::from).unwrap_or(defaults.templates_dir),
            default_resource: get("DEFAULT_RESOURCE").unwrap_or(defaults.default_resource),
            max_post_bytes: parse_or(&get, "MAX_POST_BYTES", defaults.max_post_bytes)?,
            max_post_terms: parse_or(&get, "MAX_POST_TERMS", defaults.max_post_terms)?,
            search_limit: parse_or(&get, "SEARCH_LIMIT", defaults.search_limit)?,
            registry,
        };

        if config.registry.lookup(&config.default_resource).is_none() {
            return Err(ConfigError::UnknownDefaultResource(config.default_resource));
        }

        tracing::debug!(
            build_dir = %config.build_dir.display(),
            templates_dir = %config.templates_dir.display(),
            resources = config.registry.len(),
            "Configuration loaded"
        );

        Ok(config)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}
