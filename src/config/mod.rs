//! Pipeline configuration.
//!
//! Configuration is an explicit value handed to [`crate::Pipeline`]; nothing
//! is stored process-wide. Values come from, in increasing priority:
//!
//! 1. built-in defaults
//! 2. a config file (TOML, YAML or JSON) named by `CORENLP_DEMO_CONFIG`
//! 3. environment variables (see [`PipelineConfig::with_overrides`])

mod stage;

pub use stage::{Stage, StageList};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::engine::EngineType;

/// Environment variable naming the config file to load.
pub const CONFIG_PATH_ENV: &str = "CORENLP_DEMO_CONFIG";

/// The stage list used when nothing else is configured.
pub const DEFAULT_ANNOTATORS: &str = "tokenize, ssplit, pos, lemma, ner, parse";

/// Seconds to wait for the engine before giving up.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No annotation stages configured")]
    EmptyStageList,

    #[error("Unknown annotation stage '{0}' (expected one of: tokenize, ssplit, pos, lemma, ner, parse)")]
    UnknownStage(String),

    #[error("Unknown engine '{0}' (expected 'server' or 'command')")]
    UnknownEngine(String),

    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Comma-separated stage list, e.g. "tokenize, ssplit, pos"
    #[serde(default = "default_annotators")]
    pub annotators: String,
    /// Which engine backend to use
    #[serde(default)]
    pub engine: EngineType,
    /// CoreNLP server base URL (server engine)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Engine timeout in seconds; 0 waits indefinitely
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Java executable (command engine)
    #[serde(default = "default_java")]
    pub java: String,
    /// CoreNLP distribution directory holding the jars (command engine)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corenlp_home: Option<String>,
    /// JVM heap size passed as -mx (command engine)
    #[serde(default = "default_memory")]
    pub memory: String,
    /// Extra engine properties passed through verbatim
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    /// File this config was loaded from, if any
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

fn default_annotators() -> String {
    DEFAULT_ANNOTATORS.to_string()
}

fn default_endpoint() -> String {
    "http://localhost:9000".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_java() -> String {
    "java".to_string()
}

fn default_memory() -> String {
    "4g".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            annotators: default_annotators(),
            engine: EngineType::default(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            java: default_java(),
            corenlp_home: None,
            memory: default_memory(),
            properties: BTreeMap::new(),
            source_path: None,
        }
    }
}

impl PipelineConfig {
    /// Load configuration for this process.
    ///
    /// Reads the file named by `CORENLP_DEMO_CONFIG` when set, otherwise
    /// starts from defaults. Environment overrides are applied last.
    pub async fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok()).await
    }

    /// [`PipelineConfig::load`] with variables read from `lookup`.
    pub async fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match lookup(CONFIG_PATH_ENV) {
            Some(path) => {
                let expanded = shellexpand::tilde(&path).into_owned();
                Self::load_from_path(Path::new(&expanded)).await?
            }
            None => Self::default(),
        };
        Ok(config.with_overrides(lookup))
    }

    /// Load configuration from a specific file.
    /// The format is picked from the extension; anything else is read as JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_err = |reason: String| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        };

        let mut config: PipelineConfig = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| parse_err(e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_err(e.to_string()))?
            }
            _ => serde_json::from_str(&contents).map_err(|e| parse_err(e.to_string()))?,
        };

        debug!("Loaded pipeline config from {}", path.display());
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// [`PipelineConfig::load`]).
    ///
    /// Supported keys:
    /// - `CORENLP_ANNOTATORS`: comma-separated stage list
    /// - `CORENLP_ENGINE`: "server" (default) or "command"
    /// - `CORENLP_URL`: server endpoint
    /// - `CORENLP_TIMEOUT_SECS`: engine timeout in seconds, 0 to disable
    /// - `CORENLP_JAVA`: Java executable
    /// - `CORENLP_HOME`: CoreNLP distribution directory
    /// - `CORENLP_MEMORY`: JVM heap size
    ///
    /// Unparseable numeric values are ignored. An unknown engine name is kept
    /// as-is so that [`PipelineConfig::validate`] can report it.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CORENLP_ANNOTATORS") {
            self.annotators = val;
        }
        if let Some(val) = lookup("CORENLP_ENGINE") {
            self.engine = EngineType::from(val);
        }
        if let Some(val) = lookup("CORENLP_URL") {
            self.endpoint = val;
        }
        if let Some(val) = lookup("CORENLP_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.timeout_secs = secs;
            }
        }
        if let Some(val) = lookup("CORENLP_JAVA") {
            self.java = val;
        }
        if let Some(val) = lookup("CORENLP_HOME") {
            self.corenlp_home = Some(val);
        }
        if let Some(val) = lookup("CORENLP_MEMORY") {
            self.memory = val;
        }
        self
    }

    /// Check the configuration and return the parsed stage list.
    pub fn validate(&self) -> Result<StageList, ConfigError> {
        let stages = StageList::parse(&self.annotators)?;

        match &self.engine {
            EngineType::Server => {
                let url = Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
                    url: self.endpoint.clone(),
                    reason: e.to_string(),
                })?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(ConfigError::InvalidEndpoint {
                        url: self.endpoint.clone(),
                        reason: format!("unsupported scheme '{}'", url.scheme()),
                    });
                }
            }
            EngineType::Command => {}
            EngineType::Unknown(name) => return Err(ConfigError::UnknownEngine(name.clone())),
        }

        Ok(stages)
    }

    /// Engine timeout; `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Classpath for the command engine: every jar under `corenlp_home`.
    pub fn classpath(&self) -> Option<String> {
        self.corenlp_home.as_ref().map(|home| {
            let expanded = shellexpand::tilde(home);
            Path::new(expanded.as_ref()).join("*").display().to_string()
        })
    }

    /// The property mapping handed to the engine.
    ///
    /// `annotators` and `outputFormat` always win over pass-through properties.
    pub fn engine_properties(&self, stages: &StageList) -> BTreeMap<String, String> {
        let mut props = self.properties.clone();
        props.insert("annotators".to_string(), stages.to_annotators());
        props.insert("outputFormat".to_string(), "json".to_string());
        props
    }
}
