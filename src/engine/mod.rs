//! Annotation engine abstraction.
//!
//! The NLP work itself happens in Stanford CoreNLP. This module only knows
//! how to reach it:
//! - **Server**: a running CoreNLP server over HTTP (default)
//! - **Command**: the CoreNLP Java pipeline as a subprocess
//!
//! Both return CoreNLP's JSON document format, decoded by [`wire`].

mod command;
mod server;
pub mod wire;

pub use command::CoreNlpCommandEngine;
pub use server::CoreNlpServerEngine;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{PipelineConfig, StageList};
use crate::models::{AnnotationResult, InvalidAnnotation};

/// Errors from annotation engines.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine not available: {0}")]
    NotAvailable(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("CoreNLP rejected the request (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Annotation failed: {0}")]
    Failed(String),

    #[error("Failed to parse engine output: {0}")]
    Parse(String),

    #[error("Engine output is inconsistent: {0}")]
    InvalidOutput(#[from] InvalidAnnotation),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Available engine backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EngineType {
    /// CoreNLP server reached over HTTP.
    #[default]
    Server,
    /// CoreNLP Java pipeline launched as a subprocess.
    Command,
    /// A name that matched no backend; rejected by config validation.
    Unknown(String),
}

impl EngineType {
    pub fn as_str(&self) -> &str {
        match self {
            EngineType::Server => "server",
            EngineType::Command => "command",
            EngineType::Unknown(name) => name,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "server" | "http" => Some(EngineType::Server),
            "command" | "java" => Some(EngineType::Command),
            _ => None,
        }
    }
}

impl From<String> for EngineType {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(EngineType::Unknown(s))
    }
}

impl From<EngineType> for String {
    fn from(engine: EngineType) -> Self {
        engine.as_str().to_string()
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An external service that runs annotation stages over text.
///
/// Implementations receive the stage list exactly as configured. Checking
/// that stages appear in a workable order is the engine's job; its
/// complaint comes back as an [`EngineError`].
#[async_trait]
pub trait AnnotationEngine: Send + Sync {
    fn engine_type(&self) -> EngineType;

    /// Whether the engine can be reached right now.
    async fn is_available(&self) -> bool;

    /// What to do when `is_available` returns false.
    fn availability_hint(&self) -> String;

    /// Run `stages` over `text` and return the decoded result.
    async fn annotate(
        &self,
        text: &str,
        stages: &StageList,
    ) -> Result<AnnotationResult, EngineError>;
}

/// Build the engine selected by `config`.
pub fn create_engine(config: &PipelineConfig) -> Result<Box<dyn AnnotationEngine>, EngineError> {
    match &config.engine {
        EngineType::Server => Ok(Box::new(CoreNlpServerEngine::new(config.clone())?)),
        EngineType::Command => Ok(Box::new(CoreNlpCommandEngine::new(config.clone()))),
        EngineType::Unknown(name) => Err(EngineError::NotAvailable(format!(
            "unknown engine '{}'",
            name
        ))),
    }
}
