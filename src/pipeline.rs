//! The pipeline façade: one configured engine, one synchronous-looking call.

use std::time::Instant;

use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, PipelineConfig, StageList};
use crate::engine::{create_engine, AnnotationEngine, EngineError};
use crate::models::{AnnotationRequest, AnnotationResult};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Runs a fixed stage list through an annotation engine.
///
/// The pipeline adds no checks of its own on stage order; whatever the
/// engine reports for a bad configuration is returned unchanged.
pub struct Pipeline {
    stages: StageList,
    engine: Box<dyn AnnotationEngine>,
}

impl Pipeline {
    /// Validate `config` and build its engine.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let stages = config.validate()?;
        let engine = create_engine(config)?;
        info!("Pipeline ready: {} engine, annotators={}", engine.engine_type(), stages);
        Ok(Self { stages, engine })
    }

    pub fn with_engine(stages: StageList, engine: Box<dyn AnnotationEngine>) -> Self {
        Self { stages, engine }
    }

    pub fn stages(&self) -> &StageList {
        &self.stages
    }

    pub fn engine(&self) -> &dyn AnnotationEngine {
        self.engine.as_ref()
    }

    /// Build a request for `text` using this pipeline's stages.
    pub fn request(&self, text: impl Into<String>) -> AnnotationRequest {
        AnnotationRequest::new(text, self.stages.clone())
    }

    /// Run every stage of `request` and wait for the complete result.
    pub async fn annotate(
        &self,
        request: &AnnotationRequest,
    ) -> Result<AnnotationResult, PipelineError> {
        info!(
            engine = %self.engine.engine_type(),
            annotators = %request.stages(),
            chars = request.text().len(),
            "starting annotation"
        );
        let start = Instant::now();

        let result = self.engine.annotate(request.text(), request.stages()).await?;

        info!(
            sentences = result.sentence_count(),
            tokens = result.token_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "finished annotation"
        );
        Ok(result)
    }
}
