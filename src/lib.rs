//! corenlp-demo - run a Stanford CoreNLP pipeline and print its annotations.
//!
//! The crate is a thin façade over an external annotation engine:
//!
//! - [`input`] resolves the text to annotate (file argument or built-in text)
//! - [`config`] describes the pipeline: stage list, engine selection, endpoint
//! - [`pipeline`] hands the request to an [`engine::AnnotationEngine`]
//! - [`printer`] renders the typed [`models::AnnotationResult`]
//!
//! Two binaries share this library: `corenlp-dump` prints every annotation
//! layer, `corenlp-walk` walks tokens, trees and dependencies sentence by
//! sentence.

pub mod cli;
pub mod config;
pub mod engine;
pub mod input;
pub mod models;
pub mod pipeline;
pub mod printer;

pub use config::{ConfigError, PipelineConfig, Stage, StageList};
pub use engine::{AnnotationEngine, EngineError, EngineType};
pub use models::{AnnotationRequest, AnnotationResult, SentenceAnnotation, Token};
pub use pipeline::{Pipeline, PipelineError};
