//! Typed annotation data.
//!
//! Each annotation layer is a named field on a plain record; nothing is
//! looked up by key at runtime.

mod annotation;
mod dependency;
mod tree;

pub use annotation::{
    AnnotationRequest, AnnotationResult, EntityMention, InvalidAnnotation, NounChunk,
    SentenceAnnotation, Token, NOUN_PHRASE_LABEL, OUTSIDE_TAG,
};
pub use dependency::{
    Dependency, DependencyGraph, Subject, PASSIVE_SUBJECT_RELATIONS, ROOT_RELATION,
    SUBJECT_RELATION,
};
pub use tree::{Constituent, ParseTree, TreeParseError};
