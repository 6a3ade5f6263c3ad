//! Console rendering of annotation results.
//!
//! Printers only read the result; they write to any [`std::io::Write`] so
//! tests can capture output.

mod dump;
mod walk;

pub use dump::print_dump;
pub use walk::print_walk;

use std::io::{self, Write};

use crate::models::AnnotationResult;

/// Which rendering a binary uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintMode {
    /// Every annotation layer of every sentence.
    Dump,
    /// Tokens, tree, dependency list and subject per sentence.
    Walk,
}

impl PrintMode {
    pub fn render<W: Write>(self, result: &AnnotationResult, out: &mut W) -> io::Result<()> {
        match self {
            PrintMode::Dump => print_dump(result, out),
            PrintMode::Walk => print_walk(result, out),
        }
    }
}
