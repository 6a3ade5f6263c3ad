//! Curated walk over tokens, constituency tree and dependencies, followed by
//! a short reading of each sentence's clause structure.

use std::io::{self, Write};

use crate::models::{AnnotationResult, DependencyGraph};

pub fn print_walk<W: Write>(result: &AnnotationResult, out: &mut W) -> io::Result<()> {
    writeln!(out, "Extracting elements from the annotations")?;
    writeln!(out)?;
    writeln!(out, "Tokens")?;

    for sentence in result.sentences() {
        writeln!(out, "{}", sentence.text())?;
        writeln!(out)?;
        for token in &sentence.tokens {
            writeln!(out, "{}", token.to_shorter_string())?;
        }

        writeln!(out)?;
        writeln!(out, "Tree:")?;
        match &sentence.tree {
            Some(tree) => writeln!(out, "{}", tree.pretty())?,
            None => writeln!(out, "(no parse)")?,
        }

        writeln!(out)?;
        writeln!(out, "Dependencies")?;
        match &sentence.dependencies {
            Some(graph) => {
                for edge in graph.edges() {
                    writeln!(
                        out,
                        "{} -> {} ({})",
                        edge.governor_label(),
                        edge.dependent_label(),
                        edge.relation
                    )?;
                }
                writeln!(out)?;
                print_clause(graph, out)?;
            }
            None => writeln!(out, "(no dependencies)")?,
        }
        writeln!(out)?;
    }

    writeln!(out, "Named Entities:")?;
    for sentence in result.sentences() {
        for mention in sentence.entity_mentions() {
            writeln!(out, "{} {}", mention.text, mention.tag)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Noun Chunks:")?;
    for sentence in result.sentences() {
        for chunk in sentence.noun_chunks() {
            writeln!(out, "{}", chunk.text)?;
        }
    }
    Ok(())
}

/// `ROOT=` and `subject=` lines for one sentence.
fn print_clause<W: Write>(graph: &DependencyGraph, out: &mut W) -> io::Result<()> {
    if let Some(root) = graph.root_edge() {
        writeln!(out, "ROOT={}", root.dependent_label())?;
    }
    match graph.subject() {
        Some(subject) => writeln!(
            out,
            "subject={} passive={}",
            subject.edge.dependent_label(),
            subject.passive
        ),
        None => writeln!(out, "subject=(none)"),
    }
}
