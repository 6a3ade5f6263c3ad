//! Full structural dump, in the layout of CoreNLP's text output.

use std::io::{self, Write};

use crate::models::AnnotationResult;

pub fn print_dump<W: Write>(result: &AnnotationResult, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "Document: ({} sentences, {} tokens)",
        result.sentence_count(),
        result.token_count()
    )?;

    for sentence in result.sentences() {
        writeln!(out)?;
        writeln!(
            out,
            "Sentence #{} ({} tokens):",
            sentence.index + 1,
            sentence.tokens.len()
        )?;
        writeln!(out, "{}", sentence.text())?;

        writeln!(out)?;
        writeln!(out, "Tokens:")?;
        for token in &sentence.tokens {
            writeln!(out, "{}", token.describe())?;
        }

        if let Some(tree) = &sentence.tree {
            writeln!(out)?;
            writeln!(out, "Constituency parse: ")?;
            writeln!(out, "{}", tree.pretty())?;
        }

        if let Some(graph) = &sentence.dependencies {
            writeln!(out)?;
            writeln!(out, "Dependency Parse (basic dependencies):")?;
            for edge in graph.edges() {
                writeln!(
                    out,
                    "{}({}, {})",
                    edge.relation,
                    edge.governor_label(),
                    edge.dependent_label()
                )?;
            }
        }

        let mentions = sentence.entity_mentions();
        if !mentions.is_empty() {
            writeln!(out)?;
            writeln!(out, "Extracted the following NER entity mentions:")?;
            for mention in mentions {
                writeln!(out, "{}\t{}", mention.text, mention.tag)?;
            }
        }
    }
    Ok(())
}
