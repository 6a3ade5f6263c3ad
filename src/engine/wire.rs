//! CoreNLP JSON output format.
//!
//! Both engines ask CoreNLP for `outputFormat=json`. This module turns that
//! document into an [`AnnotationResult`], reading the bracketed `parse`
//! string into a [`ParseTree`] and `basicDependencies` into a
//! [`DependencyGraph`].

use serde::Deserialize;
use tracing::warn;

use crate::models::{
    AnnotationResult, Dependency, DependencyGraph, ParseTree, SentenceAnnotation, Token,
    ROOT_RELATION,
};

use super::EngineError;

/// Placeholder CoreNLP emits instead of a tree when parsing was skipped.
const SKIPPED_PARSE: &str = "SENTENCE_SKIPPED_OR_UNPARSABLE";

/// Top-level CoreNLP JSON document.
#[derive(Debug, Deserialize)]
pub struct WireDocument {
    #[serde(default)]
    pub sentences: Vec<WireSentence>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSentence {
    pub index: usize,
    #[serde(default)]
    pub tokens: Vec<WireToken>,
    #[serde(default)]
    pub parse: Option<String>,
    #[serde(default)]
    pub basic_dependencies: Option<Vec<WireDependency>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireToken {
    pub index: usize,
    pub word: String,
    #[serde(default)]
    pub original_text: Option<String>,
    #[serde(default)]
    pub lemma: Option<String>,
    #[serde(default)]
    pub pos: Option<String>,
    #[serde(default)]
    pub ner: Option<String>,
    pub character_offset_begin: usize,
    pub character_offset_end: usize,
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub after: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDependency {
    pub dep: String,
    pub governor: usize,
    #[serde(default)]
    pub governor_gloss: String,
    pub dependent: usize,
    #[serde(default)]
    pub dependent_gloss: String,
}

/// Decode a CoreNLP JSON string.
pub fn decode_str(json: &str) -> Result<AnnotationResult, EngineError> {
    let doc: WireDocument =
        serde_json::from_str(json).map_err(|e| EngineError::Parse(e.to_string()))?;
    decode(doc)
}

/// Convert a parsed CoreNLP document into a validated result.
pub fn decode(doc: WireDocument) -> Result<AnnotationResult, EngineError> {
    let sentences = doc
        .sentences
        .into_iter()
        .map(decode_sentence)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AnnotationResult::new(sentences)?)
}

fn decode_sentence(sentence: WireSentence) -> Result<SentenceAnnotation, EngineError> {
    let tree = match sentence.parse.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(SKIPPED_PARSE) => {
            warn!("CoreNLP skipped parsing sentence {}", sentence.index);
            None
        }
        Some(parse) => Some(ParseTree::parse(parse).map_err(|e| {
            EngineError::Parse(format!("sentence {}: {}", sentence.index, e))
        })?),
    };

    let dependencies = sentence.basic_dependencies.map(|edges| {
        DependencyGraph::new(edges.into_iter().map(decode_dependency).collect())
    });

    let tokens = sentence.tokens.into_iter().map(decode_token).collect();

    Ok(SentenceAnnotation {
        index: sentence.index,
        tokens,
        tree,
        dependencies,
    })
}

fn decode_token(token: WireToken) -> Token {
    Token {
        index: token.index,
        original_text: token.original_text.unwrap_or_else(|| token.word.clone()),
        word: token.word,
        lemma: token.lemma,
        pos: token.pos,
        ner: token.ner,
        begin: token.character_offset_begin,
        end: token.character_offset_end,
        before: token.before,
        after: token.after,
    }
}

fn decode_dependency(dep: WireDependency) -> Dependency {
    // CoreNLP labels the root edge "ROOT"; everything else is lowercase already
    let relation = if dep.governor == 0 {
        ROOT_RELATION.to_string()
    } else {
        dep.dep
    };
    Dependency {
        relation,
        governor: dep.governor,
        governor_gloss: dep.governor_gloss,
        dependent: dep.dependent,
        dependent_gloss: dep.dependent_gloss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvalidAnnotation;

    const ALIKE: &str = include_str!("../../tests/fixtures/alike.json");
    const UNHAPPY: &str = include_str!("../../tests/fixtures/unhappy_family.json");

    #[test]
    fn test_decode_two_sentences() {
        let result = decode_str(ALIKE).unwrap();
        assert_eq!(result.sentence_count(), 2);

        let first = &result.sentences()[0];
        assert_eq!(first.tokens.len(), 6);
        assert_eq!(first.text(), "All happy families are alike.");
        assert_eq!(first.tokens[3].lemma.as_deref(), Some("be"));
        assert_eq!(first.tree.as_ref().unwrap().leaf_count(), 6);

        let second = &result.sentences()[1];
        assert_eq!(second.tokens.len(), 9);
        assert_eq!(
            second.text(),
            "Every unhappy family is unhappy in its own way"
        );
    }

    #[test]
    fn test_sentences_partition_the_token_stream() {
        let text = "All happy families are alike. Every unhappy family is unhappy in its own way";
        let result = decode_str(ALIKE).unwrap();

        let mut cursor = 0;
        for token in result.tokens() {
            assert!(token.begin >= cursor, "token {} overlaps", token.word);
            assert!(
                text[cursor..token.begin].trim().is_empty(),
                "gap before {}",
                token.word
            );
            assert_eq!(&text[token.begin..token.end], token.original_text);
            cursor = token.end;
        }
        assert_eq!(cursor, text.len());
    }

    #[test]
    fn test_root_edge_is_normalized() {
        let result = decode_str(UNHAPPY).unwrap();
        let graph = result.sentences()[0].dependencies.as_ref().unwrap();
        let root = &graph.edges()[0];
        assert_eq!(root.relation, "root");
        assert_eq!(root.dependent_gloss, "unhappy");
        assert_eq!(graph.root(), Some(5));
    }

    #[test]
    fn test_missing_layers_decode_as_none() {
        let json = r#"{"sentences": [{"index": 0, "tokens": [
            {"index": 1, "word": "Hi", "characterOffsetBegin": 0, "characterOffsetEnd": 2}
        ]}]}"#;
        let result = decode_str(json).unwrap();
        let sentence = &result.sentences()[0];
        assert!(sentence.tree.is_none());
        assert!(sentence.dependencies.is_none());
        assert_eq!(sentence.tokens[0].original_text, "Hi");
        assert!(sentence.tokens[0].lemma.is_none());
    }

    #[test]
    fn test_skipped_parse_is_not_an_error() {
        let json = r#"{"sentences": [{"index": 0, "parse": "SENTENCE_SKIPPED_OR_UNPARSABLE", "tokens": [
            {"index": 1, "word": "Hi", "characterOffsetBegin": 0, "characterOffsetEnd": 2}
        ]}]}"#;
        assert!(decode_str(json).unwrap().sentences()[0].tree.is_none());
    }

    #[test]
    fn test_empty_document() {
        let result = decode_str(r#"{"sentences": []}"#).unwrap();
        assert_eq!(result.sentence_count(), 0);
        assert_eq!(decode_str("{}").unwrap().token_count(), 0);
    }

    #[test]
    fn test_malformed_output() {
        assert!(matches!(decode_str("<html>"), Err(EngineError::Parse(_))));

        let bad_tree = r#"{"sentences": [{"index": 0, "parse": "(ROOT (UH Hi)", "tokens": [
            {"index": 1, "word": "Hi", "characterOffsetBegin": 0, "characterOffsetEnd": 2}
        ]}]}"#;
        assert!(matches!(decode_str(bad_tree), Err(EngineError::Parse(_))));

        let bad_deps = r#"{"sentences": [{"index": 0, "basicDependencies": [
            {"dep": "ROOT", "governor": 0, "governorGloss": "ROOT", "dependent": 4, "dependentGloss": "x"}
        ], "tokens": [
            {"index": 1, "word": "Hi", "characterOffsetBegin": 0, "characterOffsetEnd": 2}
        ]}]}"#;
        assert!(matches!(
            decode_str(bad_deps),
            Err(EngineError::InvalidOutput(InvalidAnnotation::DependencyIndex { .. }))
        ));
    }
}
