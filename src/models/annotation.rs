//! Annotation requests and results.

use thiserror::Error;

use crate::config::StageList;

use super::dependency::DependencyGraph;
use super::tree::{Constituent, ParseTree};

/// NER tag meaning "not an entity".
pub const OUTSIDE_TAG: &str = "O";

/// Constituent label of a noun phrase.
pub const NOUN_PHRASE_LABEL: &str = "NP";

/// Raw text plus the stages to run over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRequest {
    text: String,
    stages: StageList,
}

impl AnnotationRequest {
    pub fn new(text: impl Into<String>, stages: StageList) -> Self {
        Self {
            text: text.into(),
            stages,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn stages(&self) -> &StageList {
        &self.stages
    }
}

/// A single token and the per-token layers the engine produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// 1-based position within the sentence.
    pub index: usize,
    pub word: String,
    pub original_text: String,
    pub lemma: Option<String>,
    pub pos: Option<String>,
    pub ner: Option<String>,
    /// Character offsets into the request text.
    pub begin: usize,
    pub end: usize,
    /// Whitespace preceding and following the token in the request text.
    pub before: String,
    pub after: String,
}

impl Token {
    /// Compact `[Text=.. PartOfSpeech=.. Lemma=.. NamedEntityTag=..]` form.
    pub fn to_shorter_string(&self) -> String {
        let mut out = format!("[Text={}", self.word);
        self.push_layers(&mut out);
        out.push(']');
        out
    }

    /// Every field including character offsets.
    pub fn describe(&self) -> String {
        let mut out = format!(
            "[Text={} CharacterOffsetBegin={} CharacterOffsetEnd={}",
            self.word, self.begin, self.end
        );
        self.push_layers(&mut out);
        out.push(']');
        out
    }

    fn push_layers(&self, out: &mut String) {
        if let Some(pos) = &self.pos {
            out.push_str(" PartOfSpeech=");
            out.push_str(pos);
        }
        if let Some(lemma) = &self.lemma {
            out.push_str(" Lemma=");
            out.push_str(lemma);
        }
        if let Some(ner) = &self.ner {
            out.push_str(" NamedEntityTag=");
            out.push_str(ner);
        }
    }
}

/// A contiguous run of tokens sharing one non-`O` NER tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMention {
    pub text: String,
    pub tag: String,
    /// 1-based token span, inclusive.
    pub start: usize,
    pub end: usize,
}

/// A base noun phrase: an `NP` with no other `NP` inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NounChunk {
    pub text: String,
    /// 1-based token span, inclusive.
    pub start: usize,
    pub end: usize,
}

/// Everything the engine produced for one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceAnnotation {
    /// 0-based sentence number.
    pub index: usize,
    pub tokens: Vec<Token>,
    pub tree: Option<ParseTree>,
    pub dependencies: Option<DependencyGraph>,
}

impl SentenceAnnotation {
    /// The sentence's text, rebuilt from tokens and the whitespace between them.
    pub fn text(&self) -> String {
        self.span_text(1, self.tokens.len())
    }

    /// Text of tokens `start..=end` (1-based) with their inner whitespace.
    pub fn span_text(&self, start: usize, end: usize) -> String {
        let tokens = self
            .tokens
            .get(start.saturating_sub(1)..end)
            .unwrap_or_default();
        let mut out = String::new();
        for (i, token) in tokens.iter().enumerate() {
            out.push_str(&token.original_text);
            if i + 1 < tokens.len() {
                out.push_str(&token.after);
            }
        }
        out
    }

    /// Character span covered by the sentence.
    pub fn span(&self) -> Option<(usize, usize)> {
        match (self.tokens.first(), self.tokens.last()) {
            (Some(first), Some(last)) => Some((first.begin, last.end)),
            _ => None,
        }
    }

    pub fn entity_mentions(&self) -> Vec<EntityMention> {
        let mut mentions: Vec<EntityMention> = Vec::new();
        let mut previous: Option<&str> = None;

        for token in &self.tokens {
            let tag = token.ner.as_deref().filter(|t| *t != OUTSIDE_TAG);
            if let Some(tag) = tag {
                let extends = previous == Some(tag);
                match mentions.last_mut() {
                    Some(last) if extends => {
                        last.text.push(' ');
                        last.text.push_str(&token.original_text);
                        last.end = token.index;
                    }
                    _ => mentions.push(EntityMention {
                        text: token.original_text.clone(),
                        tag: tag.to_string(),
                        start: token.index,
                        end: token.index,
                    }),
                }
            }
            previous = tag;
        }
        mentions
    }

    /// Base noun phrases of the constituency parse, left to right.
    /// Empty when the sentence has no tree.
    pub fn noun_chunks(&self) -> Vec<NounChunk> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        let phrases: Vec<Constituent> = tree
            .constituents()
            .into_iter()
            .filter(|c| c.label == NOUN_PHRASE_LABEL)
            .collect();

        // constituents are in pre-order, so nested phrases follow their parent
        phrases
            .iter()
            .enumerate()
            .filter(|(i, phrase)| !phrases[i + 1..].iter().any(|inner| phrase.contains(inner)))
            .map(|(_, phrase)| NounChunk {
                text: self.span_text(phrase.start, phrase.end),
                start: phrase.start,
                end: phrase.end,
            })
            .collect()
    }

    fn validate(&self) -> Result<(), InvalidAnnotation> {
        let sentence = self.index;
        let count = self.tokens.len();

        for (i, token) in self.tokens.iter().enumerate() {
            if token.index != i + 1 {
                return Err(InvalidAnnotation::TokenIndex {
                    sentence,
                    expected: i + 1,
                    found: token.index,
                });
            }
            if token.end < token.begin {
                return Err(InvalidAnnotation::Overlap {
                    sentence,
                    token: token.index,
                });
            }
        }
        for pair in self.tokens.windows(2) {
            if pair[1].begin < pair[0].end {
                return Err(InvalidAnnotation::Overlap {
                    sentence,
                    token: pair[1].index,
                });
            }
        }

        if let Some(tree) = &self.tree {
            let leaves = tree.leaf_count();
            if leaves != count {
                return Err(InvalidAnnotation::TreeLeafCount {
                    sentence,
                    leaves,
                    tokens: count,
                });
            }
        }

        if let Some(graph) = &self.dependencies {
            for edge in graph.edges() {
                let governor_ok = edge.governor <= count;
                let dependent_ok = (1..=count).contains(&edge.dependent);
                if !governor_ok || !dependent_ok {
                    return Err(InvalidAnnotation::DependencyIndex {
                        sentence,
                        governor: edge.governor,
                        dependent: edge.dependent,
                        tokens: count,
                    });
                }
            }
            let roots = graph.roots().count();
            if roots != 1 {
                return Err(InvalidAnnotation::RootCount { sentence, roots });
            }
        }

        Ok(())
    }
}

/// Engine output that breaks the structural invariants of a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidAnnotation {
    #[error("sentence {found} is out of order (expected {expected})")]
    SentenceIndex { expected: usize, found: usize },

    #[error("sentence {sentence}: token {found} is out of order (expected {expected})")]
    TokenIndex {
        sentence: usize,
        expected: usize,
        found: usize,
    },

    #[error("sentence {sentence}: token {token} overlaps the preceding text")]
    Overlap { sentence: usize, token: usize },

    #[error("sentence {sentence}: parse tree has {leaves} leaves for {tokens} tokens")]
    TreeLeafCount {
        sentence: usize,
        leaves: usize,
        tokens: usize,
    },

    #[error("sentence {sentence}: dependency {governor} -> {dependent} is outside 1..={tokens}")]
    DependencyIndex {
        sentence: usize,
        governor: usize,
        dependent: usize,
        tokens: usize,
    },

    #[error("sentence {sentence}: dependency graph has {roots} roots")]
    RootCount { sentence: usize, roots: usize },
}

/// The engine's output for a whole request, sentence by sentence.
///
/// Built once through [`AnnotationResult::new`], which checks that
/// sentences partition the token stream and that trees and dependency
/// graphs only reference tokens of their own sentence. Immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationResult {
    sentences: Vec<SentenceAnnotation>,
}

impl AnnotationResult {
    pub fn new(sentences: Vec<SentenceAnnotation>) -> Result<Self, InvalidAnnotation> {
        let mut previous_end: Option<usize> = None;

        for (i, sentence) in sentences.iter().enumerate() {
            if sentence.index != i {
                return Err(InvalidAnnotation::SentenceIndex {
                    expected: i,
                    found: sentence.index,
                });
            }
            sentence.validate()?;

            if let Some((begin, end)) = sentence.span() {
                if previous_end.is_some_and(|prev| begin < prev) {
                    return Err(InvalidAnnotation::Overlap {
                        sentence: i,
                        token: 1,
                    });
                }
                previous_end = Some(end);
            }
        }

        Ok(Self { sentences })
    }

    pub fn sentences(&self) -> &[SentenceAnnotation] {
        &self.sentences
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(|s| s.tokens.len()).sum()
    }

    /// All tokens in document order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.sentences.iter().flat_map(|s| s.tokens.iter())
    }
}
