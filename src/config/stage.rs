//! Annotation stages and the ordered stage list handed to the engine.

use std::fmt;
use std::str::FromStr;

use super::ConfigError;

/// A named annotation step understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Split raw text into tokens.
    Tokenize,
    /// Group tokens into sentences.
    Ssplit,
    /// Part-of-speech tagging.
    Pos,
    /// Lemmatization.
    Lemma,
    /// Named-entity recognition.
    Ner,
    /// Constituency parsing (also yields basic dependencies).
    Parse,
}

impl Stage {
    /// Every recognized stage, in the engine's canonical order.
    pub const ALL: [Stage; 6] = [
        Stage::Tokenize,
        Stage::Ssplit,
        Stage::Pos,
        Stage::Lemma,
        Stage::Ner,
        Stage::Parse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Tokenize => "tokenize",
            Stage::Ssplit => "ssplit",
            Stage::Pos => "pos",
            Stage::Lemma => "lemma",
            Stage::Ner => "ner",
            Stage::Parse => "parse",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "tokenize" => Some(Stage::Tokenize),
            "ssplit" => Some(Stage::Ssplit),
            "pos" => Some(Stage::Pos),
            "lemma" => Some(Stage::Lemma),
            "ner" => Some(Stage::Ner),
            "parse" => Some(Stage::Parse),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, non-empty list of stages.
///
/// Order is preserved exactly as declared; checking that a stage's
/// prerequisites run before it is left to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageList(Vec<Stage>);

impl StageList {
    pub fn new(stages: Vec<Stage>) -> Result<Self, ConfigError> {
        if stages.is_empty() {
            return Err(ConfigError::EmptyStageList);
        }
        Ok(Self(stages))
    }

    /// Parse a comma-separated list such as `"tokenize, ssplit, pos"`.
    ///
    /// Whitespace around names and empty segments are ignored.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let stages = spec
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                Stage::from_str(name).ok_or_else(|| ConfigError::UnknownStage(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(stages)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.0
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.0.contains(&stage)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `annotators` property value as the engine expects it.
    pub fn to_annotators(&self) -> String {
        self.0
            .iter()
            .map(Stage::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for StageList {
    fn default() -> Self {
        Self(Stage::ALL.to_vec())
    }
}

impl FromStr for StageList {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StageList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Stage::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_annotators() {
        let list = StageList::parse("tokenize, ssplit, pos, lemma, ner, parse").unwrap();
        assert_eq!(list, StageList::default());
        assert_eq!(list.to_annotators(), "tokenize,ssplit,pos,lemma,ner,parse");
        assert_eq!(list.to_string(), "tokenize, ssplit, pos, lemma, ner, parse");
    }

    #[test]
    fn test_parse_preserves_declared_order() {
        let list = StageList::parse("ssplit,tokenize").unwrap();
        assert_eq!(list.stages(), &[Stage::Ssplit, Stage::Tokenize]);
        assert!(!list.contains(Stage::Parse));
    }

    #[test]
    fn test_parse_is_case_insensitive_and_skips_empty_segments() {
        let list = StageList::parse(" Tokenize ,SSPLIT,, pos,").unwrap();
        assert_eq!(list.stages(), &[Stage::Tokenize, Stage::Ssplit, Stage::Pos]);
    }

    #[test]
    fn test_unknown_stage_is_rejected() {
        let err = StageList::parse("tokenize, ssplit, sentiment").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStage(ref name) if name == "sentiment"));
    }

    #[test]
    fn test_empty_stage_list_is_rejected() {
        assert!(matches!(
            StageList::parse(" , "),
            Err(ConfigError::EmptyStageList)
        ));
        assert!(matches!(
            StageList::new(Vec::new()),
            Err(ConfigError::EmptyStageList)
        ));
    }

    #[test]
    fn test_stage_names_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_str(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::from_str("coref"), None);
    }
}
