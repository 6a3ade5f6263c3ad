//! Constituency trees in Penn Treebank bracket notation.

use std::fmt;

use thiserror::Error;

/// Errors from reading a bracketed tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeParseError {
    #[error("empty tree")]
    Empty,

    #[error("unexpected end of input, {0} bracket(s) left open")]
    UnexpectedEnd(usize),

    #[error("unexpected ')' at byte {0}")]
    UnexpectedClose(usize),

    #[error("trailing input at byte {0}")]
    TrailingInput(usize),
}

/// A labeled phrase-structure node.
///
/// Leaves carry the token's surface form as their label and have no
/// children. Leaves are numbered left to right from 1, matching token
/// indices in the owning sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    label: String,
    children: Vec<ParseTree>,
}

/// A phrase and the token span it covers (1-based, inclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constituent {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

impl Constituent {
    pub fn contains(&self, other: &Constituent) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme<'a> {
    Open(usize),
    Close(usize),
    Atom(usize, &'a str),
}

fn lex(input: &str) -> Vec<Lexeme<'_>> {
    let mut lexemes = Vec::new();
    let mut atom_start: Option<usize> = None;

    for (pos, ch) in input.char_indices() {
        let boundary = ch == '(' || ch == ')' || ch.is_whitespace();
        if boundary {
            if let Some(start) = atom_start.take() {
                lexemes.push(Lexeme::Atom(start, &input[start..pos]));
            }
            match ch {
                '(' => lexemes.push(Lexeme::Open(pos)),
                ')' => lexemes.push(Lexeme::Close(pos)),
                _ => {}
            }
        } else if atom_start.is_none() {
            atom_start = Some(pos);
        }
    }
    if let Some(start) = atom_start {
        lexemes.push(Lexeme::Atom(start, &input[start..]));
    }
    lexemes
}

impl ParseTree {
    pub fn node(label: impl Into<String>, children: Vec<ParseTree>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    pub fn leaf(word: impl Into<String>) -> Self {
        Self::node(word, Vec::new())
    }

    /// Read a tree such as `(ROOT (S (NP (DT All)) (VP (VBP are))))`.
    ///
    /// Any whitespace separates atoms, so multi-line Penn layout parses the
    /// same as the single-line form. A node may have an empty label, as in
    /// `( (S ...))`.
    pub fn parse(input: &str) -> Result<Self, TreeParseError> {
        let lexemes = lex(input);
        let mut pos = 0;
        let tree = match lexemes.first() {
            None => return Err(TreeParseError::Empty),
            Some(_) => Self::parse_at(&lexemes, &mut pos, 0)?,
        };
        match lexemes.get(pos) {
            None => Ok(tree),
            Some(Lexeme::Open(at)) | Some(Lexeme::Close(at)) | Some(Lexeme::Atom(at, _)) => {
                Err(TreeParseError::TrailingInput(*at))
            }
        }
    }

    fn parse_at(
        lexemes: &[Lexeme<'_>],
        pos: &mut usize,
        depth: usize,
    ) -> Result<Self, TreeParseError> {
        match lexemes.get(*pos) {
            None => Err(TreeParseError::UnexpectedEnd(depth)),
            Some(Lexeme::Close(at)) => Err(TreeParseError::UnexpectedClose(*at)),
            Some(Lexeme::Atom(_, word)) => {
                *pos += 1;
                Ok(Self::leaf(*word))
            }
            Some(Lexeme::Open(_)) => {
                *pos += 1;
                let label = match lexemes.get(*pos) {
                    Some(Lexeme::Atom(_, label)) => {
                        *pos += 1;
                        label.to_string()
                    }
                    _ => String::new(),
                };
                let mut children = Vec::new();
                loop {
                    match lexemes.get(*pos) {
                        None => return Err(TreeParseError::UnexpectedEnd(depth + 1)),
                        Some(Lexeme::Close(_)) => {
                            *pos += 1;
                            return Ok(Self::node(label, children));
                        }
                        Some(_) => children.push(Self::parse_at(lexemes, pos, depth + 1)?),
                    }
                }
            }
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn children(&self) -> &[ParseTree] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// A tag node directly above a single word, e.g. `(DT All)`.
    pub fn is_preterminal(&self) -> bool {
        self.children.len() == 1 && self.children[0].is_leaf()
    }

    /// Words at the leaves, left to right.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        if self.is_leaf() {
            out.push(&self.label);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(ParseTree::leaf_count).sum()
        }
    }

    /// Phrasal nodes (neither leaves nor preterminals) with their token spans,
    /// in pre-order.
    pub fn constituents(&self) -> Vec<Constituent> {
        let mut out = Vec::new();
        self.collect_constituents(1, &mut out);
        out
    }

    fn collect_constituents(&self, start: usize, out: &mut Vec<Constituent>) -> usize {
        if self.is_leaf() {
            return 1;
        }
        let slot = out.len();
        if !self.is_preterminal() {
            out.push(Constituent {
                label: self.label.clone(),
                start,
                end: start,
            });
        }
        let mut covered = 0;
        for child in &self.children {
            covered += child.collect_constituents(start + covered, out);
        }
        if !self.is_preterminal() {
            out[slot].end = start + covered - 1;
        }
        covered
    }

    /// Multi-line Penn layout.
    ///
    /// Tag nodes stay on their parent's line until the first phrasal child;
    /// that child and every later sibling start a new line indented two
    /// spaces deeper than the parent.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }

    fn write_pretty(&self, out: &mut String, indent: usize) {
        if self.is_leaf() {
            out.push_str(&self.label);
            return;
        }
        out.push('(');
        out.push_str(&self.label);
        let mut broken = false;
        for child in &self.children {
            if broken || !(child.is_leaf() || child.is_preterminal()) {
                broken = true;
                out.push('\n');
                out.push_str(&" ".repeat(indent + 2));
                child.write_pretty(out, indent + 2);
            } else {
                out.push(' ');
                child.write_pretty(out, indent + 2);
            }
        }
        out.push(')');
    }
}

/// Single-line bracket notation.
impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf() {
            return f.write_str(&self.label);
        }
        write!(f, "({}", self.label)?;
        for child in &self.children {
            write!(f, " {}", child)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALIKE: &str = "(ROOT (S (NP (DT All) (JJ happy) (NNS families)) (VP (VBP are) (ADJP (JJ alike))) (. .)))";

    #[test]
    fn test_parse_single_line() {
        let tree = ParseTree::parse(ALIKE).unwrap();
        assert_eq!(tree.label(), "ROOT");
        assert_eq!(
            tree.leaves(),
            vec!["All", "happy", "families", "are", "alike", "."]
        );
        assert_eq!(tree.leaf_count(), 6);
        assert_eq!(tree.to_string(), ALIKE);
    }

    #[test]
    fn test_parse_multi_line_matches_single_line() {
        let multi = "(ROOT\n  (S\n    (NP (DT All) (JJ happy) (NNS families))\n    (VP (VBP are)\n      (ADJP (JJ alike)))\n    (. .)))";
        assert_eq!(
            ParseTree::parse(multi).unwrap(),
            ParseTree::parse(ALIKE).unwrap()
        );
    }

    #[test]
    fn test_pretty_uses_penn_layout() {
        let tree = ParseTree::parse(ALIKE).unwrap();
        let expected = "(ROOT\n  (S\n    (NP (DT All) (JJ happy) (NNS families))\n    (VP (VBP are)\n      (ADJP (JJ alike)))\n    (. .)))";
        assert_eq!(tree.pretty(), expected);
    }

    #[test]
    fn test_constituent_spans() {
        let tree = ParseTree::parse(ALIKE).unwrap();
        let spans: Vec<(String, usize, usize)> = tree
            .constituents()
            .into_iter()
            .map(|c| (c.label, c.start, c.end))
            .collect();
        assert_eq!(
            spans,
            vec![
                ("ROOT".to_string(), 1, 6),
                ("S".to_string(), 1, 6),
                ("NP".to_string(), 1, 3),
                ("VP".to_string(), 4, 5),
                ("ADJP".to_string(), 5, 5),
            ]
        );
    }

    #[test]
    fn test_empty_label_node() {
        let tree = ParseTree::parse("( (S (NN Hi)))").unwrap();
        assert_eq!(tree.label(), "");
        assert_eq!(tree.leaves(), vec!["Hi"]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(ParseTree::parse("  "), Err(TreeParseError::Empty));
        assert_eq!(
            ParseTree::parse("(ROOT (S (NN x)"),
            Err(TreeParseError::UnexpectedEnd(2))
        );
        assert_eq!(ParseTree::parse(")"), Err(TreeParseError::UnexpectedClose(0)));
        assert_eq!(
            ParseTree::parse("(NN x) (NN y)"),
            Err(TreeParseError::TrailingInput(7))
        );
    }
}
