//! Dependency graphs over a sentence's tokens.

/// Relation name used for the edge from the virtual root.
pub const ROOT_RELATION: &str = "root";

/// Active nominal subject.
pub const SUBJECT_RELATION: &str = "nsubj";

/// Passive nominal subject, in the older Stanford and the UD spelling.
pub const PASSIVE_SUBJECT_RELATIONS: [&str; 2] = ["nsubjpass", "nsubj:pass"];

/// A labeled directed edge between tokens.
///
/// Token indices are 1-based; governor `0` is the virtual root node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub relation: String,
    pub governor: usize,
    pub governor_gloss: String,
    pub dependent: usize,
    pub dependent_gloss: String,
}

impl Dependency {
    pub fn is_root(&self) -> bool {
        self.governor == 0
    }

    /// `word-index` form of the governor, `ROOT-0` for the root edge.
    pub fn governor_label(&self) -> String {
        if self.is_root() {
            "ROOT-0".to_string()
        } else {
            format!("{}-{}", self.governor_gloss, self.governor)
        }
    }

    pub fn dependent_label(&self) -> String {
        format!("{}-{}", self.dependent_gloss, self.dependent)
    }

    /// `Some(passive)` when the relation marks a nominal subject.
    fn subject_voice(&self) -> Option<bool> {
        if self.relation == SUBJECT_RELATION {
            Some(false)
        } else if PASSIVE_SUBJECT_RELATIONS.contains(&self.relation.as_str()) {
            Some(true)
        } else {
            None
        }
    }
}

/// The subject attached to a sentence's root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject<'a> {
    pub edge: &'a Dependency,
    pub passive: bool,
}

/// Edges of a sentence's dependency parse, in engine order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: Vec<Dependency>,
}

impl DependencyGraph {
    pub fn new(edges: Vec<Dependency>) -> Self {
        Self { edges }
    }

    pub fn edges(&self) -> &[Dependency] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Dependents attached to the virtual root.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.edges.iter().filter(|e| e.is_root()).map(|e| e.dependent)
    }

    /// The root token. Validated graphs have exactly one.
    pub fn root(&self) -> Option<usize> {
        self.roots().next()
    }

    /// The edge from the virtual root.
    pub fn root_edge(&self) -> Option<&Dependency> {
        self.edges.iter().find(|e| e.is_root())
    }

    /// Edges whose governor is `token`.
    pub fn dependents_of(&self, token: usize) -> impl Iterator<Item = &Dependency> + '_ {
        self.edges.iter().filter(move |e| e.governor == token)
    }

    /// The leftmost nominal subject among the root's left dependents.
    ///
    /// Subjects to the right of the root (inverted clauses) are not considered.
    pub fn subject(&self) -> Option<Subject<'_>> {
        let root = self.root()?;
        self.dependents_of(root)
            .filter(|e| e.dependent < root)
            .filter_map(|e| e.subject_voice().map(|passive| Subject { edge: e, passive }))
            .min_by_key(|s| s.edge.dependent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(relation: &str, governor: (usize, &str), dependent: (usize, &str)) -> Dependency {
        Dependency {
            relation: relation.to_string(),
            governor: governor.0,
            governor_gloss: governor.1.to_string(),
            dependent: dependent.0,
            dependent_gloss: dependent.1.to_string(),
        }
    }

    #[test]
    fn test_root_and_labels() {
        let graph = DependencyGraph::new(vec![
            edge(ROOT_RELATION, (0, "ROOT"), (2, "alike")),
            edge("nsubj", (2, "alike"), (1, "Families")),
        ]);

        assert_eq!(graph.root(), Some(2));
        assert_eq!(graph.roots().count(), 1);
        assert_eq!(graph.edges()[0].governor_label(), "ROOT-0");
        assert_eq!(graph.edges()[1].governor_label(), "alike-2");
        assert_eq!(graph.edges()[1].dependent_label(), "Families-1");
        assert_eq!(graph.dependents_of(2).count(), 1);
    }

    #[test]
    fn test_empty_graph_has_no_root() {
        let graph = DependencyGraph::default();
        assert!(graph.is_empty());
        assert_eq!(graph.root(), None);
        assert_eq!(graph.root_edge(), None);
        assert_eq!(graph.subject(), None);
    }

    #[test]
    fn test_subject_of_active_clause() {
        let graph = DependencyGraph::new(vec![
            edge(ROOT_RELATION, (0, "ROOT"), (5, "unhappy")),
            edge("det", (3, "family"), (1, "Every")),
            edge("nsubj", (5, "unhappy"), (3, "family")),
            edge("cop", (5, "unhappy"), (4, "is")),
        ]);

        let subject = graph.subject().unwrap();
        assert_eq!(subject.edge.dependent_label(), "family-3");
        assert!(!subject.passive);
        assert_eq!(graph.root_edge().unwrap().dependent_label(), "unhappy-5");
    }

    #[test]
    fn test_passive_subject_in_either_spelling() {
        for relation in PASSIVE_SUBJECT_RELATIONS {
            let graph = DependencyGraph::new(vec![
                edge(ROOT_RELATION, (0, "ROOT"), (3, "written")),
                edge(relation, (3, "written"), (1, "Anna")),
                edge("aux:pass", (3, "written"), (2, "was")),
            ]);
            let subject = graph.subject().unwrap();
            assert_eq!(subject.edge.dependent, 1);
            assert!(subject.passive);
        }
    }

    #[test]
    fn test_subject_must_precede_root() {
        let graph = DependencyGraph::new(vec![
            edge(ROOT_RELATION, (0, "ROOT"), (1, "Came")),
            edge("nsubj", (1, "Came"), (2, "Anna")),
        ]);
        assert_eq!(graph.subject(), None);

        // non-subject dependents on the left are skipped
        let graph = DependencyGraph::new(vec![
            edge(ROOT_RELATION, (0, "ROOT"), (4, "read")),
            edge("nsubj", (4, "read"), (3, "Levin")),
            edge("obj", (4, "read"), (1, "This")),
        ]);
        assert_eq!(graph.subject().unwrap().edge.dependent, 3);
    }
}
