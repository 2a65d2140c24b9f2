//! The immutable story graph.

use std::collections::HashMap;

use meridian_core::error::DomainError;

use super::audit::{self, AuthoringIssue};
use super::node::StoryNode;

/// Immutable mapping from node keys to node definitions.
#[derive(Debug, Clone)]
pub struct StoryGraph {
    start: String,
    prelude: Vec<String>,
    nodes: HashMap<String, StoryNode>,
}

impl StoryGraph {
    /// Builds a graph from its nodes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if two nodes share a key or the
    /// start key has no node.
    pub fn new(
        start: impl Into<String>,
        prelude: Vec<String>,
        nodes: impl IntoIterator<Item = StoryNode>,
    ) -> Result<Self, DomainError> {
        let start = start.into();
        let mut by_id = HashMap::new();
        for node in nodes {
            let id = node.id.clone();
            if by_id.insert(id.clone(), node).is_some() {
                return Err(DomainError::Validation(format!(
                    "duplicate story node id: {id}"
                )));
            }
        }
        if !by_id.contains_key(&start) {
            return Err(DomainError::Validation(format!(
                "start node {start:?} is not defined"
            )));
        }
        Ok(Self {
            start,
            prelude,
            nodes: by_id,
        })
    }

    /// Looks up a node by key.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownNode` if no node has that key.
    pub fn lookup(&self, key: &str) -> Result<&StoryNode, DomainError> {
        self.nodes
            .get(key)
            .ok_or_else(|| DomainError::UnknownNode(key.to_owned()))
    }

    /// Key of the designated start node.
    #[must_use]
    pub fn start_id(&self) -> &str {
        &self.start
    }

    /// The designated start node.
    #[must_use]
    pub fn start_node(&self) -> &StoryNode {
        // The constructor guarantees the start node exists.
        &self.nodes[&self.start]
    }

    /// System lines delivered before the start node.
    #[must_use]
    pub fn prelude(&self) -> &[String] {
        &self.prelude
    }

    /// Returns `true` if a node with this key exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes. A constructed graph always
    /// has at least its start node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &StoryNode> {
        self.nodes.values()
    }

    /// Keys of every node reachable from the start node by following choice
    /// edges, in breadth-first order. Dangling edges are skipped.
    #[must_use]
    pub fn reachable_from_start(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = vec![self.start.as_str()];
        let mut cursor = 0;
        while cursor < seen.len() {
            let node = &self.nodes[seen[cursor]];
            cursor += 1;
            if node.ending.is_some() {
                continue;
            }
            for choice in &node.choices {
                if let Some(next) = choice.next.as_deref() {
                    if let Some((key, _)) = self.nodes.get_key_value(next) {
                        if !seen.contains(&key.as_str()) {
                            seen.push(key.as_str());
                        }
                    }
                }
            }
        }
        seen
    }

    /// Reports authoring problems without rejecting the graph.
    #[must_use]
    pub fn audit(&self) -> Vec<AuthoringIssue> {
        audit::audit(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::{Choice, ChoiceKind, Ending};

    fn tiny_graph() -> StoryGraph {
        StoryGraph::new(
            "start",
            vec![],
            vec![
                StoryNode::new("start", vec!["Hello?".into()]).with_choices(vec![
                    Choice::new("Yes", ChoiceKind::Safe, Some("end".into())),
                    Choice::new("Lost", ChoiceKind::Urgent, Some("nowhere".into())),
                ]),
                StoryNode::new("end", vec!["Bye.".into()]).with_ending(Ending::default()),
                StoryNode::new("orphan", vec![]).with_ending(Ending::default()),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_returns_node() {
        let graph = tiny_graph();
        assert_eq!(graph.lookup("end").unwrap().messages, vec!["Bye.".to_owned()]);
    }

    #[test]
    fn test_lookup_missing_node_is_unknown_node_error() {
        let graph = tiny_graph();
        assert_eq!(
            graph.lookup("nowhere").unwrap_err(),
            DomainError::UnknownNode("nowhere".into())
        );
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        // Arrange
        let nodes = vec![
            StoryNode::new("start", vec![]).with_ending(Ending::default()),
            StoryNode::new("start", vec![]).with_ending(Ending::default()),
        ];

        // Act
        let result = StoryGraph::new("start", vec![], nodes);

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_missing_start_is_rejected() {
        let nodes = vec![StoryNode::new("a", vec![]).with_ending(Ending::default())];
        assert!(matches!(
            StoryGraph::new("start", vec![], nodes),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_reachable_skips_orphans_and_dangling_edges() {
        let graph = tiny_graph();
        assert_eq!(graph.reachable_from_start(), vec!["start", "end"]);
    }
}
