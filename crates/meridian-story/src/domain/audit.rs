//! Authoring audit.
//!
//! Story documents are written by hand; the audit reports the mistakes the
//! session engine would otherwise only discover mid-session.

use std::fmt;

use super::graph::StoryGraph;
use super::node::Terminal;

/// A problem found in authored story data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthoringIssue {
    /// A node has neither choices nor an ending.
    DeadEnd {
        /// Offending node.
        node: String,
    },
    /// A choice points at a node that does not exist.
    DanglingNext {
        /// Node owning the choice.
        node: String,
        /// Position of the choice on the node.
        choice_index: usize,
        /// Missing target key.
        target: String,
    },
    /// A choice has no target on a node without an ending.
    MissingNext {
        /// Node owning the choice.
        node: String,
        /// Position of the choice on the node.
        choice_index: usize,
    },
    /// A node declares both choices and an ending; the choices are ignored.
    ChoicesShadowedByEnding {
        /// Offending node.
        node: String,
    },
}

impl fmt::Display for AuthoringIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadEnd { node } => write!(f, "node {node} has neither choices nor an ending"),
            Self::DanglingNext {
                node,
                choice_index,
                target,
            } => write!(
                f,
                "choice {choice_index} of node {node} leads to undefined node {target}"
            ),
            Self::MissingNext { node, choice_index } => {
                write!(f, "choice {choice_index} of node {node} has no next node")
            }
            Self::ChoicesShadowedByEnding { node } => {
                write!(f, "node {node} has an ending, its choices are ignored")
            }
        }
    }
}

pub(crate) fn audit(graph: &StoryGraph) -> Vec<AuthoringIssue> {
    let mut nodes: Vec<_> = graph.nodes().collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));

    let mut issues = Vec::new();
    for node in nodes {
        match node.terminal() {
            Terminal::DeadEnd => issues.push(AuthoringIssue::DeadEnd {
                node: node.id.clone(),
            }),
            Terminal::Ending(_) if !node.choices.is_empty() => {
                issues.push(AuthoringIssue::ChoicesShadowedByEnding {
                    node: node.id.clone(),
                });
            }
            Terminal::Ending(_) => {}
            Terminal::Choices(choices) => {
                for (choice_index, choice) in choices.iter().enumerate() {
                    match choice.next.as_deref() {
                        None => issues.push(AuthoringIssue::MissingNext {
                            node: node.id.clone(),
                            choice_index,
                        }),
                        Some(target) if !graph.contains(target) => {
                            issues.push(AuthoringIssue::DanglingNext {
                                node: node.id.clone(),
                                choice_index,
                                target: target.to_owned(),
                            });
                        }
                        Some(_) => {}
                    }
                }
            }
        }
    }
    issues
}
