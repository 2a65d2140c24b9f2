//! Story document loading.
//!
//! A story document is YAML:
//!
//! ```yaml
//! start: start
//! prelude:
//!   - "ESTABLISHING COMMUNICATION LINK..."
//! nodes:
//!   - id: start
//!     messages: ["Can you hear me?"]
//!     choices:
//!       - { text: "Loud and clear.", type: safe, next: status }
//! ```

use std::path::Path;

use meridian_core::error::DomainError;
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::graph::StoryGraph;
use crate::domain::node::StoryNode;

const BUNDLED_STORY: &str = include_str!("../story/meridian.yaml");

#[derive(Debug, Deserialize)]
struct StoryDocument {
    #[serde(default = "default_start")]
    start: String,
    #[serde(default)]
    prelude: Vec<String>,
    nodes: Vec<StoryNode>,
}

fn default_start() -> String {
    "start".to_owned()
}

/// Parses a story document and audits it, logging every authoring issue.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the document is not valid YAML, has
/// duplicate node ids, or has no start node.
pub fn from_yaml(source: &str) -> Result<StoryGraph, DomainError> {
    let document: StoryDocument = serde_yaml::from_str(source)
        .map_err(|e| DomainError::Validation(format!("story document parse failed: {e}")))?;
    let graph = StoryGraph::new(document.start, document.prelude, document.nodes)?;

    let issues = graph.audit();
    for issue in &issues {
        warn!(issue = %issue, "story authoring issue");
    }
    info!(
        nodes = graph.len(),
        issues = issues.len(),
        start = graph.start_id(),
        "story graph loaded"
    );
    Ok(graph)
}

/// Reads and parses a story document from disk.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the file cannot be read, or any
/// error of [`from_yaml`].
pub fn from_path(path: &Path) -> Result<StoryGraph, DomainError> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        DomainError::Infrastructure(format!("cannot read story {}: {e}", path.display()))
    })?;
    from_yaml(&source)
}

/// The story shipped with the engine: the Meridian distress call.
///
/// # Errors
///
/// Returns `DomainError::Validation` only if the bundled document is broken.
pub fn bundled() -> Result<StoryGraph, DomainError> {
    from_yaml(BUNDLED_STORY)
}
