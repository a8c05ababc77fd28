use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// String-keyed metadata attached to nodes and traces. Insertion order is
/// not significant.
pub type Metadata = HashMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Input,
    Transformation,
    Output,
    Other(String),
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Transformation
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Input => "input",
            NodeKind::Transformation => "transformation",
            NodeKind::Output => "output",
            NodeKind::Other(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "input" => Ok(NodeKind::Input),
            "transformation" => Ok(NodeKind::Transformation),
            "output" => Ok(NodeKind::Output),
            other => Ok(NodeKind::Other(other.to_string())),
        }
    }
}

/// Options governing trace extraction from a [`crate::Traceable`] system.
///
/// `max_depth` and `include_metadata` are honored by the built-in
/// synthetic system; the remaining flags are advisory hints that external
/// `Traceable` implementors honor as far as their instrumentation allows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Maximum depth the system should trace to.
    pub max_depth: usize,
    /// Whether intermediate processing steps are recorded. Advisory.
    pub track_intermediate: bool,
    /// Whether per-step metadata is recorded.
    pub include_metadata: bool,
    /// Whether steps carry attribution back to the originating system.
    /// Advisory.
    pub trace_attribution: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            track_intermediate: true,
            include_metadata: true,
            trace_attribution: true,
        }
    }
}
