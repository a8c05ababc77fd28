use serde::{Deserialize, Serialize};
use tracegraph_core::{RecursiveTrace, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    SequentialChain,
    RecursiveLoop,
    Branching,
}

/// A single detected pattern: what kind, how strong (chain length, loop
/// depth, branch factor, ...), and the id of the node where it starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub kind: PatternKind,
    pub measurement: f64,
    pub location: String,
}

/// Detected patterns bucketed by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub sequential_chains: Vec<PatternRecord>,
    pub recursive_loops: Vec<PatternRecord>,
    pub branching_patterns: Vec<PatternRecord>,
}

impl PatternSummary {
    pub fn push(&mut self, record: PatternRecord) {
        match record.kind {
            PatternKind::SequentialChain => self.sequential_chains.push(record),
            PatternKind::RecursiveLoop => self.recursive_loops.push(record),
            PatternKind::Branching => self.branching_patterns.push(record),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sequential_chains.is_empty()
            && self.recursive_loops.is_empty()
            && self.branching_patterns.is_empty()
    }
}

/// Extension point for pattern detection over traces.
///
/// No detector ships with this crate: chain, loop, and branching detection
/// are unimplemented by design, and an analyzer with no registered
/// detectors reports an empty [`PatternSummary`] rather than fabricated
/// records. Register implementations via
/// [`crate::TraceAnalyzer::with_detector`].
pub trait PatternDetector: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn detect(&self, trace: &RecursiveTrace) -> Result<Vec<PatternRecord>>;
}
