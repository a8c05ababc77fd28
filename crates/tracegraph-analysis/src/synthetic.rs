use chrono::Utc;
use serde_json::{json, Value};
use tracegraph_core::{
    NodeKind, RecursiveTrace, Result, SystemTrace, TraceConfig, TraceGraphError, TraceNode,
    Traceable,
};
use tracing::debug;

/// Ceiling on synthetic build depth. The synthetic tree is complete and
/// ternary, so node count is exponential in depth; 12 levels is already
/// ~800k nodes.
pub const MAX_SYNTHETIC_DEPTH: usize = 12;

const STEPS_PER_NODE: usize = 3;

/// Build a deterministic placeholder trace: a complete ternary tree of
/// depth exactly `max_depth` (a single root when `max_depth` is 0).
///
/// The root is an `input_0` Input node carrying the given payload and a
/// creation timestamp. Every node above the depth bound gets three
/// Transformation children with ids `{parent}_step_{i}` and a recorded
/// `depth` metadata entry. The true depth is recomputed by traversal before
/// the trace is returned, so the stored `depth` is trustworthy even if the
/// expansion logic changes.
pub fn build_synthetic_trace(max_depth: usize, input: Value) -> Result<RecursiveTrace> {
    if max_depth > MAX_SYNTHETIC_DEPTH {
        return Err(TraceGraphError::InvalidDepth(format!(
            "max_depth {} exceeds synthetic ceiling of {}",
            max_depth, MAX_SYNTHETIC_DEPTH
        )));
    }

    let mut root = TraceNode::new("input_0", NodeKind::Input)
        .with_content(input)
        .with_metadata("timestamp", json!(Utc::now().to_rfc3339()));
    expand(&mut root, 0, max_depth);

    let depth = crate::metrics::depth(&root)?;
    debug!(depth, "built synthetic trace");

    Ok(RecursiveTrace::new(root, depth).with_metadata("system_type", json!("synthetic")))
}

fn expand(parent: &mut TraceNode, current_depth: usize, max_depth: usize) {
    if current_depth >= max_depth {
        return;
    }
    for i in 0..STEPS_PER_NODE {
        let mut step = TraceNode::new(
            format!("{}_step_{}", parent.id, i),
            NodeKind::Transformation,
        )
        .with_content(json!(format!("Processing step {}", i)))
        .with_metadata("depth", json!(current_depth + 1));
        expand(&mut step, current_depth + 1, max_depth);
        parent.push_child(step);
    }
}

/// Default [`Traceable`] implementation for testing and demos: "processes"
/// any input by emitting the synthetic ternary step log.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSystem;

impl Traceable for SyntheticSystem {
    fn process_with_trace(&self, input: &Value, config: &TraceConfig) -> Result<SystemTrace> {
        let trace = build_synthetic_trace(config.max_depth, input.clone())?;
        let mut system = trace.flatten();
        if !config.include_metadata {
            for step in &mut system.steps {
                step.metadata.clear();
            }
        }
        Ok(system)
    }
}
