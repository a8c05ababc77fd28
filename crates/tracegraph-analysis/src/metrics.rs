use std::collections::HashSet;
use tracegraph_core::{RecursiveTrace, Result, TraceGraphError, TraceNode};

/// Bounds for a single traversal.
///
/// Unlike a pruning limit, exceeding either bound here is treated as
/// evidence of a malformed or adversarial trace and fails the traversal
/// with [`TraceGraphError::MalformedTrace`].
#[derive(Debug, Clone, Default)]
pub struct TraversalLimits {
    /// Maximum depth to accept (None for unlimited)
    pub max_depth: Option<usize>,
    /// Maximum number of nodes to visit (None for unlimited)
    pub max_nodes: Option<usize>,
    /// Reject traces in which the same node id occurs twice.
    ///
    /// Off by default: id uniqueness is by construction, not enforced, so
    /// an owned in-memory tree with repeated ids is still valid. Enable
    /// this for traces that crossed a serialization or system boundary,
    /// where an unrolled cycle manifests as a repeated id.
    pub reject_repeated_ids: bool,
}

impl TraversalLimits {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_repeated_id_check(mut self) -> Self {
        self.reject_repeated_ids = true;
        self
    }
}

/// Structural statistics of a subtree, gathered in one post-order pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralStats {
    /// Longest root-to-leaf edge count; a leaf has depth 0.
    pub depth: usize,
    /// Widest sibling group anywhere in the subtree. A leaf counts as
    /// width 1, not 0; the asymmetry with `depth` is deliberate.
    pub breadth: usize,
    /// Total nodes including the subtree root; always >= 1.
    pub node_count: usize,
    /// Total parent-to-child edges; `node_count - 1` for any tree.
    pub child_edges: usize,
    /// Nodes with at least one child.
    pub internal_nodes: usize,
}

impl StructuralStats {
    /// Average children per internal node, tree-wide: total child edges
    /// divided by the number of non-leaf nodes. A complete ternary tree is
    /// exactly 3.0, a pure chain exactly 1.0, and a single-node tree 0.
    pub fn branching_factor(&self) -> f64 {
        if self.internal_nodes == 0 {
            return 0.0;
        }
        self.child_edges as f64 / self.internal_nodes as f64
    }

    /// Recursion Depth Index: `(depth / node_count) * ln(branching_factor)`.
    ///
    /// A heuristic composite score with no normalization guarantee, not a
    /// bounded metric. Exactly 0 whenever the branching factor is <= 1
    /// (single nodes, pure chains).
    pub fn recursion_depth_index(&self) -> f64 {
        let bf = self.branching_factor();
        if self.node_count == 0 || bf <= 1.0 {
            return 0.0;
        }
        (self.depth as f64 / self.node_count as f64) * bf.ln()
    }
}

enum Phase<'a> {
    Enter(&'a TraceNode, usize),
    Exit(&'a TraceNode),
}

/// Compute [`StructuralStats`] for the subtree rooted at `node` with no
/// traversal bounds.
pub fn structural_stats(node: &TraceNode) -> Result<StructuralStats> {
    structural_stats_with_limits(node, &TraversalLimits::default())
}

/// Compute [`StructuralStats`] in a single explicit-stack post-order walk.
///
/// No call-stack recursion, so tree depth is bounded by memory rather than
/// stack size. Exclusive child ownership makes an in-memory back-edge
/// unrepresentable, so the walk always terminates; the node and depth
/// bounds in [`TraversalLimits`] keep even oversized or adversarial input
/// from being walked in full, and the opt-in repeated-id check flags
/// traces whose cycles were unrolled at a serialization boundary.
pub fn structural_stats_with_limits(
    root: &TraceNode,
    limits: &TraversalLimits,
) -> Result<StructuralStats> {
    let mut stack = vec![Phase::Enter(root, 0)];
    let mut finished: Vec<StructuralStats> = Vec::new();
    let mut seen: Option<HashSet<&str>> = limits.reject_repeated_ids.then(HashSet::new);
    let mut visited = 0usize;

    while let Some(phase) = stack.pop() {
        match phase {
            Phase::Enter(node, level) => {
                if let Some(seen) = seen.as_mut() {
                    if !seen.insert(node.id.as_str()) {
                        return Err(TraceGraphError::MalformedTrace(format!(
                            "node id '{}' visited twice",
                            node.id
                        )));
                    }
                }
                visited += 1;
                if let Some(max_nodes) = limits.max_nodes {
                    if visited > max_nodes {
                        return Err(TraceGraphError::MalformedTrace(format!(
                            "node budget of {} exceeded",
                            max_nodes
                        )));
                    }
                }
                if let Some(max_depth) = limits.max_depth {
                    if level > max_depth {
                        return Err(TraceGraphError::MalformedTrace(format!(
                            "depth budget of {} exceeded at node '{}'",
                            max_depth, node.id
                        )));
                    }
                }
                stack.push(Phase::Exit(node));
                for child in node.children.iter().rev() {
                    stack.push(Phase::Enter(child, level + 1));
                }
            }
            Phase::Exit(node) => {
                let arity = node.children.len();
                let mut stats = StructuralStats {
                    depth: 0,
                    breadth: 1,
                    node_count: 1,
                    child_edges: arity,
                    internal_nodes: usize::from(arity > 0),
                };
                for _ in 0..arity {
                    // One result per child is pushed before the parent exits
                    let child = finished.pop().ok_or_else(|| {
                        TraceGraphError::MalformedTrace(format!(
                            "traversal underflow below node '{}'",
                            node.id
                        ))
                    })?;
                    stats.depth = stats.depth.max(1 + child.depth);
                    stats.breadth = stats.breadth.max(child.breadth);
                    stats.node_count += child.node_count;
                    stats.child_edges += child.child_edges;
                    stats.internal_nodes += child.internal_nodes;
                }
                stats.breadth = stats.breadth.max(arity.max(1));
                finished.push(stats);
            }
        }
    }

    finished
        .pop()
        .ok_or(TraceGraphError::EmptyTrace)
}

/// Maximum root-to-leaf edge count below `node`; 0 for a leaf.
pub fn depth(node: &TraceNode) -> Result<usize> {
    Ok(structural_stats(node)?.depth)
}

/// Widest sibling group reachable from `node`; 1 for a leaf.
pub fn breadth(node: &TraceNode) -> Result<usize> {
    Ok(structural_stats(node)?.breadth)
}

/// Total node count including `node` itself; always >= 1.
pub fn node_count(node: &TraceNode) -> Result<usize> {
    Ok(structural_stats(node)?.node_count)
}

/// Tree-wide average branching factor of `trace`.
pub fn branching_factor(trace: &RecursiveTrace) -> Result<f64> {
    Ok(structural_stats(&trace.root)?.branching_factor())
}

/// Recursion Depth Index of `trace`. See
/// [`StructuralStats::recursion_depth_index`].
pub fn recursion_depth_index(trace: &RecursiveTrace) -> Result<f64> {
    Ok(structural_stats(&trace.root)?.recursion_depth_index())
}
