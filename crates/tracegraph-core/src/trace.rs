use crate::{Metadata, NodeKind, Result, TraceGraphError, TraceNode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// A complete recursive trace: one owned root node plus the maximum depth
/// recorded at creation time.
///
/// `depth` is the root-to-leaf edge count of the deepest path at the time
/// the trace was built (a single-node trace has depth 0). It is recorded,
/// not recomputed on access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecursiveTrace {
    pub root: TraceNode,
    pub depth: usize,
    pub metadata: Metadata,
}

impl RecursiveTrace {
    pub fn new(root: TraceNode, depth: usize) -> Self {
        Self {
            root,
            depth,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Rebuild a trace from a flat, system-native step log.
    ///
    /// Exactly one step must have no parent (the root). Children are
    /// attached in step order, which preserves the sequential ordering the
    /// originating system recorded. Fails fast on anything that cannot be a
    /// tree: no steps ([`TraceGraphError::EmptyTrace`]), duplicate ids,
    /// missing or multiple roots, dangling parent references, or steps
    /// unreachable from the root (all [`TraceGraphError::MalformedTrace`]).
    /// An unrolled cycle in the step log shows up as a duplicate id or an
    /// unreachable cluster, so conversion is bounded by the step count.
    pub fn from_system(system: SystemTrace) -> Result<RecursiveTrace> {
        if system.steps.is_empty() {
            return Err(TraceGraphError::EmptyTrace);
        }

        let mut nodes: HashMap<String, TraceNode> = HashMap::with_capacity(system.steps.len());
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        let mut root_id: Option<String> = None;

        for step in system.steps {
            if nodes.contains_key(&step.id) {
                return Err(TraceGraphError::MalformedTrace(format!(
                    "duplicate step id '{}'",
                    step.id
                )));
            }
            match &step.parent {
                Some(parent) => children
                    .entry(parent.clone())
                    .or_default()
                    .push(step.id.clone()),
                None => {
                    if let Some(existing) = &root_id {
                        return Err(TraceGraphError::MalformedTrace(format!(
                            "multiple root steps: '{}' and '{}'",
                            existing, step.id
                        )));
                    }
                    root_id = Some(step.id.clone());
                }
            }
            let node = TraceNode {
                id: step.id.clone(),
                kind: step.kind,
                content: step.content,
                metadata: step.metadata,
                children: Vec::new(),
            };
            nodes.insert(step.id, node);
        }

        let root_id = root_id
            .ok_or_else(|| TraceGraphError::MalformedTrace("no root step".to_string()))?;

        for (parent, child_ids) in &children {
            if !nodes.contains_key(parent) {
                return Err(TraceGraphError::MalformedTrace(format!(
                    "step '{}' references unknown parent '{}'",
                    child_ids[0], parent
                )));
            }
        }

        // Level-order walk from the root: validates reachability and yields
        // the assembly order and the true depth in one pass.
        let mut order: Vec<(String, usize)> = Vec::with_capacity(nodes.len());
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        queue.push_back((root_id.clone(), 0));
        let mut depth = 0;
        while let Some((id, level)) = queue.pop_front() {
            depth = depth.max(level);
            if let Some(child_ids) = children.get(&id) {
                for child in child_ids {
                    queue.push_back((child.clone(), level + 1));
                }
            }
            order.push((id, level));
        }
        if order.len() != nodes.len() {
            return Err(TraceGraphError::MalformedTrace(format!(
                "{} steps unreachable from root '{}'",
                nodes.len() - order.len(),
                root_id
            )));
        }

        // Attach children bottom-up: reverse level order guarantees every
        // child is fully assembled before its parent collects it.
        for (id, _) in order.iter().rev() {
            let mut node = nodes.remove(id).ok_or_else(|| {
                TraceGraphError::MalformedTrace(format!("step '{}' resolved twice", id))
            })?;
            if let Some(child_ids) = children.get(id) {
                for child_id in child_ids {
                    let child = nodes.remove(child_id).ok_or_else(|| {
                        TraceGraphError::MalformedTrace(format!(
                            "step '{}' claimed by two parents",
                            child_id
                        ))
                    })?;
                    node.children.push(child);
                }
            }
            nodes.insert(node.id.clone(), node);
        }

        let root = nodes.remove(&root_id).ok_or_else(|| {
            TraceGraphError::MalformedTrace(format!("root step '{}' lost during assembly", root_id))
        })?;

        debug!(root = %root.id, depth, "converted system trace");
        Ok(RecursiveTrace::new(root, depth))
    }

    /// Flatten this trace back into a system-native step log, level order,
    /// children in their recorded order. Inverse of [`Self::from_system`]
    /// up to step ordering.
    pub fn flatten(&self) -> SystemTrace {
        let mut steps = Vec::new();
        let mut queue: VecDeque<(&TraceNode, Option<String>)> = VecDeque::new();
        queue.push_back((&self.root, None));
        while let Some((node, parent)) = queue.pop_front() {
            steps.push(SystemStep {
                id: node.id.clone(),
                parent,
                kind: node.kind.clone(),
                content: node.content.clone(),
                metadata: node.metadata.clone(),
            });
            for child in &node.children {
                queue.push_back((child, Some(node.id.clone())));
            }
        }
        SystemTrace { steps }
    }
}

/// Flat trace representation emitted by an instrumented system: an ordered
/// step log with parent links instead of owned children.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemTrace {
    pub steps: Vec<SystemStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStep {
    pub id: String,
    /// `None` marks the root step.
    pub parent: Option<String>,
    pub kind: NodeKind,
    pub content: Value,
    pub metadata: Metadata,
}

impl SystemStep {
    pub fn root(id: impl Into<String>, content: Value) -> Self {
        Self {
            id: id.into(),
            parent: None,
            kind: NodeKind::Input,
            content,
            metadata: Metadata::new(),
        }
    }

    pub fn child(id: impl Into<String>, parent: impl Into<String>, content: Value) -> Self {
        Self {
            id: id.into(),
            parent: Some(parent.into()),
            kind: NodeKind::Transformation,
            content,
            metadata: Metadata::new(),
        }
    }
}
