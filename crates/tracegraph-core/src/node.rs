use crate::{Metadata, NodeKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single step in a recursive trace.
///
/// Children are exclusively owned, so a `TraceNode` is always a strict tree:
/// no sharing between parents and no cycles. Child order is preserved and is
/// meaningful (sequential-chain detection relies on it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceNode {
    /// Identifier, unique within a trace by construction (not enforced).
    pub id: String,
    pub kind: NodeKind,
    /// Opaque payload: the input, operation, or result this step carries.
    pub content: Value,
    pub metadata: Metadata,
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            content: Value::Null,
            metadata: Metadata::new(),
            children: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: Value) -> Self {
        self.content = content;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_child(mut self, child: TraceNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: TraceNode) {
        self.children.push(child);
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl Drop for TraceNode {
    fn drop(&mut self) {
        // Dropping a node drops its children; done naively that recurses as
        // deep as the tree. Flatten the subtree into a worklist instead so
        // traces tens of thousands of levels deep can be freed safely.
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_chain_sets_fields() {
        let node = TraceNode::new("input_0", NodeKind::Input)
            .with_content(json!({"query": "hello"}))
            .with_metadata("depth", json!(0))
            .with_child(TraceNode::new("input_0_step_0", NodeKind::Transformation));

        assert_eq!(node.id, "input_0");
        assert_eq!(node.content, json!({"query": "hello"}));
        assert_eq!(node.metadata.get("depth"), Some(&json!(0)));
        assert_eq!(node.children.len(), 1);
        assert!(!node.is_leaf());
        assert!(node.children[0].is_leaf());
    }
}
