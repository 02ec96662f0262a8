//! Arena-backed hierarchy the encoding pass walks
//!
//! Nodes live in a flat `Vec` and reference each other by index, so the
//! parent back-links and ancestor walks the cascade needs carry no
//! ownership cycles. The tree is built by the surrounding pipeline; the
//! encoding pass only reads structure and layout and writes the per-node
//! `visuals` slot.

use std::collections::HashMap;

use crate::color::Rgba;
use crate::config::StyleOptions;

/// Layout facts the encoder consumes; produced by the layout collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub invisible: bool,
    pub is_in_view: bool,
    /// `[min, max]` over the node's children values along the visual
    /// dimension.
    pub data_extent: [f64; 2],
}

impl Default for NodeLayout {
    fn default() -> Self {
        NodeLayout {
            invisible: false,
            is_in_view: true,
            data_extent: [0.0, 0.0],
        }
    }
}

/// The write-only output slot of the tree encoding pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeVisuals {
    pub color: Option<Rgba>,
    pub border_color: Option<Rgba>,
}

/// One hierarchy node.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: String,
    /// True structural depth; the root is 0.
    pub depth: usize,
    /// Item value; may carry several dimensions, `visualDimension`
    /// selects the one mappings read.
    pub value: Vec<f64>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Children currently eligible for traversal; a filtered subset of
    /// `children`.
    pub view_children: Vec<usize>,
    pub removed: bool,
    /// Absent layout means the node is skipped entirely.
    pub layout: Option<NodeLayout>,
    /// The node's own configured options (no inherited values baked in).
    pub options: StyleOptions,
    pub visuals: NodeVisuals,
}

impl TreeNode {
    /// The value component along one dimension; missing dimensions read
    /// as 0.
    pub fn value_along(&self, dimension: usize) -> f64 {
        self.value.get(dimension).copied().unwrap_or_default()
    }
}

/// The hierarchy arena. Index 0 is the structural root.
#[derive(Debug, Clone, Default)]
pub struct TreemapTree {
    nodes: Vec<TreeNode>,
}

impl TreemapTree {
    /// Create a tree containing only a root node.
    pub fn with_root(id: impl Into<String>, value: Vec<f64>, options: StyleOptions) -> Self {
        let mut tree = TreemapTree { nodes: Vec::new() };
        tree.nodes.push(TreeNode {
            id: id.into(),
            depth: 0,
            value,
            parent: None,
            children: Vec::new(),
            view_children: Vec::new(),
            removed: false,
            layout: Some(NodeLayout::default()),
            options,
            visuals: NodeVisuals::default(),
        });
        tree
    }

    /// Append a child under `parent`, registering it as a view child.
    ///
    /// Returns the new node's index. Callers that filter children out of
    /// the navigable view edit `view_children` afterwards.
    pub fn add_child(
        &mut self,
        parent: usize,
        id: impl Into<String>,
        value: Vec<f64>,
        options: StyleOptions,
    ) -> usize {
        let idx = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(TreeNode {
            id: id.into(),
            depth,
            value,
            parent: Some(parent),
            children: Vec::new(),
            view_children: Vec::new(),
            removed: false,
            layout: Some(NodeLayout::default()),
            options,
            visuals: NodeVisuals::default(),
        });
        self.nodes[parent].children.push(idx);
        self.nodes[parent].view_children.push(idx);
        idx
    }

    pub fn root(&self) -> usize {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: usize) -> &TreeNode {
        &self.nodes[idx]
    }

    pub fn node_mut(&mut self, idx: usize) -> &mut TreeNode {
        &mut self.nodes[idx]
    }

    /// Ancestor chain of a node ordered root-first, so that the entry at
    /// position `d` is the ancestor at depth `d`.
    pub fn ancestors(&self, idx: usize, include_self: bool) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut cursor = if include_self {
            Some(idx)
        } else {
            self.nodes[idx].parent
        };
        while let Some(i) = cursor {
            chain.push(i);
            cursor = self.nodes[i].parent;
        }
        chain.reverse();
        chain
    }
}

/// Stable id → ordinal assignment for `colorMappingBy = id`.
///
/// Ids receive sequential indices in first-seen order; repeated lookups
/// return the same index for the life of the map.
#[derive(Debug, Clone, Default)]
pub struct IdIndexMap {
    indices: HashMap<String, usize>,
}

impl IdIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_id_to_index(&mut self, id: &str) -> usize {
        let next = self.indices.len();
        *self.indices.entry(id.to_string()).or_insert(next)
    }
}
