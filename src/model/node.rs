//! Node type of a [Dendrogram](crate::model::Dendrogram), together with
//! the [BranchLength] newtype and the per-node annotation types.

use crate::model::dendrogram::NodeIndex;
use std::fmt;
use std::ops::Deref;

// =#========================================================================#=
// NODE
// =#========================================================================#=
/// Represents a node in a dendrogram.
///
/// A node is either a leaf (an original item) or an internal node with
/// exactly two children (a cluster). Besides structure, every node carries
/// a fixed set of annotation fields filled in by the analysis passes:
/// - `classification` - set on leaves by the annotator
/// - `status`, `purity`, `majority` - set by the purity analysis
///
/// # Invariants
/// - `index` is index in arena
/// - `branch_length` is non-negative (enforced by [BranchLength]);
///   the root has none
/// - Internal nodes have exactly two children, leaves none
/// - `classification` is only ever set on leaves
#[derive(PartialEq, Debug, Clone)]
pub struct Node {
    /// Index of this node in the dendrogram arena
    index: NodeIndex,
    /// Index of the parent node, `None` for the root (and during construction)
    parent: Option<NodeIndex>,
    /// Leaf or internal node with its children
    kind: NodeKind,
    /// Display name, e.g. item name for leaves
    name: Option<String>,
    /// Distance to parent node
    branch_length: Option<BranchLength>,
    /// Ground-truth classification (leaves only)
    classification: Option<Classification>,
    /// Outcome of the purity analysis
    status: NodeStatus,
    /// Purity computed by the analysis, in `[0, 1]`
    purity: Option<f64>,
    /// Majority label computed by the analysis
    majority: Option<String>,
}

/// Structural kind of a [Node].
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum NodeKind {
    /// Original item, no children
    Leaf,
    /// Cluster joining exactly two children
    Internal {
        /// Indices of the two child nodes (left, right)
        children: (NodeIndex, NodeIndex),
    },
}

impl Node {
    /// Creates a new leaf node without parent.
    ///
    /// # Arguments
    /// * `index` - The unique index of this node in the dendrogram (arena)
    /// * `name` - Optional display name
    /// * `branch_length` - Distance to parent node (non-negative)
    pub fn new_leaf(
        index: NodeIndex,
        name: Option<String>,
        branch_length: Option<BranchLength>,
    ) -> Self {
        Self::new(index, NodeKind::Leaf, name, branch_length)
    }

    /// Creates a new internal node without parent.
    ///
    /// # Arguments
    /// * `index` - The unique index of this node in the dendrogram (arena)
    /// * `children` - Tuple of child indices
    /// * `branch_length` - Distance to parent node (non-negative)
    pub fn new_internal(
        index: NodeIndex,
        children: (NodeIndex, NodeIndex),
        branch_length: Option<BranchLength>,
    ) -> Self {
        Self::new(index, NodeKind::Internal { children }, None, branch_length)
    }

    fn new(
        index: NodeIndex,
        kind: NodeKind,
        name: Option<String>,
        branch_length: Option<BranchLength>,
    ) -> Self {
        Node {
            index,
            parent: None,
            kind,
            name,
            branch_length,
            classification: None,
            status: NodeStatus::Unset,
            purity: None,
            majority: None,
        }
    }

    /// Returns the index of this node.
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// Returns the structural kind of this node.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns `true` if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    /// Returns `true` if this node is an internal node (root included).
    pub fn is_internal(&self) -> bool {
        matches!(self.kind, NodeKind::Internal { .. })
    }

    /// Returns `true` if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns the children if this is an internal node, else `None`.
    pub fn children(&self) -> Option<(NodeIndex, NodeIndex)> {
        match self.kind {
            NodeKind::Internal { children } => Some(children),
            NodeKind::Leaf => None,
        }
    }

    /// Returns the index of the parent, `None` for the root.
    pub fn parent_index(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Sets the parent of this node.
    pub(crate) fn set_parent(&mut self, parent: NodeIndex) {
        self.parent = Some(parent);
    }

    /// Returns the display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets the display name.
    pub fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Returns the branch length to the parent, if any.
    pub fn branch_length(&self) -> Option<BranchLength> {
        self.branch_length
    }

    /// Returns whether this node has a [BranchLength].
    pub fn has_branch_length(&self) -> bool {
        self.branch_length.is_some()
    }

    /// Sets the branch length to the parent.
    pub(crate) fn set_branch_length(&mut self, branch_length: Option<BranchLength>) {
        self.branch_length = branch_length;
    }

    /// Returns the classification of this leaf, `None` if not annotated
    /// (always `None` for internal nodes).
    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    /// Returns the known classification label of this leaf, if any.
    pub fn known_label(&self) -> Option<&str> {
        match &self.classification {
            Some(Classification::Known(label)) => Some(label),
            _ => None,
        }
    }

    /// Sets the classification of this leaf.
    ///
    /// # Panics
    /// Panics if called on an internal node.
    pub fn set_classification(&mut self, classification: Classification) {
        assert!(self.is_leaf(), "Cannot classify internal node {}", self.index);
        self.classification = Some(classification);
    }

    /// Returns the analysis status of this node.
    pub fn status(&self) -> NodeStatus {
        self.status
    }

    /// Returns the purity computed for this node, if visited.
    pub fn purity(&self) -> Option<f64> {
        self.purity
    }

    /// Returns the majority label computed for this node, if any.
    pub fn majority(&self) -> Option<&str> {
        self.majority.as_deref()
    }

    /// Records the outcome of the purity analysis on this node.
    pub(crate) fn set_analysis(&mut self, status: NodeStatus, purity: f64, majority: Option<String>) {
        self.status = status;
        self.purity = Some(purity);
        self.majority = majority;
    }

    /// Resets status, purity and majority.
    pub(crate) fn clear_analysis(&mut self) {
        self.status = NodeStatus::Unset;
        self.purity = None;
        self.majority = None;
    }

    /// Copies all annotation fields (not structure) from `other`.
    pub(crate) fn copy_annotations_from(&mut self, other: &Node) {
        self.classification = other.classification.clone();
        self.status = other.status;
        self.purity = other.purity;
        self.majority = other.majority.clone();
    }
}

// =#========================================================================#=
// ANNOTATIONS
// =#========================================================================#=
/// Outcome of the purity analysis for a node.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum NodeStatus {
    /// Not visited (e.g. below a pure node)
    #[default]
    Unset,
    /// Enough known labels and purity above threshold; traversal stopped here
    Pure,
    /// Did not satisfy the stopping rule
    Mixed,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Unset => write!(f, "unset"),
            NodeStatus::Pure => write!(f, "pure"),
            NodeStatus::Mixed => write!(f, "mixed"),
        }
    }
}

/// Ground-truth classification of a leaf.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Classification {
    /// Label found in the classification table
    Known(String),
    /// Leaf key has no entry in the classification table
    Unknown,
}

impl Classification {
    /// Returns the label if known.
    pub fn label(&self) -> Option<&str> {
        match self {
            Classification::Known(label) => Some(label),
            Classification::Unknown => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Known(label) => write!(f, "{label}"),
            Classification::Unknown => write!(f, "unknown"),
        }
    }
}

// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Branch length in a dendrogram, enforced non-negative.
///
/// Represents the distance between a node and its parent.
/// The value is guaranteed to be non-negative and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BranchLength(f64);

impl BranchLength {
    /// Creates a new branch length.
    ///
    /// # Arguments
    /// * `length` - The branch length value (must be non-negative)
    ///
    /// # Panics
    /// Panics if `length` is negative or not finite.
    pub fn new(length: f64) -> Self {
        assert!(length >= 0.0, "Branch length must be non-negative, got {}", length);
        assert!(length.is_finite(), "Branch length must be finite, got {}", length);
        // Adding +0.0 turns -0.0 into 0.0
        BranchLength(length + 0.0)
    }

    /// Creates a new branch length, returning `None` if `length` is
    /// negative or not finite.
    pub fn try_new(length: f64) -> Option<Self> {
        (length >= 0.0 && length.is_finite()).then_some(BranchLength(length + 0.0))
    }
}

impl Deref for BranchLength {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl fmt::Display for BranchLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
