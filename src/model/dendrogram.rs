//! Provides the arena-based [Dendrogram] together with its stack-based
//! iterators.
//!
//! * [Dendrogram] - rooted binary tree stored in a contiguous arena of [Node]s
//! * [NodeIndex] - type used to index nodes in the arena
//! * [PreOrderIter], [PostOrderIter], [LeafIter] - traversals that do not
//!   recurse, so trees with thousands of leaves and a caterpillar shape
//!   are fine

use crate::model::node::{BranchLength, Node};

/// Float comparison tolerance
const EPSILON: f64 = 1e-7;

/// Index of a node in a dendrogram (arena).
pub type NodeIndex = usize;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: NodeIndex = usize::MAX;

// =$========================================================================$=
// DENDROGRAM
// =$========================================================================$=
/// A rooted binary tree represented using the arena pattern on [Node].
///
/// Nodes are stored in a contiguous vector and referenced by [NodeIndex],
/// so a node exclusively owns its children without any shared references,
/// and [`Clone`] yields a genuine deep copy.
///
/// # Structure
/// - All nodes (root, internal, and leaves) are stored in the arena.
/// - Index of root is maintained.
/// - No assumption on order of indices is maintained in general;
///   trees built from merge events put item `i` at index `i`
///   (see [crate::linkage]).
/// - Branch lengths are optional, but if provided must be non-negative.
///
/// # Construction
/// Add leaves first, then internal nodes referencing already added nodes,
/// and finally set the root. Test validity with [`Dendrogram::is_valid()`].
#[derive(Debug, Clone)]
pub struct Dendrogram {
    /// Nodes of this tree (arena pattern)
    nodes: Vec<Node>,

    /// Index of the root of this tree
    root_index: NodeIndex,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl Dendrogram {
    /// Creates a new empty dendrogram with capacity for a binary tree with
    /// `num_leaves` leaves.
    pub fn with_capacity(num_leaves: usize) -> Self {
        let capacity = (2 * num_leaves).saturating_sub(1);
        Dendrogram {
            nodes: Vec::with_capacity(capacity),
            root_index: NO_ROOT_SET_INDEX,
        }
    }

    /// Adds a leaf, assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `name` - Optional display name of the leaf
    /// * `branch_length` - Length of incoming branch (non-negative)
    pub fn add_leaf(&mut self, name: Option<String>, branch_length: Option<BranchLength>) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(Node::new_leaf(index, name, branch_length));
        index
    }

    /// Adds an internal node, assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `children` - Tuple of child indices (must already exist)
    /// * `branch_length` - Length of incoming branch (non-negative)
    ///
    /// # Panics
    /// Panics if a child index is out of bounds.
    pub fn add_internal(
        &mut self,
        children: (NodeIndex, NodeIndex),
        branch_length: Option<BranchLength>,
    ) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(Node::new_internal(index, children, branch_length));

        self[children.0].set_parent(index);
        self[children.1].set_parent(index);

        index
    }

    /// Declares the node at `index` as root.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn set_root(&mut self, index: NodeIndex) {
        assert!(index < self.nodes.len(), "Root index {index} out of bounds");
        self.root_index = index;
    }

    /// Returns whether root of tree has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns a reference to the root node.
    ///
    /// # Panics
    /// Panics if the root hasn't been set and thus tree hasn't been fully constructed yet.
    pub fn root(&self) -> &Node {
        &self[self.root_index]
    }

    /// Returns the index of the root.
    pub fn root_index(&self) -> NodeIndex {
        self.root_index
    }

    /// Returns a reference to the node at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self[index]
    }

    /// Returns a mutable reference to the node at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.nodes[index]
    }

    /// Returns all nodes in arena order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the number of leaves in this tree.
    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|&n| n.is_leaf()).count()
    }

    /// Returns the number of internal nodes (root included) in this tree.
    pub fn num_internal(&self) -> usize {
        self.nodes.iter().filter(|&n| n.is_internal()).count()
    }

    /// Returns the number of nodes in this tree.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of leaves in the subtree rooted at `index`.
    pub fn num_leaves_below(&self, index: NodeIndex) -> usize {
        self.leaves_of(index).count()
    }

    /// Returns the height of this tree (assuming it is ultrametric; undefined otherwise),
    /// that is, the distance of the root to any/each leaf.
    pub fn height(&self) -> f64 {
        self.height_of(self.root_index)
    }

    /// Returns the height of the given node (assuming the subtree is
    /// ultrametric; result undefined otherwise), that is, the distance of the
    /// given node to any/each leaf below it.
    ///
    /// For a tree built from merge events this is the merge height of the
    /// corresponding cluster, up to the rounding of the branch lengths.
    ///
    /// Missing branch lengths count as zero.
    pub fn height_of(&self, index: NodeIndex) -> f64 {
        let mut height = 0.0;
        let mut current = &self[index];
        while let Some((left, _)) = current.children() {
            current = &self[left];
            height += current.branch_length().map_or(0.0, |bl| *bl);
        }

        height
    }

    /// Checks if the tree is ultrametric (all leaves equidistant from root).
    ///
    /// Missing branch lengths count as zero.
    pub fn is_ultrametric(&self) -> bool {
        // Store distance from leaves in subtree to parent for each node
        let mut distances = vec![0.0; self.num_nodes()];

        for node in self.post_order_iter() {
            let own = node.branch_length().map_or(0.0, |bl| *bl);
            match node.children() {
                None => distances[node.index()] = own,
                Some((left, right)) => {
                    if (distances[left] - distances[right]).abs() > EPSILON {
                        return false;
                    }
                    distances[node.index()] = distances[left] + own;
                }
            }
        }

        true
    }

    /// Returns the sum of all branch lengths in the tree.
    pub fn total_branch_length(&self) -> f64 {
        self.nodes
            .iter()
            .filter_map(|n| n.branch_length())
            .map(|bl| *bl)
            .sum::<f64>()
    }

    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Root index is set and valid and the root has no parent
    /// - All node indices match their position in the arena
    /// - All child indices are valid and point back to correct parent
    /// - All non-root nodes have a parent
    /// - Number of leaves matches binary tree invariant (`n` leaves, `2n - 1` nodes)
    /// - Classifications are only set on leaves
    ///
    /// # Returns
    /// `true` if tree is valid, `false` otherwise
    pub fn is_valid(&self) -> bool {
        if !self.is_root_set() || self.root_index >= self.nodes.len() {
            return false;
        }
        if !self[self.root_index].is_root() {
            return false;
        }

        let mut leaf_count = 0;
        for (index, node) in self.nodes.iter().enumerate() {
            if node.index() != index {
                return false;
            }

            if node.is_leaf() {
                leaf_count += 1;
            } else if node.classification().is_some() {
                return false;
            }

            if let Some((left, right)) = node.children() {
                if left >= self.nodes.len() || right >= self.nodes.len() || left == right {
                    return false;
                }
                if self[left].parent_index() != Some(index)
                    || self[right].parent_index() != Some(index)
                {
                    return false;
                }
            }

            // Only the root may lack a parent
            if index != self.root_index && node.parent_index().is_none() {
                return false;
            }
        }

        leaf_count == self.nodes.len().div_ceil(2)
    }
}

impl std::ops::Index<NodeIndex> for Dendrogram {
    type Output = Node;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index]
    }
}

impl std::ops::IndexMut<NodeIndex> for Dendrogram {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[index]
    }
}

// =$========================================================================$=
// ITERATORS
// =$========================================================================$=
impl Dendrogram {
    /// Returns an iterator over the tree in post-order (children before parents).
    ///
    /// # Example
    /// ```
    /// use cladecheck::model::Dendrogram;
    ///
    /// let mut tree = Dendrogram::with_capacity(2);
    /// let a = tree.add_leaf(Some("a".to_string()), None);
    /// let b = tree.add_leaf(Some("b".to_string()), None);
    /// let root = tree.add_internal((a, b), None);
    /// tree.set_root(root);
    ///
    /// let indices: Vec<_> = tree.post_order_iter().map(|n| n.index()).collect();
    /// assert_eq!(indices, vec![a, b, root]);
    /// ```
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self, self.root_index)
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    ///
    /// # Example
    /// ```
    /// use cladecheck::model::Dendrogram;
    ///
    /// let mut tree = Dendrogram::with_capacity(2);
    /// let a = tree.add_leaf(Some("a".to_string()), None);
    /// let b = tree.add_leaf(Some("b".to_string()), None);
    /// let root = tree.add_internal((a, b), None);
    /// tree.set_root(root);
    ///
    /// let indices: Vec<_> = tree.pre_order_iter().map(|n| n.index()).collect();
    /// assert_eq!(indices, vec![root, a, b]);
    /// ```
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self, self.root_index)
    }

    /// Returns an iterator over the leaves of the whole tree, left to right.
    pub fn leaves(&self) -> LeafIter<'_> {
        LeafIter::new(self, self.root_index)
    }

    /// Returns an iterator over the leaves in the subtree rooted at `index`,
    /// left to right.
    pub fn leaves_of(&self, index: NodeIndex) -> LeafIter<'_> {
        LeafIter::new(self, index)
    }
}

/// Iterator for post-order traversal (children before parents).
///
/// Uses a stack instead of recursion.
/// Each node is visited after all its descendants have been visited.
pub struct PostOrderIter<'a> {
    tree: &'a Dendrogram,
    stack: Vec<(NodeIndex, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a Dendrogram, start: NodeIndex) -> Self {
        let mut stack = Vec::new();
        if start < tree.num_nodes() {
            stack.push((start, false));
        }
        PostOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let node = &self.tree[index];

            match node.children() {
                Some((left, right)) if !children_visited => {
                    self.stack.push((index, true));
                    // Right first, so left is processed first
                    self.stack.push((right, false));
                    self.stack.push((left, false));
                }
                _ => return Some(node),
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// Uses a stack instead of recursion.
/// Each node is visited before any of its descendants.
pub struct PreOrderIter<'a> {
    tree: &'a Dendrogram,
    stack: Vec<NodeIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a Dendrogram, start: NodeIndex) -> Self {
        let mut stack = Vec::new();
        if start < tree.num_nodes() {
            stack.push(start);
        }
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree[index];

        // Right first, so left is processed first
        if let Some((left, right)) = node.children() {
            self.stack.push(right);
            self.stack.push(left);
        }

        Some(node)
    }
}

/// Iterator over the leaves of a subtree, left to right.
pub struct LeafIter<'a> {
    inner: PreOrderIter<'a>,
}

impl<'a> LeafIter<'a> {
    fn new(tree: &'a Dendrogram, start: NodeIndex) -> Self {
        LeafIter {
            inner: PreOrderIter::new(tree, start),
        }
    }
}

impl<'a> Iterator for LeafIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find(|node| node.is_leaf())
    }
}
