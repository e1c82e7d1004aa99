//! Data model for dendrograms.
//!
//! # Tree representation
//! Trees are represented by [Dendrogram], which uses the arena pattern to
//! store [Node]s referenced by [NodeIndex]. A node is either a leaf or an
//! internal node with exactly two children.
//!
//! Besides structure, each [Node] carries a fixed set of annotation fields
//! that the analysis passes fill in:
//!
//! | Field | Set by | Type |
//! |-------|--------|------|
//! | classification | [crate::classification::annotate_leaves] | [Classification] |
//! | status | [crate::analysis::PurityAnalyzer] | [NodeStatus] |
//! | purity, majority | [crate::analysis::PurityAnalyzer] | `f64`, `String` |
//!
//! [crate::analysis::mark_outliers] prefixes the display names of outlier
//! leaves.

pub mod dendrogram;
pub mod node;

pub use dendrogram::Dendrogram;
pub use dendrogram::NodeIndex;
pub use node::BranchLength;
pub use node::Classification;
pub use node::Node;
pub use node::NodeKind;
pub use node::NodeStatus;
