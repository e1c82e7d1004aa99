//! Marking of leaves that disagree with the majority of their pure clade.

use crate::analysis::purity::LabelCounts;
use crate::model::{Dendrogram, NodeIndex, NodeStatus};
use tracing::{debug, info, instrument};

/// Prefix added to the display name of an outlier leaf.
pub const OUTLIER_MARKER: &str = "🔺";

/// Leaf of a pure clade whose label differs from the clade's majority.
#[derive(Debug, Clone, PartialEq)]
pub struct Outlier {
    /// Index of the outlier leaf
    pub leaf: NodeIndex,
    /// Index of the pure clade containing it
    pub clade: NodeIndex,
    /// Label of the leaf
    pub label: String,
    /// Majority label of the clade
    pub majority: String,
}

/// Visits every node of `tree` and marks the outliers of each
/// [Pure](NodeStatus::Pure) node, see [mark_clade_outliers].
///
/// Running this again does not change any display name.
///
/// # Returns
/// All outliers, including those already marked by an earlier run.
#[instrument(level = "debug", skip_all)]
pub fn mark_outliers(tree: &mut Dendrogram) -> Vec<Outlier> {
    let pure_nodes: Vec<NodeIndex> = tree
        .pre_order_iter()
        .filter(|node| node.status() == NodeStatus::Pure)
        .map(|node| node.index())
        .collect();

    let outliers: Vec<Outlier> = pure_nodes
        .into_iter()
        .flat_map(|clade| mark_clade_outliers(tree, clade))
        .collect();

    debug!(outliers = outliers.len(), "outlier marking done");
    outliers
}

/// Marks the outliers below the pure node `clade`: every leaf with a known
/// label other than the (recomputed) majority label gets its display name
/// prefixed with [OUTLIER_MARKER], unless it already is. Labels are left
/// unchanged. Leaves without a known label are not outliers.
///
/// Does nothing if `clade` is not [Pure](NodeStatus::Pure).
pub fn mark_clade_outliers(tree: &mut Dendrogram, clade: NodeIndex) -> Vec<Outlier> {
    if tree[clade].status() != NodeStatus::Pure {
        return Vec::new();
    }

    let outliers: Vec<Outlier> = {
        let counts = LabelCounts::of_subtree(tree, clade);
        let Some((majority, _)) = counts.majority() else {
            return Vec::new();
        };

        tree.leaves_of(clade)
            .filter_map(|leaf| {
                let label = leaf.known_label()?;
                (label != majority).then(|| Outlier {
                    leaf: leaf.index(),
                    clade,
                    label: label.to_string(),
                    majority: majority.to_string(),
                })
            })
            .collect()
    };

    for outlier in &outliers {
        let leaf = &mut tree[outlier.leaf];
        let name = leaf.name().unwrap_or_default();
        if !name.starts_with(OUTLIER_MARKER) {
            info!(
                leaf = name,
                clade,
                label = %outlier.label,
                majority = %outlier.majority,
                "outlier"
            );
            let marked = format!("{OUTLIER_MARKER}{name}");
            leaf.set_name(marked);
        }
    }

    outliers
}
