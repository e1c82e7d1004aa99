//! Collapsed view of an analyzed dendrogram.

use crate::model::{Dendrogram, NodeIndex, NodeStatus};
use tracing::debug;

/// Display name given to mixed internal nodes of the summary.
pub const UNRESOLVED_CLADE_NAME: &str = "clade";

/// Returns the display name of a collapsed pure node:
/// `{majority}-{purity}-{number of leaves}`, purity with two decimals.
///
/// # Example
/// ```
/// # use cladecheck::analysis::collapsed_name;
/// assert_eq!(collapsed_name("Apterygidae", 0.9, 10), "Apterygidae-0.90-10");
/// ```
pub fn collapsed_name(majority: &str, purity: f64, num_leaves: usize) -> String {
    format!("{majority}-{purity:.2}-{num_leaves}")
}

/// Builds a new, independent dendrogram from the analyzed `tree`:
/// - every [Pure](NodeStatus::Pure) node becomes a leaf named by
///   [collapsed_name], its subtree dropped
/// - every other internal node keeps its two children and is named
///   [UNRESOLVED_CLADE_NAME]
/// - every other leaf is copied with its display name
///
/// Branch lengths and analysis annotations are copied along. `tree`
/// itself is left untouched.
///
/// # Example
/// ```
/// use cladecheck::analysis::{PurityAnalyzer, summarize};
/// use cladecheck::classification::{ClassificationTable, annotate_leaves};
/// use cladecheck::config::AnalysisConfig;
/// use cladecheck::linkage::{MergeEvent, build_dendrogram};
/// use cladecheck::newick::to_newick;
///
/// let events = [MergeEvent::new(0, 1, 0.1, 2), MergeEvent::new(3, 2, 0.3, 3)];
/// let mut tree = build_dendrogram(&events, &["0_a", "1_b", "2_c"]).unwrap();
/// let table: ClassificationTable = [("0", "X"), ("1", "X"), ("2", "Y")].into_iter().collect();
/// annotate_leaves(&mut tree, &table);
/// PurityAnalyzer::new(AnalysisConfig::default().with_min_sample_count(2)).analyze(&mut tree);
///
/// let summary = summarize(&tree);
/// assert_eq!(to_newick(&summary), "(X-1.00-2:0.2000,2_c:0.3000);");
/// assert_eq!(tree.num_leaves(), 3);
/// ```
pub fn summarize(tree: &Dendrogram) -> Dendrogram {
    let mut summary = Dendrogram::with_capacity(tree.num_leaves());
    if !tree.is_root_set() {
        return summary;
    }

    // Pre-order of the kept nodes, not descending below pure nodes
    let mut order: Vec<NodeIndex> = Vec::new();
    let mut stack = vec![tree.root_index()];
    while let Some(index) = stack.pop() {
        order.push(index);
        let node = &tree[index];
        if node.status() != NodeStatus::Pure {
            if let Some((left, right)) = node.children() {
                stack.push(right);
                stack.push(left);
            }
        }
    }

    // Reversed pre-order visits all descendants before a node
    let mut new_index: Vec<Option<NodeIndex>> = vec![None; tree.num_nodes()];
    let mut num_collapsed = 0;
    for &index in order.iter().rev() {
        let node = &tree[index];
        let branch_length = node.branch_length();

        let copy = match node.children() {
            _ if node.status() == NodeStatus::Pure => {
                num_collapsed += 1;
                let name = collapsed_name(
                    node.majority().unwrap_or_default(),
                    node.purity().unwrap_or_default(),
                    tree.num_leaves_below(index),
                );
                summary.add_leaf(Some(name), branch_length)
            }
            Some((left, right)) => {
                let children = match (new_index[left], new_index[right]) {
                    (Some(left), Some(right)) => (left, right),
                    _ => unreachable!("children are copied before their parent"),
                };
                let copy = summary.add_internal(children, branch_length);
                summary[copy].set_name(UNRESOLVED_CLADE_NAME.to_string());
                copy
            }
            None => summary.add_leaf(node.name().map(str::to_string), branch_length),
        };

        summary[copy].copy_annotations_from(node);
        new_index[index] = Some(copy);
    }

    if let Some(root) = new_index[tree.root_index()] {
        summary.set_root(root);
    }
    debug!(
        collapsed = num_collapsed,
        leaves = summary.num_leaves(),
        "summarized dendrogram"
    );

    summary
}
