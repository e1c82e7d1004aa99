//! Top-down purity analysis with early stopping.

use crate::config::AnalysisConfig;
use crate::model::{Dendrogram, NodeIndex, NodeStatus};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, trace};

// =#========================================================================#=
// LABEL COUNTS
// =#========================================================================#=
/// Frequencies of the known classification labels among the leaves of a
/// subtree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelCounts<'a> {
    counts: BTreeMap<&'a str, usize>,
    num_leaves: usize,
}

impl<'a> LabelCounts<'a> {
    /// Counts the labels of all leaves below (and including) `index`.
    pub fn of_subtree(tree: &'a Dendrogram, index: NodeIndex) -> Self {
        let mut label_counts = LabelCounts::default();
        for leaf in tree.leaves_of(index) {
            label_counts.num_leaves += 1;
            if let Some(label) = leaf.known_label() {
                *label_counts.counts.entry(label).or_insert(0) += 1;
            }
        }
        label_counts
    }

    /// Returns the number of leaves counted, known label or not.
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// Returns the number of leaves with a known label.
    pub fn num_known(&self) -> usize {
        self.counts.values().sum()
    }

    /// Returns how many leaves carry `label`.
    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Returns the most frequent label with its count, `None` if no leaf has
    /// a known label.
    ///
    /// Ties go to the lexicographically smallest label.
    pub fn majority(&self) -> Option<(&'a str, usize)> {
        let mut best: Option<(&'a str, usize)> = None;
        // BTreeMap iterates labels in ascending order, so only a strictly
        // larger count replaces the current best
        for (&label, &count) in &self.counts {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((label, count));
            }
        }
        best
    }

    /// Returns the share of known-label leaves carrying the majority label,
    /// `0.0` if there are none.
    pub fn purity(&self) -> f64 {
        match self.majority() {
            Some((_, count)) => count as f64 / self.num_known() as f64,
            None => 0.0,
        }
    }
}

/// Purity, majority label and counts of a subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct Purity {
    /// Share of known-label leaves carrying the majority label, in `[0, 1]`
    pub purity: f64,
    /// Most frequent known label; `None` iff no leaf has a known label
    pub majority: Option<String>,
    /// Leaves with a known label
    pub num_known: usize,
    /// All leaves
    pub num_leaves: usize,
}

/// Computes the [Purity] of the subtree rooted at `index`.
///
/// Leaves without a known label count towards `num_leaves` only.
pub fn compute_purity(tree: &Dendrogram, index: NodeIndex) -> Purity {
    let counts = LabelCounts::of_subtree(tree, index);
    Purity {
        purity: counts.purity(),
        majority: counts.majority().map(|(label, _)| label.to_string()),
        num_known: counts.num_known(),
        num_leaves: counts.num_leaves(),
    }
}

// =#========================================================================#=
// PURITY ANALYZER
// =#========================================================================#=
/// Clade found pure by the [PurityAnalyzer].
#[derive(Debug, Clone, PartialEq)]
pub struct PureClade {
    /// Index of the pure node
    pub node: NodeIndex,
    /// Purity of the node, at least the configured threshold
    pub purity: f64,
    /// Majority label of the node
    pub majority: String,
    /// Leaves with a known label
    pub num_known: usize,
    /// All leaves
    pub num_leaves: usize,
}

/// Walks a classified dendrogram from the root and marks each visited node
/// [Pure](NodeStatus::Pure) or [Mixed](NodeStatus::Mixed).
///
/// A node is pure if at least `min_sample_count` of its leaves carry a known
/// label and its purity reaches `purity_threshold`. The walk stops at pure
/// nodes, so their descendants keep status [Unset](NodeStatus::Unset); it
/// continues into both children of mixed nodes. Nodes are visited in
/// pre-order with an explicit stack, each exactly once.
///
/// # Example
/// ```
/// use cladecheck::analysis::PurityAnalyzer;
/// use cladecheck::classification::{ClassificationTable, annotate_leaves};
/// use cladecheck::config::AnalysisConfig;
/// use cladecheck::linkage::{MergeEvent, build_dendrogram};
/// use cladecheck::model::NodeStatus;
///
/// let names = ["0_a", "1_b", "2_c"];
/// let events = [MergeEvent::new(0, 1, 0.1, 2), MergeEvent::new(3, 2, 0.2, 3)];
/// let mut tree = build_dendrogram(&events, &names).unwrap();
/// let table: ClassificationTable = [("0", "X"), ("1", "X"), ("2", "Y")].into_iter().collect();
/// annotate_leaves(&mut tree, &table);
///
/// let config = AnalysisConfig::default().with_min_sample_count(2);
/// let pure = PurityAnalyzer::new(config).analyze(&mut tree);
///
/// assert_eq!(pure.len(), 1);
/// assert_eq!(pure[0].node, 3);
/// assert_eq!(tree.root().status(), NodeStatus::Mixed);
/// ```
#[derive(Debug, Clone)]
pub struct PurityAnalyzer {
    config: AnalysisConfig,
}

impl PurityAnalyzer {
    /// Creates an analyzer using the thresholds of `config`.
    pub fn new(config: AnalysisConfig) -> Self {
        PurityAnalyzer { config }
    }

    /// Returns the configuration of this analyzer.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Returns whether a node with the given counts satisfies the stopping rule.
    ///
    /// A node without any known label is never pure, whatever the thresholds.
    pub fn is_pure(&self, purity: &Purity) -> bool {
        purity.majority.is_some()
            && purity.num_known >= self.config.min_sample_count
            && purity.purity >= self.config.purity_threshold
    }

    /// Runs the analysis on `tree`, replacing any earlier analysis results.
    ///
    /// # Returns
    /// The pure clades, in the order they were found (pre-order).
    #[instrument(level = "debug", skip_all, fields(
        purity_threshold = self.config.purity_threshold,
        min_sample_count = self.config.min_sample_count,
    ))]
    pub fn analyze(&self, tree: &mut Dendrogram) -> Vec<PureClade> {
        for index in 0..tree.num_nodes() {
            tree[index].clear_analysis();
        }

        let mut pure_clades = Vec::new();
        let mut num_mixed = 0;
        let mut stack = vec![tree.root_index()];

        while let Some(index) = stack.pop() {
            let purity = compute_purity(tree, index);

            let pure_majority = match &purity.majority {
                Some(majority) if self.is_pure(&purity) => Some(majority.clone()),
                _ => None,
            };

            if let Some(majority) = pure_majority {
                info!(
                    node = index,
                    leaves = purity.num_leaves,
                    purity = purity.purity,
                    majority = %majority,
                    "pure clade"
                );
                pure_clades.push(PureClade {
                    node: index,
                    purity: purity.purity,
                    majority,
                    num_known: purity.num_known,
                    num_leaves: purity.num_leaves,
                });
                tree[index].set_analysis(NodeStatus::Pure, purity.purity, purity.majority);
            } else {
                trace!(node = index, known = purity.num_known, purity = purity.purity, "mixed");
                num_mixed += 1;
                tree[index].set_analysis(NodeStatus::Mixed, purity.purity, purity.majority);

                // Right first, so left is processed first
                if let Some((left, right)) = tree[index].children() {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        debug!(pure = pure_clades.len(), mixed = num_mixed, "purity analysis done");
        pure_clades
    }
}
