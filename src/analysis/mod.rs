//! Consistency analysis of a dendrogram against a ground-truth classification.
//!
//! The analysis runs in passes over a [Dendrogram] whose leaves have been
//! classified (see [crate::classification]):
//!
//! 1. [PurityAnalyzer] - top-down walk marking nodes pure or mixed,
//!    stopping at pure nodes
//! 2. [mark_outliers] - flags leaves of pure nodes whose label disagrees
//!    with the node's majority
//! 3. [summarize] - builds a separate, collapsed copy for reporting
//!
//! [run] performs all of them (classification included) in one call.

mod outlier;
mod purity;
mod summary;

pub use outlier::{OUTLIER_MARKER, Outlier, mark_clade_outliers, mark_outliers};
pub use purity::{LabelCounts, PureClade, Purity, PurityAnalyzer, compute_purity};
pub use summary::{UNRESOLVED_CLADE_NAME, collapsed_name, summarize};

use crate::classification::{ClassificationTable, annotate_leaves};
use crate::config::{AnalysisConfig, ConfigError};
use crate::errors::Result;
use crate::model::Dendrogram;
use tracing::{info, instrument};

/// Results of a full analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Pure clades in pre-order
    pub pure_clades: Vec<PureClade>,
    /// Outlier leaves of all pure clades
    pub outliers: Vec<Outlier>,
    /// Collapsed copy of the analyzed tree
    pub summary: Dendrogram,
    /// Leaves that received a known label
    pub num_known_leaves: usize,
}

/// Classifies the leaves of `tree` with `table`, runs the purity analysis
/// with the thresholds of `config`, marks outliers and builds the summary.
///
/// `tree` keeps all annotations (and marked outlier names) afterwards.
///
/// # Errors
/// Returns a configuration error, before touching the tree, if `config` is
/// invalid or its level differs from the level `table` was built for.
#[instrument(level = "debug", skip_all)]
pub fn run(
    tree: &mut Dendrogram,
    table: &ClassificationTable,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    config.validate()?;
    if let Some(table_level) = table.level() {
        if table_level != config.level {
            return Err(ConfigError::LevelMismatch {
                config: config.level,
                table: table_level,
            }
            .into());
        }
    }

    let num_known_leaves = annotate_leaves(tree, table);
    let pure_clades = PurityAnalyzer::new(*config).analyze(tree);
    let outliers = mark_outliers(tree);
    let summary = summarize(tree);

    info!(
        classification_level = %config.level,
        leaves = tree.num_leaves(),
        pure_clades = pure_clades.len(),
        outliers = outliers.len(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        pure_clades,
        outliers,
        summary,
        num_known_leaves,
    })
}
