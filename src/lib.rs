//! Cladecheck turns the merge events of a hierarchical clustering into a
//! dendrogram and checks how well its clusters agree with an independent
//! ground-truth classification (e.g. taxonomic family or order).
//!
//! Core functionality provided:
//! - Linkage: build a [Dendrogram] from an ordered sequence of
//!   [MergeEvent]s, validating the sequence (see [crate::linkage]).
//! - Newick: write a dendrogram with four-decimal branch lengths and parse
//!   Newick strings back (see [crate::newick]).
//! - Classification: attach ground-truth labels to leaves by key lookup
//!   (see [crate::classification]).
//! - Analysis: top-down purity check with early stopping, outlier marking
//!   within pure clades, and a collapsed summary tree
//!   (see [crate::analysis]).
//! - Model: arena-based tree with a fixed set of annotation fields per node,
//!   and stack-based traversals (see [crate::model]).
//!
//! Limitations:
//! - Only binary trees
//! - Computing the similarity matrix, running the clustering, and rendering
//!   the annotated tree are left to other tools
//!
//! # Example
//! ```
//! use cladecheck::analyze_linkage;
//! use cladecheck::classification::ClassificationTable;
//! use cladecheck::config::AnalysisConfig;
//! use cladecheck::linkage::MergeEvent;
//!
//! let names = ["0_Apteryx_owenii", "1_Apteryx_haastii", "2_Casuarius_casuarius"];
//! let events = [MergeEvent::new(0, 1, 0.1, 2), MergeEvent::new(3, 2, 0.5, 3)];
//! let table: ClassificationTable =
//!     [("0", "Apterygidae"), ("1", "Apterygidae"), ("2", "Casuariidae")].into_iter().collect();
//! let config = AnalysisConfig::default().with_min_sample_count(2);
//!
//! let analysis = analyze_linkage(&events, &names, &table, &config)?;
//! assert_eq!(
//!     analysis.newick,
//!     "((0_Apteryx_owenii:0.1000,1_Apteryx_haastii:0.1000):0.4000,2_Casuarius_casuarius:0.5000);"
//! );
//! assert_eq!(analysis.report.pure_clades.len(), 1);
//! assert_eq!(analysis.report.pure_clades[0].majority, "Apterygidae");
//! # Ok::<(), cladecheck::Error>(())
//! ```

pub mod analysis;
pub mod classification;
pub mod config;
pub mod errors;
pub mod linkage;
pub mod model;
pub mod newick;
pub mod parser;

pub use errors::{Error, Result};

use crate::analysis::AnalysisReport;
use crate::classification::ClassificationTable;
use crate::config::AnalysisConfig;
use crate::linkage::MergeEvent;
use crate::model::Dendrogram;

/// Dendrogram built from merge events, its Newick serialization, and the
/// analysis results.
#[derive(Debug, Clone)]
pub struct LinkageAnalysis {
    /// The analyzed dendrogram, annotations and marked outliers included
    pub tree: Dendrogram,
    /// Newick serialization of the dendrogram, taken before analysis
    pub newick: String,
    /// Results of the analysis
    pub report: AnalysisReport,
}

// ============================================================================
// Quick API
// ============================================================================
/// Builds the dendrogram of `events` over items `names`, serializes it to
/// Newick, and runs the full analysis (see [`analysis::run`]).
///
/// # Errors
/// Fails on an invalid `config` or an invalid merge-event sequence, before
/// any analysis is done.
pub fn analyze_linkage<S: AsRef<str>>(
    events: &[MergeEvent],
    names: &[S],
    table: &ClassificationTable,
    config: &AnalysisConfig,
) -> Result<LinkageAnalysis> {
    config.validate()?;

    let mut tree = linkage::build_dendrogram(events, names)?;
    let newick = newick::to_newick(&tree);
    let report = analysis::run(&mut tree, table, config)?;

    Ok(LinkageAnalysis {
        tree,
        newick,
        report,
    })
}

/// Parses a Newick string and runs the full analysis on it
/// (see [`analysis::run`]).
pub fn analyze_newick<S: AsRef<str>>(
    newick: S,
    table: &ClassificationTable,
    config: &AnalysisConfig,
) -> Result<(Dendrogram, AnalysisReport)> {
    config.validate()?;

    let mut tree = newick::parse_str(newick)?;
    let report = analysis::run(&mut tree, table, config)?;
    Ok((tree, report))
}
