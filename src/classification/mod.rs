//! Ground-truth classification of the items and its attachment to leaves.
//!
//! A [ClassificationTable] maps an item key (the item's row index, as
//! string) to a label such as a taxonomic family or order. Leaves find
//! their key as the part of their display name before the first
//! [KEY_DELIMITER], so a leaf named `0_Struthio_camelus` looks up key `0`.
//!
//! # Example
//! ```
//! use cladecheck::classification::{ClassificationLevel, ClassificationTable, annotate_leaves};
//! use cladecheck::linkage::{MergeEvent, build_dendrogram};
//! use cladecheck::model::Classification;
//!
//! let rows = vec![
//!     vec!["非洲鸵鸟", "Common Ostrich", "Struthio camelus", "STRUTHIONIFORMES", "Struthionidae"],
//!     vec!["鸸鹋", "Emu", "Dromaius novaehollandiae", "CASUARIIFORMES", "Dromaiidae"],
//! ];
//! let table = ClassificationTable::from_rows(rows, ClassificationLevel::Order);
//!
//! let names = ["0_Struthio_camelus", "1_Dromaius_novaehollandiae"];
//! let mut tree = build_dendrogram(&[MergeEvent::new(0, 1, 0.4, 2)], &names).unwrap();
//! annotate_leaves(&mut tree, &table);
//! assert_eq!(
//!     tree[1].classification(),
//!     Some(&Classification::Known("CASUARIIFORMES".to_string()))
//! );
//! ```

use crate::analysis::OUTLIER_MARKER;
use crate::config::ConfigError;
use crate::model::{Classification, Dendrogram};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Separates the item key from the rest of a leaf's display name.
pub const KEY_DELIMITER: char = '_';

// =#========================================================================#=
// CLASSIFICATION LEVEL
// =#========================================================================#=
/// Taxonomic level whose labels are used as ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationLevel {
    /// Taxonomic order, e.g. `STRUTHIONIFORMES`
    Order,
    /// Taxonomic family, e.g. `Struthionidae`
    #[default]
    Family,
}

impl ClassificationLevel {
    /// Column of this level in the item info table, whose rows read
    /// `name (local), name (en), scientific name, order, family`.
    pub fn column(&self) -> usize {
        match self {
            ClassificationLevel::Order => 3,
            ClassificationLevel::Family => 4,
        }
    }
}

/// Accepts exactly the names used in config files: `order` and `family`.
impl FromStr for ClassificationLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(ClassificationLevel::Order),
            "family" => Ok(ClassificationLevel::Family),
            _ => Err(ConfigError::InvalidLevel(s.to_string())),
        }
    }
}

impl fmt::Display for ClassificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationLevel::Order => write!(f, "order"),
            ClassificationLevel::Family => write!(f, "family"),
        }
    }
}

// =#========================================================================#=
// CLASSIFICATION TABLE
// =#========================================================================#=
/// Read-only mapping from item key to classification label.
///
/// A table built by [ClassificationTable::from_rows] remembers its
/// [ClassificationLevel], so the analysis can refuse a configuration asking
/// for another level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationTable {
    labels: HashMap<String, String>,
    level: Option<ClassificationLevel>,
}

impl ClassificationTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from tabular rows of item info, keyed by row index,
    /// taking labels from the column of `level` (see
    /// [ClassificationLevel::column]).
    pub fn from_rows<R, C>(rows: R, level: ClassificationLevel) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<[C]>,
        C: AsRef<str>,
    {
        ClassificationTable {
            level: Some(level),
            ..Self::from_column(rows, level.column())
        }
    }

    /// Builds the table from tabular rows, keyed by row index, taking labels
    /// from `column`.
    ///
    /// Rows without that column or with an empty cell leave their key out
    /// of the table, so affected leaves end up
    /// [Unknown](Classification::Unknown).
    pub fn from_column<R, C>(rows: R, column: usize) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<[C]>,
        C: AsRef<str>,
    {
        let labels = rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let cell = row.as_ref().get(column)?.as_ref().trim();
                (!cell.is_empty()).then(|| (index.to_string(), cell.to_string()))
            })
            .collect();

        ClassificationTable { labels, level: None }
    }

    /// Returns the level the labels were taken from, `None` if the table
    /// was not built by [ClassificationTable::from_rows].
    pub fn level(&self) -> Option<ClassificationLevel> {
        self.level
    }

    /// Returns the label for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Returns the classification for `key`, [Unknown](Classification::Unknown)
    /// if the table has no entry.
    pub fn classify(&self, key: &str) -> Classification {
        match self.get(key) {
            Some(label) => Classification::Known(label.to_string()),
            None => Classification::Unknown,
        }
    }

    /// Returns the number of keys in the table.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ClassificationTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        ClassificationTable {
            labels: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            level: None,
        }
    }
}

impl From<HashMap<String, String>> for ClassificationTable {
    fn from(labels: HashMap<String, String>) -> Self {
        ClassificationTable { labels, level: None }
    }
}

// =#========================================================================#=
// ANNOTATION
// =#========================================================================#=
/// Returns the item key of a leaf display name: everything before the
/// first [KEY_DELIMITER] (the whole name if there is none), ignoring an
/// [OUTLIER_MARKER] prefix.
///
/// # Example
/// ```
/// # use cladecheck::classification::leaf_key;
/// assert_eq!(leaf_key("17_Casuarius_casuarius"), "17");
/// assert_eq!(leaf_key("🔺17_Casuarius_casuarius"), "17");
/// assert_eq!(leaf_key("17"), "17");
/// ```
pub fn leaf_key(name: &str) -> &str {
    let name = name.strip_prefix(OUTLIER_MARKER).unwrap_or(name);
    name.split(KEY_DELIMITER).next().unwrap_or(name)
}

/// Attaches a classification to every leaf of `tree` by looking up its
/// [leaf_key] in `table`. Leaves whose key is missing (or that have no
/// name) become [Unknown](Classification::Unknown). Internal nodes are
/// not touched.
///
/// # Returns
/// Number of leaves that received a known label.
#[instrument(level = "debug", skip_all)]
pub fn annotate_leaves(tree: &mut Dendrogram, table: &ClassificationTable) -> usize {
    let leaves: Vec<_> = tree.leaves().map(|leaf| leaf.index()).collect();

    let mut known = 0;
    for index in leaves {
        let classification = match tree[index].name() {
            Some(name) => table.classify(leaf_key(name)),
            None => Classification::Unknown,
        };
        if matches!(classification, Classification::Known(_)) {
            known += 1;
        }
        tree[index].set_classification(classification);
    }

    debug!(known, unknown = tree.num_leaves() - known, "annotated leaves");
    known
}
