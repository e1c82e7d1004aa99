//! Conversion of hierarchical-clustering merge events into a [Dendrogram].
//!
//! An external clustering routine produces an ordered sequence of
//! [MergeEvent]s for `n` items. Item `i` is referred to by id `i`; the
//! cluster formed by the `k`-th event gets id `n + k` and can be
//! referenced by later events. This is the layout of a SciPy-style
//! linkage matrix, whose rows can be converted with
//! [`MergeEvent::try_from`].
//!
//! # Branch lengths
//! The branch length of a node is the height of its parent's merge minus
//! its own merge height, where original items have height `0`. The root
//! has no branch length.
//!
//! # Example
//! ```
//! use cladecheck::linkage::{MergeEvent, build_dendrogram};
//! use cladecheck::newick::to_newick;
//!
//! let events = [
//!     MergeEvent::new(0, 1, 0.1, 2),
//!     MergeEvent::new(2, 3, 0.1, 2),
//!     MergeEvent::new(4, 5, 0.5, 4),
//! ];
//! let tree = build_dendrogram(&events, &["a", "b", "c", "d"])?;
//! assert_eq!(
//!     to_newick(&tree),
//!     "((a:0.1000,b:0.1000):0.4000,(c:0.1000,d:0.1000):0.4000);"
//! );
//! # Ok::<(), cladecheck::linkage::LinkageError>(())
//! ```

mod linkage_error;

pub use linkage_error::LinkageError;

use crate::model::{BranchLength, Dendrogram, NodeIndex};
use tracing::{debug, instrument, trace};

// =#========================================================================#=
// MERGE EVENT
// =#========================================================================#=
/// A single merge of two clusters (or items) at a given height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeEvent {
    /// Id of the left item/cluster
    pub left: usize,
    /// Id of the right item/cluster
    pub right: usize,
    /// Height (distance) at which the two are joined
    pub height: f64,
    /// Number of original items in the resulting cluster
    pub member_count: usize,
}

impl MergeEvent {
    /// Creates a new merge event.
    pub fn new(left: usize, right: usize, height: f64, member_count: usize) -> Self {
        MergeEvent {
            left,
            right,
            height,
            member_count,
        }
    }
}

impl TryFrom<[f64; 4]> for MergeEvent {
    type Error = LinkageError;

    /// Converts a linkage matrix row `[left, right, height, count]`, where ids
    /// and count are stored as floats.
    fn try_from(row: [f64; 4]) -> Result<Self, Self::Error> {
        fn as_index(field: &'static str, value: f64) -> Result<usize, LinkageError> {
            if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
                Ok(value as usize)
            } else {
                Err(LinkageError::NonIntegralField { field, value })
            }
        }

        Ok(MergeEvent {
            left: as_index("left", row[0])?,
            right: as_index("right", row[1])?,
            height: row[2],
            member_count: as_index("member_count", row[3])?,
        })
    }
}

// =#========================================================================#=
// BUILDING
// =#========================================================================#=
/// Builds the dendrogram described by `events` over items named `names`.
///
/// Leaf `i` ends up at node index `i`, and the cluster of event `k` at node
/// index `names.len() + k`; the last event forms the root. Events are taken
/// in the given order, so clusters merged at equal heights keep the order
/// of the sequence.
///
/// # Arguments
/// * `events` - Ordered merge events, exactly `n - 1` for `n` items
/// * `names` - Display names of the original items
///
/// # Errors
/// Returns a [LinkageError] if the sequence does not describe a binary tree
/// with non-negative branch lengths, see [validate].
#[instrument(level = "debug", skip_all, fields(num_items = names.len(), num_events = events.len()))]
pub fn build_dendrogram<S: AsRef<str>>(
    events: &[MergeEvent],
    names: &[S],
) -> Result<Dendrogram, LinkageError> {
    let heights = validate(events, names.len())?;
    let num_items = names.len();

    let mut tree = Dendrogram::with_capacity(num_items);
    for name in names {
        tree.add_leaf(Some(name.as_ref().to_string()), None);
    }

    for (k, event) in events.iter().enumerate() {
        let index = tree.add_internal((event.left, event.right), None);
        debug_assert_eq!(index, num_items + k);

        // Children now know their parent height
        for child in [event.left, event.right] {
            let length = event.height - heights[child];
            tree[child].set_branch_length(Some(BranchLength::new(length)));
        }
        trace!(cluster = index, left = event.left, right = event.right, height = event.height, "merged");
    }

    let root_index: NodeIndex = num_items + events.len() - 1;
    tree.set_root(root_index);
    debug!(num_nodes = tree.num_nodes(), "built dendrogram");

    Ok(tree)
}

/// Checks that `events` form a valid merge sequence over `num_items` items.
///
/// Checks:
/// - At least one item and exactly `num_items - 1` events
/// - Each event references only items or clusters formed by earlier events
/// - No item/cluster is merged twice, none with itself
/// - Heights are finite, non-negative and not below either child's height
/// - Member counts add up
///
/// # Returns
/// The height of every item and cluster, indexed by id.
pub fn validate(events: &[MergeEvent], num_items: usize) -> Result<Vec<f64>, LinkageError> {
    if num_items == 0 {
        return Err(LinkageError::NoItems);
    }
    if events.len() != num_items - 1 {
        return Err(LinkageError::WrongEventCount {
            num_items,
            expected: num_items - 1,
            actual: events.len(),
        });
    }

    let num_ids = num_items + events.len();
    let mut heights = vec![0.0; num_ids];
    let mut member_counts = vec![1; num_ids];
    let mut merged = vec![false; num_ids];

    for (k, event) in events.iter().enumerate() {
        let id = num_items + k;

        if event.left == event.right {
            return Err(LinkageError::SelfMerge {
                event: k,
                reference: event.left,
            });
        }
        for reference in [event.left, event.right] {
            // Only items and clusters of earlier events exist at this point
            if reference >= id {
                return Err(LinkageError::DanglingReference { event: k, reference });
            }
            if merged[reference] {
                return Err(LinkageError::AlreadyMerged { event: k, reference });
            }
        }

        if !event.height.is_finite() || event.height < 0.0 {
            return Err(LinkageError::InvalidHeight {
                event: k,
                height: event.height,
            });
        }
        for child in [event.left, event.right] {
            if event.height < heights[child] {
                return Err(LinkageError::HeightInversion {
                    event: k,
                    height: event.height,
                    child,
                    child_height: heights[child],
                });
            }
        }

        let actual = member_counts[event.left] + member_counts[event.right];
        if event.member_count != actual {
            return Err(LinkageError::MemberCountMismatch {
                event: k,
                claimed: event.member_count,
                actual,
            });
        }

        merged[event.left] = true;
        merged[event.right] = true;
        heights[id] = event.height;
        member_counts[id] = actual;
    }

    Ok(heights)
}
