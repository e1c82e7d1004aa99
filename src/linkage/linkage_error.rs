use thiserror::Error;

// =#========================================================================#=
// LINKAGE ERROR
// =#========================================================================#=
/// Structural violations in a merge-event sequence.
///
/// `event` fields are 0-based positions in the sequence.
#[derive(Error, PartialEq, Debug, Clone)]
pub enum LinkageError {
    #[error("no items given, need at least one display name")]
    NoItems,

    #[error("expected {expected} merge events for {num_items} items, got {actual}")]
    WrongEventCount {
        num_items: usize,
        expected: usize,
        actual: usize,
    },

    #[error("merge event {event} references {reference}, which is neither an item nor an earlier cluster")]
    DanglingReference { event: usize, reference: usize },

    #[error("merge event {event} merges {reference}, which was already merged before")]
    AlreadyMerged { event: usize, reference: usize },

    #[error("merge event {event} merges {reference} with itself")]
    SelfMerge { event: usize, reference: usize },

    #[error("merge event {event} has invalid height {height}")]
    InvalidHeight { event: usize, height: f64 },

    #[error("merge event {event} at height {height} lies below its child {child} at height {child_height}")]
    HeightInversion {
        event: usize,
        height: f64,
        child: usize,
        child_height: f64,
    },

    #[error("merge event {event} claims {claimed} members, but its children hold {actual}")]
    MemberCountMismatch {
        event: usize,
        claimed: usize,
        actual: usize,
    },

    #[error("linkage row field {field} is not a non-negative integer: {value}")]
    NonIntegralField { field: &'static str, value: f64 },
}
