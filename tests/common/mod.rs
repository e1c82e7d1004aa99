//! Shared fixtures and test setup.
#![allow(dead_code)]

use cladecheck::classification::ClassificationTable;
use cladecheck::linkage::MergeEvent;
use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static TEST_SETUP: Once = Once::new();

/// Installs a global tracing subscriber once, filtered by `RUST_LOG`
/// (default `debug`).
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_filter(env_filter),
        );
        if let Err(e) = subscriber.try_init() {
            eprintln!("Error: Failed to set up logging: {}", e);
        }
    });
}

/// Display names `"{i}_{item}"` for `n` items.
pub fn item_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{i}_item_{i}")).collect()
}

/// Merge events of a caterpillar: items 0 and 1 merge first, then each
/// further item joins the growing cluster, one height unit higher each time.
///
/// Cluster of event `k` contains items `0..=k+1`.
pub fn caterpillar_events(n: usize) -> Vec<MergeEvent> {
    (0..n.saturating_sub(1))
        .map(|k| {
            let left = if k == 0 { 0 } else { n + k - 1 };
            MergeEvent::new(left, k + 1, (k + 1) as f64, k + 2)
        })
        .collect()
}

/// Merge events of a balanced tree over `n = 2^depth` items, merging
/// neighbours level by level; level `l` merges at height `l`.
pub fn balanced_events(depth: u32) -> Vec<MergeEvent> {
    let n = 1usize << depth;
    let mut events = Vec::with_capacity(n - 1);
    let mut level: Vec<(usize, usize)> = (0..n).map(|i| (i, 1)).collect();
    let mut height = 0.0;
    while level.len() > 1 {
        height += 1.0;
        let mut next = Vec::with_capacity(level.len() / 2);
        for pair in level.chunks(2) {
            let (left, left_size) = pair[0];
            let (right, right_size) = pair[1];
            events.push(MergeEvent::new(left, right, height, left_size + right_size));
            next.push((n + events.len() - 1, left_size + right_size));
        }
        level = next;
    }
    events
}

/// Table mapping item `i` to `labels[i]`; `None` leaves the key out.
pub fn table_from_labels(labels: &[Option<&str>]) -> ClassificationTable {
    labels
        .iter()
        .enumerate()
        .filter_map(|(i, label)| label.map(|l| (i.to_string(), l.to_string())))
        .collect()
}
