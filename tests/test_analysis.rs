mod common;

use cladecheck::analysis::{
    LabelCounts, OUTLIER_MARKER, PurityAnalyzer, UNRESOLVED_CLADE_NAME, compute_purity,
    mark_clade_outliers, mark_outliers, summarize,
};
use cladecheck::classification::annotate_leaves;
use cladecheck::config::AnalysisConfig;
use cladecheck::linkage::{MergeEvent, build_dendrogram};
use cladecheck::model::{Dendrogram, NodeStatus};
use cladecheck::newick::to_newick;
use common::{
    balanced_events, caterpillar_events, init_test_setup, item_names, table_from_labels,
};
use rstest::{fixture, rstest};

/// Balanced tree over 16 items whose left half is labeled `A` except for
/// item 7 (`B`), and whose right half alternates `C` and `D`.
#[fixture]
fn annotated_tree() -> Dendrogram {
    init_test_setup();
    let mut tree = build_dendrogram(&balanced_events(4), &item_names(16)).unwrap();
    let labels: Vec<Option<&str>> = (0..16)
        .map(|i| match i {
            7 => Some("B"),
            0..8 => Some("A"),
            _ if i % 2 == 0 => Some("C"),
            _ => Some("D"),
        })
        .collect();
    annotate_leaves(&mut tree, &table_from_labels(&labels));
    tree
}

/// Caterpillar over 10 items: nine `A`, the last joined item `B`.
fn nine_to_one() -> Dendrogram {
    let mut labels = vec![Some("A"); 10];
    labels[9] = Some("B");
    let mut tree = build_dendrogram(&caterpillar_events(10), &item_names(10)).unwrap();
    annotate_leaves(&mut tree, &table_from_labels(&labels));
    tree
}

// =#========================================================================#=
// PURITY
// =#========================================================================#=
#[test]
fn test_label_counts() {
    init_test_setup();
    let tree = nine_to_one();
    let counts = LabelCounts::of_subtree(&tree, tree.root_index());

    assert_eq!(counts.num_leaves(), 10);
    assert_eq!(counts.num_known(), 10);
    assert_eq!(counts.count("A"), 9);
    assert_eq!(counts.count("B"), 1);
    assert_eq!(counts.count("C"), 0);
    assert_eq!(counts.majority(), Some(("A", 9)));
    assert!((counts.purity() - 0.9).abs() < 1e-12);
}

#[test]
fn test_majority_tie_goes_to_smallest_label() {
    let mut tree = build_dendrogram(&caterpillar_events(4), &item_names(4)).unwrap();
    let table = table_from_labels(&[Some("Rallidae"), Some("Anatidae"), Some("Rallidae"), Some("Anatidae")]);
    annotate_leaves(&mut tree, &table);

    let purity = compute_purity(&tree, tree.root_index());
    assert_eq!(purity.majority.as_deref(), Some("Anatidae"));
    assert!((purity.purity - 0.5).abs() < 1e-12);
}

#[test]
fn test_unknown_leaves_excluded_from_purity() {
    init_test_setup();
    let mut tree = build_dendrogram(&caterpillar_events(5), &item_names(5)).unwrap();
    let table = table_from_labels(&[Some("A"), None, Some("A"), None, Some("B")]);
    annotate_leaves(&mut tree, &table);

    let purity = compute_purity(&tree, tree.root_index());
    assert_eq!(purity.num_leaves, 5);
    assert_eq!(purity.num_known, 3);
    assert!((purity.purity - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_purity_without_known_labels() {
    let mut tree = build_dendrogram(&caterpillar_events(3), &item_names(3)).unwrap();
    annotate_leaves(&mut tree, &table_from_labels(&[]));

    let purity = compute_purity(&tree, tree.root_index());
    assert_eq!(purity.purity, 0.0);
    assert_eq!(purity.majority, None);
    assert_eq!(purity.num_known, 0);

    let pure = PurityAnalyzer::new(AnalysisConfig::default().with_min_sample_count(1))
        .analyze(&mut tree);
    assert!(pure.is_empty());
    assert!(tree.nodes().iter().all(|node| node.status() == NodeStatus::Mixed));
}

#[test]
fn test_unlabeled_node_never_pure() {
    init_test_setup();
    let mut tree = build_dendrogram(&[MergeEvent::new(0, 1, 0.1, 2)], &["0_a", "1_b"]).unwrap();
    annotate_leaves(&mut tree, &table_from_labels(&[]));
    let config = AnalysisConfig::default()
        .with_min_sample_count(0)
        .with_purity_threshold(0.0);

    let pure = PurityAnalyzer::new(config).analyze(&mut tree);

    assert!(pure.is_empty());
    assert!(tree.nodes().iter().all(|node| node.status() == NodeStatus::Mixed));
    assert_eq!(
        to_newick(&summarize(&tree)),
        "(0_a:0.1000,1_b:0.1000);"
    );
}

#[test]
fn test_nine_to_one_is_pure() {
    init_test_setup();
    let mut tree = nine_to_one();
    let pure = PurityAnalyzer::new(AnalysisConfig::default()).analyze(&mut tree);

    assert_eq!(pure.len(), 1);
    assert_eq!(pure[0].node, tree.root_index());
    assert_eq!(pure[0].majority, "A");
    assert_eq!(pure[0].num_leaves, 10);
    assert!((pure[0].purity - 0.9).abs() < 1e-12);
    assert_eq!(tree.root().status(), NodeStatus::Pure);
    assert_eq!(tree.root().majority(), Some("A"));
}

#[test]
fn test_perfect_purity_below_min_sample_count() {
    init_test_setup();
    let mut tree = build_dendrogram(&balanced_events(2), &item_names(4)).unwrap();
    annotate_leaves(&mut tree, &table_from_labels(&[Some("A"); 4]));

    let pure = PurityAnalyzer::new(AnalysisConfig::default()).analyze(&mut tree);

    assert!(pure.is_empty());
    assert_eq!(tree.root().purity(), Some(1.0));
    // Recursion went all the way down
    for node in tree.nodes() {
        assert_eq!(node.status(), NodeStatus::Mixed, "node {}", node.index());
    }
}

#[rstest]
fn test_stops_at_pure_nodes(mut annotated_tree: Dendrogram) {
    let config = AnalysisConfig::default().with_min_sample_count(2);
    let pure = PurityAnalyzer::new(config).analyze(&mut annotated_tree);
    let tree = annotated_tree;

    // Left half (7 A, 1 B) is pure, right half splits down to single leaves
    let left_half = tree.root().children().unwrap().0;
    assert_eq!(pure[0].node, left_half);
    assert_eq!(pure[0].majority, "A");
    assert!((pure[0].purity - 0.875).abs() < 1e-12);
    assert_eq!(tree.root().status(), NodeStatus::Mixed);

    for leaf in tree.leaves_of(left_half) {
        assert_eq!(leaf.status(), NodeStatus::Unset);
    }

    // No pure node lies below another pure node
    for clade in &pure {
        for other in &pure {
            if clade.node != other.node {
                assert!(tree.leaves_of(clade.node).all(|leaf| {
                    tree.leaves_of(other.node).all(|l| l.index() != leaf.index())
                }));
            }
        }
    }

    // Right half alternates C and D, no part of it reaches the threshold
    let right_half = tree.root().children().unwrap().1;
    assert_eq!(tree[right_half].status(), NodeStatus::Mixed);
    assert_eq!(pure.len(), 1);
}

#[rstest]
fn test_purity_in_unit_range(mut annotated_tree: Dendrogram) {
    PurityAnalyzer::new(AnalysisConfig::default().with_min_sample_count(1))
        .analyze(&mut annotated_tree);

    for node in annotated_tree.nodes() {
        if let Some(purity) = node.purity() {
            assert!((0.0..=1.0).contains(&purity));
        }
    }
}

#[rstest]
fn test_rerun_replaces_results(mut annotated_tree: Dendrogram) {
    let strict = PurityAnalyzer::new(AnalysisConfig::default().with_min_sample_count(100));
    let lenient = PurityAnalyzer::new(AnalysisConfig::default().with_min_sample_count(1));

    lenient.analyze(&mut annotated_tree);
    let pure = strict.analyze(&mut annotated_tree);

    assert!(pure.is_empty());
    assert!(
        annotated_tree
            .nodes()
            .iter()
            .all(|node| node.status() == NodeStatus::Mixed)
    );
}

#[test]
fn test_deep_caterpillar_analysis() {
    init_test_setup();
    let n = 5000;
    let mut tree = build_dendrogram(&caterpillar_events(n), &item_names(n)).unwrap();
    let labels: Vec<Option<&str>> = (0..n).map(|i| Some(if i % 2 == 0 { "A" } else { "B" })).collect();
    annotate_leaves(&mut tree, &table_from_labels(&labels));

    let pure = PurityAnalyzer::new(AnalysisConfig::default()).analyze(&mut tree);
    assert!(pure.is_empty());
    assert_eq!(tree.root().status(), NodeStatus::Mixed);
}

// =#========================================================================#=
// OUTLIERS
// =#========================================================================#=
#[test]
fn test_nine_to_one_outlier() {
    init_test_setup();
    let mut tree = nine_to_one();
    PurityAnalyzer::new(AnalysisConfig::default()).analyze(&mut tree);

    let outliers = mark_outliers(&mut tree);

    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0].leaf, 9);
    assert_eq!(outliers[0].clade, tree.root_index());
    assert_eq!(outliers[0].label, "B");
    assert_eq!(outliers[0].majority, "A");
    assert_eq!(tree[9].name(), Some("🔺9_item_9"));
    assert_eq!(tree[9].known_label(), Some("B"));
    assert_eq!(tree[8].name(), Some("8_item_8"));
}

#[test]
fn test_marking_is_idempotent() {
    let mut tree = nine_to_one();
    PurityAnalyzer::new(AnalysisConfig::default()).analyze(&mut tree);

    let first = mark_outliers(&mut tree);
    let names: Vec<_> = tree.leaves().map(|leaf| leaf.name().map(str::to_string)).collect();
    let second = mark_outliers(&mut tree);
    let names_again: Vec<_> = tree.leaves().map(|leaf| leaf.name().map(str::to_string)).collect();

    assert_eq!(first, second);
    assert_eq!(names, names_again);
    assert_eq!(tree[9].name().unwrap().matches(OUTLIER_MARKER).count(), 1);
}

#[test]
fn test_unknown_leaves_are_not_outliers() {
    let mut tree = build_dendrogram(&caterpillar_events(6), &item_names(6)).unwrap();
    let table = table_from_labels(&[Some("A"), Some("A"), None, Some("A"), Some("A"), Some("A")]);
    annotate_leaves(&mut tree, &table);
    PurityAnalyzer::new(AnalysisConfig::default()).analyze(&mut tree);

    assert_eq!(tree.root().status(), NodeStatus::Pure);
    assert!(mark_outliers(&mut tree).is_empty());
    assert_eq!(tree[2].name(), Some("2_item_2"));
}

#[test]
fn test_mixed_clade_is_left_alone() {
    let mut tree = build_dendrogram(&[MergeEvent::new(0, 1, 0.3, 2)], &["0_a", "1_b"]).unwrap();
    annotate_leaves(&mut tree, &table_from_labels(&[Some("A"), Some("B")]));
    PurityAnalyzer::new(AnalysisConfig::default().with_min_sample_count(1)).analyze(&mut tree);

    assert_eq!(tree.root().status(), NodeStatus::Mixed);
    let root = tree.root_index();
    assert!(mark_clade_outliers(&mut tree, root).is_empty());
    assert!(mark_outliers(&mut tree).is_empty());
    assert_eq!(tree[1].name(), Some("1_b"));
}

#[rstest]
fn test_outliers_only_inside_pure_clades(mut annotated_tree: Dendrogram) {
    PurityAnalyzer::new(AnalysisConfig::default().with_min_sample_count(2))
        .analyze(&mut annotated_tree);
    let outliers = mark_outliers(&mut annotated_tree);

    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0].leaf, 7);
    assert_eq!(outliers[0].label, "B");
    for leaf in annotated_tree.leaves().filter(|leaf| leaf.index() != 7) {
        assert!(!leaf.name().unwrap().starts_with(OUTLIER_MARKER));
    }
}

// =#========================================================================#=
// SUMMARY
// =#========================================================================#=
#[rstest]
fn test_summary_collapses_pure_clades(mut annotated_tree: Dendrogram) {
    PurityAnalyzer::new(AnalysisConfig::default().with_min_sample_count(2))
        .analyze(&mut annotated_tree);
    mark_outliers(&mut annotated_tree);

    let summary = summarize(&annotated_tree);

    assert!(summary.is_valid());
    // Left half collapses to one leaf, right half keeps its 8 leaves
    assert_eq!(summary.num_leaves(), 9);
    let (left, right) = summary.root().children().unwrap();
    assert_eq!(summary[left].name(), Some("A-0.88-8"));
    assert!(summary[left].is_leaf());
    assert_eq!(summary[left].status(), NodeStatus::Pure);
    assert_eq!(summary[right].name(), Some(UNRESOLVED_CLADE_NAME));
    assert_eq!(summary.root().name(), Some(UNRESOLVED_CLADE_NAME));

    let right_leaves: Vec<_> = summary.leaves_of(right).filter_map(|leaf| leaf.name()).collect();
    assert_eq!(right_leaves.len(), 8);
    assert_eq!(right_leaves[0], "8_item_8");
    assert!(summary.leaves_of(right).all(|leaf| leaf.known_label().is_some()));

    // Branch lengths copied along
    let left_half = annotated_tree.root().children().unwrap().0;
    assert_eq!(summary[left].branch_length(), annotated_tree[left_half].branch_length());
    let right_half = annotated_tree.root().children().unwrap().1;
    assert!((summary.height_of(right) - annotated_tree.height_of(right_half)).abs() < 1e-12);
}

#[rstest]
fn test_summary_is_independent(mut annotated_tree: Dendrogram) {
    PurityAnalyzer::new(AnalysisConfig::default().with_min_sample_count(2))
        .analyze(&mut annotated_tree);
    let before = to_newick(&annotated_tree);

    let mut summary = summarize(&annotated_tree);
    let root = summary.root_index();
    summary[root].set_name("renamed".to_string());
    let leaf = summary.leaves().next().unwrap().index();
    summary[leaf].set_name("renamed leaf".to_string());

    assert_eq!(to_newick(&annotated_tree), before);
    assert_eq!(annotated_tree.num_leaves(), 16);
}

#[test]
fn test_summary_of_caterpillar() {
    let mut tree = build_dendrogram(&caterpillar_events(4), &item_names(4)).unwrap();
    annotate_leaves(
        &mut tree,
        &table_from_labels(&[Some("A"), Some("A"), Some("A"), Some("B")]),
    );
    let config = AnalysisConfig::default()
        .with_min_sample_count(2)
        .with_purity_threshold(1.0);
    PurityAnalyzer::new(config).analyze(&mut tree);

    // Root (3 A, 1 B) is mixed, its left child (3 A) pure
    let summary = summarize(&tree);
    assert_eq!(
        to_newick(&summary),
        "(A-1.00-3:1.0000,3_item_3:3.0000);"
    );
}

#[test]
fn test_summary_of_pure_root_is_single_leaf() {
    let mut tree = nine_to_one();
    PurityAnalyzer::new(AnalysisConfig::default()).analyze(&mut tree);
    mark_outliers(&mut tree);

    let summary = summarize(&tree);
    assert_eq!(summary.num_nodes(), 1);
    assert_eq!(to_newick(&summary), "A-0.90-10;");
}

#[test]
fn test_summary_without_analysis_copies_tree() {
    let tree = build_dendrogram(&caterpillar_events(3), &["0_a", "1_b", "2_c"]).unwrap();
    let summary = summarize(&tree);

    assert_eq!(summary.num_leaves(), 3);
    assert_eq!(
        to_newick(&summary),
        "((0_a:1.0000,1_b:1.0000):1.0000,2_c:2.0000);"
    );
}
