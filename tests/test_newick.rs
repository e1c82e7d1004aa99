mod common;

use cladecheck::linkage::build_dendrogram;
use cladecheck::newick::{NewickParser, parse_str, to_newick, write_newick};
use cladecheck::parser::{ByteParser, ParsingErrorType};
use common::{balanced_events, caterpillar_events, init_test_setup, item_names};
use rstest::rstest;

#[test]
fn test_parse_simple() {
    init_test_setup();
    let tree = parse_str("((A:1.0,B:1.0):0.5,C:1.5);").unwrap();

    assert!(tree.is_valid());
    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(tree.num_internal(), 2);
    assert!(tree.is_ultrametric());
    assert!((tree.height() - 1.5).abs() < 1e-12);

    let names: Vec<_> = tree.leaves().filter_map(|leaf| leaf.name()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[test]
fn test_parse_whitespace_comments_and_quotes() {
    init_test_setup();
    let newick = "( [first pair] ('Little Spotted Kiwi' : 0.1 , 'Baillon''s Crake':0.1) : 0.2 ,\n C:3e-1 ) ;";
    let tree = parse_str(newick).unwrap();

    let names: Vec<_> = tree.leaves().filter_map(|leaf| leaf.name()).collect();
    assert_eq!(names, vec!["Little Spotted Kiwi", "Baillon's Crake", "C"]);
    assert!(tree.is_ultrametric());
}

#[test]
fn test_parse_without_branch_lengths() {
    let tree = parse_str("((a,b),c);").unwrap();
    assert!(tree.nodes().iter().all(|node| !node.has_branch_length()));
    assert_eq!(to_newick(&tree), "((a,b),c);");
}

#[test]
fn test_parse_single_leaf() {
    let tree = parse_str("0_Struthio_camelus;").unwrap();
    assert_eq!(tree.num_nodes(), 1);
    assert_eq!(tree.root().name(), Some("0_Struthio_camelus"));
}

#[test]
fn test_parse_marked_outlier_name() {
    let tree = parse_str("(🔺3_Gallus_gallus:0.1000,4_Anas_platyrhynchos:0.1000);").unwrap();
    assert_eq!(tree[0].name(), Some("🔺3_Gallus_gallus"));
}

#[rstest]
#[case::missing_semicolon("((a:1,b:1):1,c:2)")]
#[case::unclosed("((a:1,b:1):1,c:2;")]
#[case::polytomy("(a,b,c);")]
#[case::unary("((a),b);")]
#[case::empty_label("(a,);")]
#[case::trailing_content("(a,b);(c,d);")]
#[case::empty("")]
fn test_invalid_newick(#[case] newick: &str) {
    init_test_setup();
    assert!(parse_str(newick).is_err(), "accepted {newick:?}");
}

#[rstest]
#[case::negative("(a:-0.1,b:0.1);")]
#[case::not_a_number("(a:x,b:0.1);")]
fn test_invalid_branch_length(#[case] newick: &str) {
    let err = parse_str(newick).unwrap_err();
    assert!(matches!(err.kind(), ParsingErrorType::InvalidBranchLength(_)));
}

#[test]
fn test_unclosed_comment() {
    let err = parse_str("(a,b)[never closed;").unwrap_err();
    assert_eq!(err.kind(), &ParsingErrorType::UnclosedComment);
}

#[test]
fn test_error_reports_position() {
    let err = parse_str("(a,b,c);").unwrap_err();
    assert_eq!(err.position(), 4);
    assert!(err.to_string().contains("position 4"));
}

#[test]
fn test_parser_stops_after_semicolon() {
    let mut byte_parser = ByteParser::for_str("(a,b);(c,d);");
    let parser = NewickParser::new().with_num_leaves(2);

    let first = parser.parse_str(&mut byte_parser).unwrap();
    let second = parser.parse_str(&mut byte_parser).unwrap();
    assert_eq!(to_newick(&first), "(a,b);");
    assert_eq!(to_newick(&second), "(c,d);");
    assert!(byte_parser.is_eof());
}

#[test]
fn test_round_trip_keeps_structure_and_heights() {
    init_test_setup();
    let events = balanced_events(5);
    let names = item_names(32);
    let tree = build_dendrogram(&events, &names).unwrap();

    let newick = to_newick(&tree);
    let parsed = parse_str(&newick).unwrap();

    assert!(parsed.is_valid());
    assert_eq!(to_newick(&parsed), newick);

    let original: Vec<_> = tree.leaves().filter_map(|leaf| leaf.name()).collect();
    let reparsed: Vec<_> = parsed.leaves().filter_map(|leaf| leaf.name()).collect();
    assert_eq!(original, reparsed);
    assert!((parsed.height() - tree.height()).abs() < 1e-4);
}

#[test]
fn test_round_trip_rederives_merge_heights() {
    init_test_setup();
    let n = 40;
    let events = caterpillar_events(n);
    let tree = build_dendrogram(&events, &item_names(n)).unwrap();
    let parsed = parse_str(to_newick(&tree)).unwrap();

    // Internal nodes of the parsed tree in post-order match the events
    let internal: Vec<_> = parsed
        .post_order_iter()
        .filter(|node| node.is_internal())
        .map(|node| node.index())
        .collect();
    assert_eq!(internal.len(), events.len());
    for (index, event) in internal.into_iter().zip(&events) {
        assert!((parsed.height_of(index) - event.height).abs() < 1e-4);
    }
}

#[test]
fn test_deep_caterpillar_round_trip() {
    init_test_setup();
    let n = 5000;
    let tree = build_dendrogram(&caterpillar_events(n), &item_names(n)).unwrap();
    let newick = to_newick(&tree);

    let parsed = parse_str(&newick).unwrap();
    assert_eq!(parsed.num_leaves(), n);
    assert_eq!(to_newick(&parsed), newick);
}

#[test]
fn test_write_newick_appends_newline() {
    let tree = parse_str("(a:0.5,b:0.5);").unwrap();
    let mut out = Vec::new();
    write_newick(&mut out, &tree).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "(a:0.5000,b:0.5000);\n");
}

#[test]
fn test_labels_with_delimiters_are_quoted() {
    let mut tree = parse_str("(a:0.1,b:0.1);").unwrap();
    tree[0].set_name("Pu(ke)ko".to_string());
    let newick = to_newick(&tree);
    assert_eq!(newick, "('Pu(ke)ko':0.1000,b:0.1000);");
    assert_eq!(parse_str(&newick).unwrap()[0].name(), Some("Pu(ke)ko"));
}

#[rstest]
#[case::quoted_name("'x'")]
#[case::empty_name("")]
#[case::quote_inside("Baillon's Crake")]
fn test_unusual_names_round_trip(#[case] name: &str) {
    let mut tree = parse_str("(a:0.1,b:0.1);").unwrap();
    tree[0].set_name(name.to_string());

    let newick = to_newick(&tree);
    let parsed = parse_str(&newick).unwrap();
    assert_eq!(parsed[0].name(), Some(name), "written as {newick:?}");
    assert_eq!(to_newick(&parsed), newick);
}
