//! Malformed and oversized input handling.
//!
//! Readers must reject bad input with an error rather than panic or leave a
//! half-written model behind.

use lego_fusion::parsing::edges::parse_edges_text;
use lego_fusion::parsing::fasta::{import_fasta, read_fasta_text};
use lego_fusion::parsing::newick::{parse_newick, parse_newick_text};
use lego_fusion::parsing::ParseError;
use lego_fusion::utils::validation::{
    check_edge_limit, check_sequence_limit, is_valid_accession, MAX_EDGES, MAX_NEWICK_DEPTH,
    MAX_SEQUENCES,
};
use lego_fusion::{LegoError, Model};

#[test]
fn test_limits_are_enforced_at_the_boundary() {
    assert!(check_sequence_limit(MAX_SEQUENCES - 1).is_none());
    assert!(check_sequence_limit(MAX_SEQUENCES).is_some());
    assert!(check_edge_limit(MAX_EDGES - 1).is_none());
    assert!(check_edge_limit(MAX_EDGES).is_some());
}

#[test]
fn test_reserved_accessions_rejected() {
    for accession in ["", "a b", "x(y)", "a,b", "c:d", "e;f", "[g]", ">h", "'i'"] {
        assert!(!is_valid_accession(accession), "{accession:?} should be rejected");
    }

    let mut model = Model::new();
    assert!(matches!(model.add_sequence("GrtS12"), Err(LegoError::DuplicateKey(_))));
    assert!(model.add_sequence("a,b").is_err());
    assert!(model.sequences.is_empty());
}

#[test]
fn test_malformed_newick_rejected() {
    let cases = [
        "",
        "(",
        "((A,B);",
        "(A,B))",
        "(A,B)",
        "(A:x,B);",
        "(A,B);trailing",
    ];

    for text in cases {
        assert!(
            matches!(parse_newick_text(text), Err(ParseError::InvalidFormat(_))),
            "{text:?} should not parse"
        );
    }
}

#[test]
fn test_newick_beyond_depth_limit_rejected() {
    let mut model = Model::new();
    model.add_sequence("A").unwrap();
    model.add_sequence("B").unwrap();

    for depth in [MAX_NEWICK_DEPTH + 1, 100_000] {
        let text = format!("{}A{};", "(".repeat(depth), ",B)".repeat(depth));
        assert!(matches!(parse_newick_text(&text), Err(ParseError::InvalidFormat(_))));
        assert!(matches!(parse_newick(&text, &model), Err(ParseError::InvalidFormat(_))));
    }
}

#[test]
fn test_deeply_nested_newick() {
    let depth = 200;
    let text = format!("{}A{};", "(".repeat(depth), ",B)".repeat(depth));
    let parsed = parse_newick_text(&text).unwrap();
    assert_eq!(parsed.children.len(), 2);
}

#[test]
fn test_newick_with_unknown_leaves_leaves_model_untouched() {
    let mut model = Model::new();
    import_fasta(&mut model, &read_fasta_text(">A\nMK\n>B\nMV\n").unwrap()).unwrap();

    assert!(matches!(
        parse_newick("(A,Z);", &model),
        Err(ParseError::Model(LegoError::NotFound(_)))
    ));
    assert_eq!(model.sequences.len(), 2);
}

#[test]
fn test_malformed_edges_rejected() {
    let cases = [
        "",
        "A 1 10 B 1",
        "A 0 10 B 1 10",
        "A one 10 B 1 10",
        "A 1 10 B 1 10 extra",
    ];

    for text in cases {
        assert!(
            matches!(parse_edges_text(text), Err(ParseError::InvalidFormat(_))),
            "{text:?} should not parse"
        );
    }
}

#[test]
fn test_malformed_fasta_rejected() {
    assert!(read_fasta_text("").is_err());
    assert!(read_fasta_text("no header here\n").is_err());
}

#[test]
fn test_sites_must_cover_existing_ranges() {
    let mut model = Model::new();
    let id = model.add_sequence("A").unwrap();
    model.make_subsequence(id, 1, 20).unwrap();

    // Ten sites cannot hold a range ending at 20
    let records = read_fasta_text(">A\nMKVLAAGIVG\n").unwrap();
    assert!(import_fasta(&mut model, &records).is_err());
    assert!(model.find_sequence_by_accession("A").unwrap().site_array().is_none());
}
