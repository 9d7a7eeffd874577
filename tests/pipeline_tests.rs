//! Library-level scenarios: a model built from text inputs, taken through
//! every stage, saved, reloaded and partly dropped.

use lego_fusion::core::graph::LegoGraph;
use lego_fusion::engine::components::detect_components;
use lego_fusion::engine::config::{PipelineConfig, DEFAULT_MAJOR_COVERAGE};
use lego_fusion::engine::create_nrfg;
use lego_fusion::parsing::edges::{import_edges, parse_edges_text};
use lego_fusion::parsing::fasta::{import_fasta, read_fasta_text};
use lego_fusion::parsing::newick::parse_newick;
use lego_fusion::{ComponentId, LegoError, LegoNode, Model, Stage};

const FASTA: &str = "\
>A1\nMKVLAAGIVG\n>A2\nMKVLSAGIVG\n>A3\nMKILAAGLVG
>B1\nPPTRWEDCYH\n>B2\nPPSRWEDCYH\n>B3\nPPTRWQDCFH
>C1\nMKVLAAGIVGPPTRWEDCYH\n>C2\nMKVLSAGIVGPPSRWEDCYH\n";

const EDGES: &str = "\
A1 1 10 A2 1 10
A1 1 10 A3 1 10
B1 1 10 B2 1 10
B1 1 10 B3 1 10
C1 1 20 C2 1 20
A1 1 10 C1 1 10
B1 1 10 C1 11 20
A2 1 10 C2 1 10
B2 1 10 C2 11 20
";

fn component_of(model: &Model, accession: &str) -> ComponentId {
    let sequence = model.find_sequence_by_accession(accession).unwrap().id;
    model
        .components
        .find_component_for_major_sequence(sequence)
        .unwrap()
        .index
}

fn add_tree(model: &mut Model, accession: &str, newick: &str) {
    let component = component_of(model, accession);
    let tree: LegoGraph = parse_newick(newick, model).unwrap();
    model.set_tree(component, tree, Some(newick.to_string())).unwrap();
}

fn model_with_trees() -> Model {
    let mut model = Model::new();
    import_fasta(&mut model, &read_fasta_text(FASTA).unwrap()).unwrap();
    import_edges(&mut model, &parse_edges_text(EDGES).unwrap()).unwrap();
    assert_eq!(detect_components(&mut model, DEFAULT_MAJOR_COVERAGE).unwrap(), 3);

    let ids: Vec<_> = model.components.iter().map(|c| c.index).collect();
    for id in ids {
        let fasta = model.components.get(id).unwrap().to_legacy_fasta(&model.sequences);
        model.set_alignment(id, &fasta).unwrap();
    }

    add_tree(&mut model, "A1", "((A1,A2),A3);");
    add_tree(&mut model, "B1", "((B1,B2),B3);");
    add_tree(&mut model, "C1", "(C1,C2);");
    model
}

#[test]
fn test_inputs_gate_the_stages() {
    let mut model = Model::new();
    assert!(model.get_status(Stage::Sequences).is_none());
    assert!(matches!(
        detect_components(&mut model, DEFAULT_MAJOR_COVERAGE),
        Err(LegoError::NotReady(_))
    ));

    import_fasta(&mut model, &read_fasta_text(FASTA).unwrap()).unwrap();
    import_edges(&mut model, &parse_edges_text(EDGES).unwrap()).unwrap();
    detect_components(&mut model, DEFAULT_MAJOR_COVERAGE).unwrap();

    // Inputs are frozen once components exist
    assert!(matches!(model.add_sequence("D1"), Err(LegoError::InUse(_))));
    assert!(matches!(
        create_nrfg(&mut model, &PipelineConfig::default()),
        Err(LegoError::NotReady(_))
    ));
}

#[test]
fn test_nrfg_from_component_trees() {
    let mut model = model_with_trees();
    create_nrfg(&mut model, &PipelineConfig::default()).unwrap();

    for stage in Stage::ALL {
        assert!(model.get_status(stage).is_complete(), "{stage} is not complete");
    }

    assert_eq!(model.fusion_events.len(), 1);
    let event = model.fusion_events.get(0).unwrap();
    assert_eq!(event.long_name(&model), "(comp_A1+comp_B1=comp_C1)");

    let nrfg = &model.fusion_graph_clean.as_ref().unwrap().graph;
    let leaves = nrfg.leaves();
    assert_eq!(leaves.len(), 10);
    assert_eq!(leaves.iter().filter(|n| matches!(n, LegoNode::Point(_))).count(), 2);
    assert_eq!(nrfg.roots().len(), 4);

    let names: Vec<_> = model.iter_graphs().into_iter().map(|(name, _)| name).collect();
    assert!(names.contains(&"comp_A1_tree".to_string()));
    assert!(names.contains(&"subgraph_C1_GrtP0P0P1".to_string()));
    assert!(names.contains(&"nrfg".to_string()));
}

#[test]
fn test_saved_model_keeps_its_stages() {
    let mut model = model_with_trees();
    create_nrfg(&mut model, &PipelineConfig::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    model.save(&path).unwrap();

    let loaded = Model::load_from_file(&path).unwrap();
    let before = model.summary();
    let after = loaded.summary();
    assert_eq!(after.sequences, before.sequences);
    assert_eq!(after.splits, before.splits);
    for (a, b) in before.stages.iter().zip(&after.stages) {
        assert_eq!(a.status, b.status);
        assert_eq!(a.headline, b.headline);
    }

    // Lookup indexes are rebuilt on load
    assert_eq!(loaded.find_sequence_by_accession("C2").unwrap().accession, "C2");
    assert!(loaded.find_node("GrtP0P0P1").is_ok());
}

#[test]
fn test_drop_and_rebuild() {
    let mut model = model_with_trees();
    let config = PipelineConfig::default();
    create_nrfg(&mut model, &config).unwrap();
    let nodes = model.fusion_graph_clean.as_ref().unwrap().graph.node_count();

    assert!(matches!(model.drop_stage(Stage::Subsets), Err(LegoError::InUse(_))));

    for stage in [Stage::Cleaned, Stage::Fused, Stage::Subgraphs, Stage::Pregraphs, Stage::Subsets] {
        model.drop_stage(stage).unwrap();
    }
    assert!(model.get_status(Stage::Consensus).is_complete());
    assert!(model.get_status(Stage::Subsets).is_none());

    create_nrfg(&mut model, &config).unwrap();
    assert_eq!(model.fusion_graph_clean.as_ref().unwrap().graph.node_count(), nodes);
}

#[test]
fn test_partial_trees_block_fusions() {
    let mut model = Model::new();
    import_fasta(&mut model, &read_fasta_text(FASTA).unwrap()).unwrap();
    import_edges(&mut model, &parse_edges_text(EDGES).unwrap()).unwrap();
    detect_components(&mut model, DEFAULT_MAJOR_COVERAGE).unwrap();

    let ids: Vec<_> = model.components.iter().map(|c| c.index).collect();
    for id in ids {
        let fasta = model.components.get(id).unwrap().to_legacy_fasta(&model.sequences);
        model.set_alignment(id, &fasta).unwrap();
    }
    add_tree(&mut model, "A1", "((A1,A2),A3);");

    assert!(model.get_status(Stage::Trees).is_partial());
    assert!(!model.get_status(Stage::Trees).is_complete());
    assert!(matches!(
        create_nrfg(&mut model, &PipelineConfig::default()),
        Err(LegoError::NotReady(_))
    ));
    assert!(model.fusion_events.is_empty());
}
