//! Derivation engines, one per stage after the user's inputs.
//!
//! Each `create_*` function checks the stage tracker first and leaves the
//! model untouched when it refuses.
//!
//! | Stage | Function |
//! |-------|----------|
//! | Components | [`components::detect_components`] |
//! | Fusions | [`fusion::create_fusions`] |
//! | Splits | [`splits::create_splits`] |
//! | Consensus | [`splits::create_consensus`] |
//! | Subsets | [`nrfg::create_subsets`] |
//! | Pregraphs | [`nrfg::create_pregraphs`] |
//! | Subgraphs | [`nrfg::create_subgraphs`] |
//! | Fused | [`nrfg::create_fused`] |
//! | Cleaned | [`nrfg::create_cleaned`] |
//!
//! Alignments and trees come from external tools and are stored with
//! [`Model::set_alignment`] and [`Model::set_tree`].

pub mod components;
pub mod config;
pub mod fusion;
pub mod nrfg;
pub mod splits;

use tracing::info;

use crate::core::error::LegoError;
use crate::model::stage::Stage;
use crate::model::store::Model;
use config::PipelineConfig;

/// Stages derived from the component trees, in order
pub const NRFG_STAGES: [Stage; 8] = [
    Stage::Fusions,
    Stage::Splits,
    Stage::Consensus,
    Stage::Subsets,
    Stage::Pregraphs,
    Stage::Subgraphs,
    Stage::Fused,
    Stage::Cleaned,
];

/// Run a single derived stage
///
/// # Errors
///
/// Returns `LegoError::UnsupportedVariant` for a stage supplied by the user or
/// an external tool, or whatever the stage's engine returns.
pub fn create_stage(model: &mut Model, stage: Stage, config: &PipelineConfig) -> Result<(), LegoError> {
    match stage {
        Stage::Components => components::detect_components(model, config.major_coverage).map(|_| ()),
        Stage::Fusions => fusion::create_fusions(model).map(|_| ()),
        Stage::Splits => splits::create_splits(model).map(|_| ()),
        Stage::Consensus => splits::create_consensus(model, config).map(|_| ()),
        Stage::Subsets => nrfg::create_subsets(model).map(|_| ()),
        Stage::Pregraphs => nrfg::create_pregraphs(model),
        Stage::Subgraphs => nrfg::create_subgraphs(model, config),
        Stage::Fused => nrfg::create_fused(model),
        Stage::Cleaned => nrfg::create_cleaned(model).map(|_| ()),
        Stage::Sequences | Stage::Edges | Stage::Alignments | Stage::Trees => {
            Err(LegoError::UnsupportedVariant {
                what: "derived stage",
                value: stage.to_string(),
            })
        }
    }
}

/// Run every stage from fusion detection to the cleaned NRFG that is not
/// already complete.
///
/// # Errors
///
/// Returns `LegoError::NotReady` if the component trees are not all present,
/// or the first error raised by a stage. Stages completed before the error
/// are kept.
pub fn create_nrfg(model: &mut Model, config: &PipelineConfig) -> Result<(), LegoError> {
    config.validate()?;

    for stage in NRFG_STAGES {
        if model.get_status(stage).is_complete() {
            continue;
        }
        create_stage(model, stage, config)?;
        info!("{stage}: {}", stage.headline(model));
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::core::types::{ComponentId, SequenceId};
    use crate::engine::components::detect_components;
    use crate::engine::config::DEFAULT_MAJOR_COVERAGE;
    use crate::model::store::Model;
    use crate::parsing::edges::{import_edges, parse_edges_text};
    use crate::parsing::fasta::{import_fasta, read_fasta_text};
    use crate::parsing::newick::parse_newick;

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

    /// Families A and B, with C1 and C2 fused from the first two genes of each
    pub(crate) fn fused_model() -> Model {
        let mut model = Model::new();
        import_fasta(&mut model, &read_fasta_text(FASTA).unwrap()).unwrap();
        import_edges(&mut model, &parse_edges_text(EDGES).unwrap()).unwrap();
        detect_components(&mut model, DEFAULT_MAJOR_COVERAGE).unwrap();
        model
    }

    /// [`fused_model`] with an alignment and tree for every component
    pub(crate) fn treed_model() -> Model {
        let mut model = fused_model();

        for i in 0..3 {
            let fasta = model.components.get(ComponentId(i)).unwrap().to_legacy_fasta(&model.sequences);
            model.set_alignment(ComponentId(i), &fasta).unwrap();
        }

        for (i, newick) in ["((A1,A2),A3);", "((B1,B2),B3);", "(C1,C2);"].iter().enumerate() {
            let tree = parse_newick(newick, &model).unwrap();
            model.set_tree(ComponentId(i), tree, Some((*newick).to_string())).unwrap();
        }

        model
    }

    pub(crate) fn id(model: &Model, accession: &str) -> SequenceId {
        model.find_sequence_by_accession(accession).unwrap().id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::treed_model;

    #[test]
    fn test_create_nrfg_runs_every_stage() {
        let mut model = treed_model();
        create_nrfg(&mut model, &PipelineConfig::default()).unwrap();

        for stage in Stage::ALL {
            assert!(model.get_status(stage).is_complete(), "{stage} is not complete");
        }

        // Running again has nothing left to do
        create_nrfg(&mut model, &PipelineConfig::default()).unwrap();
    }

    #[test]
    fn test_create_nrfg_needs_trees() {
        let mut model = fixtures::fused_model();
        assert!(matches!(
            create_nrfg(&mut model, &PipelineConfig::default()),
            Err(LegoError::NotReady(_))
        ));
    }

    #[test]
    fn test_user_stages_are_not_derived() {
        let mut model = treed_model();
        assert!(matches!(
            create_stage(&mut model, Stage::Trees, &PipelineConfig::default()),
            Err(LegoError::UnsupportedVariant { .. })
        ));
    }
}
