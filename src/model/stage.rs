//! Stage dependency tracking.
//!
//! Model data is produced in a fixed order. Each stage reads the data of
//! the stage before it, so a stage may only be created once its
//! predecessor is complete, and only dropped once nothing after it exists.
//! Status is always probed from the data itself and never stored.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::LegoError;
use crate::model::store::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Sequences,
    Edges,
    Components,
    Alignments,
    Trees,
    Fusions,
    Splits,
    Consensus,
    Subsets,
    Pregraphs,
    Subgraphs,
    Fused,
    Cleaned,
}

impl Stage {
    /// Every stage, in dependency order
    pub const ALL: [Stage; 13] = [
        Stage::Sequences,
        Stage::Edges,
        Stage::Components,
        Stage::Alignments,
        Stage::Trees,
        Stage::Fusions,
        Stage::Splits,
        Stage::Consensus,
        Stage::Subsets,
        Stage::Pregraphs,
        Stage::Subgraphs,
        Stage::Fused,
        Stage::Cleaned,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sequences => "sequences",
            Self::Edges => "edges",
            Self::Components => "components",
            Self::Alignments => "alignments",
            Self::Trees => "trees",
            Self::Fusions => "fusions",
            Self::Splits => "splits",
            Self::Consensus => "consensus",
            Self::Subsets => "subsets",
            Self::Pregraphs => "pregraphs",
            Self::Subgraphs => "subgraphs",
            Self::Fused => "fused",
            Self::Cleaned => "cleaned",
        }
    }

    /// The stage whose data this stage is built from
    pub fn requires(self) -> Option<Stage> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Stages built directly from this one
    pub fn dependants(self) -> impl Iterator<Item = Stage> {
        Self::ALL.into_iter().filter(move |s| s.requires() == Some(self))
    }

    /// One flag per element of the stage's data, set where the element exists.
    ///
    /// Per-component and per-subset stages report one flag each; the others
    /// report a single flag.
    pub fn probe(self, model: &Model) -> Vec<bool> {
        match self {
            Self::Sequences => vec![!model.sequences.is_empty()],
            Self::Edges => vec![!model.edges.is_empty()],
            Self::Components => vec![!model.components.is_empty()],
            Self::Alignments => model.components.iter().map(|c| c.alignment.is_some()).collect(),
            Self::Trees => model.components.iter().map(|c| c.tree.is_some()).collect(),
            Self::Fusions => vec![model.fusion_events.detected],
            Self::Splits => model.components.iter().map(|c| c.splits.is_some()).collect(),
            Self::Consensus => vec![model.consensus.is_some()],
            Self::Subsets => vec![!model.subsets.is_empty()],
            Self::Pregraphs => model.subsets.iter().map(|s| s.pregraphs.is_some()).collect(),
            Self::Subgraphs => vec![!model.subgraphs.is_empty()],
            Self::Fused => vec![model.fusion_graph_unclean.is_some()],
            Self::Cleaned => vec![model.fusion_graph_clean.is_some()],
        }
    }

    /// Short description of the stage's data
    pub fn headline(self, model: &Model) -> String {
        match self {
            Self::Sequences => format!(
                "{} sequences, {} with sites",
                model.sequences.len(),
                model.sequences.num_fasta()
            ),
            Self::Edges => format!("{} edges", model.edges.len()),
            Self::Components => format!("{} components", model.components.len()),
            Self::Alignments => format!(
                "{} of {} components aligned",
                model.components.num_aligned(),
                model.components.len()
            ),
            Self::Trees => format!(
                "{} of {} components have trees",
                model.components.num_trees(),
                model.components.len()
            ),
            Self::Fusions => format!(
                "{} events, {} points",
                model.fusion_events.len(),
                model.fusion_events.num_points()
            ),
            Self::Splits => format!("{} splits", model.splits.len()),
            Self::Consensus => format!(
                "{} of {} splits",
                model.consensus.as_ref().map_or(0, |c| c.len()),
                model.splits.len()
            ),
            Self::Subsets => format!("{} subsets", model.subsets.len()),
            Self::Pregraphs => format!("{} pregraphs", model.iter_pregraphs().count()),
            Self::Subgraphs => format!("{} subgraphs", model.subgraphs.len()),
            Self::Fused => graph_headline(model.fusion_graph_unclean.as_ref()),
            Self::Cleaned => graph_headline(model.fusion_graph_clean.as_ref()),
        }
    }
}

fn graph_headline(graph: Option<&crate::core::nrfg::FusionGraph>) -> String {
    graph.map_or_else(
        || "no graph".to_string(),
        |g| format!("{} nodes, {} edges", g.graph.node_count(), g.graph.edge_count()),
    )
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

impl std::str::FromStr for Stage {
    type Err = LegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|stage| stage.name() == lower)
            .ok_or_else(|| LegoError::UnsupportedVariant {
                what: "stage",
                value: s.to_string(),
            })
    }
}

/// Status of one stage, computed from the model's data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStatus {
    pub stage: Stage,
    elements: Vec<bool>,
}

impl StageStatus {
    /// At least one element, and every element present
    pub fn is_complete(&self) -> bool {
        !self.elements.is_empty() && self.elements.iter().all(|&e| e)
    }

    /// At least one element present
    pub fn is_partial(&self) -> bool {
        self.elements.iter().any(|&e| e)
    }

    pub fn is_none(&self) -> bool {
        !self.is_partial()
    }

    pub fn describe(&self) -> &'static str {
        if self.is_complete() {
            "complete"
        } else if self.is_partial() {
            "partial"
        } else {
            "none"
        }
    }
}

impl Model {
    pub fn get_status(&self, stage: Stage) -> StageStatus {
        StageStatus {
            stage,
            elements: stage.probe(self),
        }
    }

    /// Is the stage's predecessor (if any) complete?
    pub fn requisite_complete(&self, stage: Stage) -> bool {
        stage
            .requires()
            .map_or(true, |required| self.get_status(required).is_complete())
    }

    /// Check that `stage` may be written to.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::NotReady` if the stage is already complete or its
    /// predecessor is not.
    pub fn assert_create(&self, stage: Stage) -> Result<(), LegoError> {
        if self.get_status(stage).is_complete() {
            return Err(LegoError::NotReady(format!(
                "Cannot create the '{stage}' stage because this data already exists"
            )));
        }

        if let Some(required) = stage.requires() {
            if !self.get_status(required).is_complete() {
                return Err(LegoError::NotReady(format!(
                    "Cannot create the '{stage}' stage because the preceding stage '{required}' is not complete"
                )));
            }
        }

        Ok(())
    }

    /// Check that `stage` may be dropped.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::NotReady` if the stage has no data, or
    /// `LegoError::InUse` if a later stage relies on it.
    pub fn assert_drop(&self, stage: Stage) -> Result<(), LegoError> {
        if self.get_status(stage).is_none() {
            return Err(LegoError::NotReady(format!(
                "Cannot drop the '{stage}' stage because this data does not yet exist"
            )));
        }

        if let Some(dependant) = stage.dependants().find(|&s| !self.get_status(s).is_none()) {
            return Err(LegoError::InUse(format!(
                "Cannot drop the '{stage}' stage because the '{dependant}' stage relies on it; drop that stage first"
            )));
        }

        Ok(())
    }

    /// Remove the data of `stage`.
    ///
    /// # Errors
    ///
    /// As [`Model::assert_drop`]. The model is unchanged on error.
    pub fn drop_stage(&mut self, stage: Stage) -> Result<(), LegoError> {
        self.assert_drop(stage)?;

        match stage {
            Stage::Sequences => {
                self.sequences.clear();
                self.user_domains.clear();
            }
            Stage::Edges => self.edges.clear(),
            Stage::Components => self.components.clear(),
            Stage::Alignments => {
                for component in self.components.iter_mut() {
                    component.alignment = None;
                }
            }
            Stage::Trees => {
                for component in self.components.iter_mut() {
                    component.tree = None;
                    component.tree_unrooted = None;
                    component.tree_newick = None;
                }
            }
            Stage::Fusions => self.fusion_events.clear(),
            Stage::Splits => {
                self.splits.clear();
                for component in self.components.iter_mut() {
                    component.splits = None;
                    component.leaves = None;
                }
            }
            Stage::Consensus => {
                self.consensus = None;
                self.splits.clear_evidence();
            }
            Stage::Subsets => self.subsets.clear(),
            Stage::Pregraphs => {
                for subset in &mut self.subsets {
                    subset.pregraphs = None;
                }
            }
            Stage::Subgraphs => self.subgraphs.clear(),
            Stage::Fused => self.fusion_graph_unclean = None,
            Stage::Cleaned => self.fusion_graph_clean = None,
        }

        info!("Dropped the '{stage}' stage");
        Ok(())
    }
}
