use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::graph::LegoGraph;
use crate::core::types::{ComponentId, LegoNode};
use crate::model::store::{Model, SequenceCollection};

/// Algorithm name recorded on subgraphs built from the consensus splits
pub const CONSENSUS_ALGORITHM: &str = "consensus";

/// Group of genes and fusion points reconciled into one subgraph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subset {
    pub index: usize,
    pub contents: BTreeSet<LegoNode>,

    /// Per-component graphs for this subset, `None` until created
    pub pregraphs: Option<Vec<Pregraph>>,
}

impl Subset {
    pub fn new(index: usize, contents: BTreeSet<LegoNode>) -> Self {
        Self {
            index,
            contents,
            pregraphs: None,
        }
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// First gene accession in the subset, or its index if it holds only
    /// points. Subsets holding a fusion point add the first point's legacy
    /// accession, as the inner subsets of one formation share their genes.
    pub fn get_accid(&self, sequences: &SequenceCollection) -> String {
        let gene = self
            .contents
            .iter()
            .filter_map(|node| node.as_sequence())
            .filter_map(|id| sequences.get(id))
            .map(|s| s.accession.as_str())
            .min()
            .map_or_else(|| self.index.to_string(), str::to_string);

        match self.contents.iter().find(|node| matches!(node, LegoNode::Point(_))) {
            Some(point) => format!("{gene}_{}", point.legacy_accession()),
            None => gene,
        }
    }

    pub fn name(&self, sequences: &SequenceCollection) -> String {
        format!("subset_{}", self.get_accid(sequences))
    }
}

/// A component's tree restricted to one subset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pregraph {
    pub graph: LegoGraph,
    pub subset: usize,
    pub component: ComponentId,
}

impl Pregraph {
    /// `pregraph_<subset>_in_<component>`
    pub fn name(&self, model: &Model) -> String {
        let subset = model
            .subsets
            .get(self.subset)
            .map_or_else(|| self.subset.to_string(), |s| s.get_accid(&model.sequences));
        let component = model
            .components
            .get(self.component)
            .map_or_else(|| self.component.to_string(), |c| c.get_accid(&model.sequences));

        format!("pregraph_{subset}_in_{component}")
    }
}

/// Reconciled graph for one subset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subgraph {
    pub graph: LegoGraph,
    pub subset: usize,
    pub algorithm: String,
}

impl Subgraph {
    pub fn name(&self, model: &Model) -> String {
        let subset = model
            .subsets
            .get(self.subset)
            .map_or_else(|| self.subset.to_string(), |s| s.get_accid(&model.sequences));

        format!("subgraph_{subset}")
    }
}

/// All subgraphs merged into one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionGraph {
    pub graph: LegoGraph,
    pub is_clean: bool,
}

impl FusionGraph {
    pub fn name(&self) -> &'static str {
        if self.is_clean {
            "nrfg"
        } else {
            "nrfg_unclean"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PointId;

    fn point(index: usize) -> LegoNode {
        LegoNode::Point(PointId {
            event: 0,
            formation: 1,
            point: index,
        })
    }

    #[test]
    fn test_subset_names() {
        let mut model = Model::new();
        let b = model.add_sequence("geneB").unwrap();
        let a = model.add_sequence("geneA").unwrap();

        let genes = Subset::new(0, [LegoNode::from(b), LegoNode::from(a)].into_iter().collect());
        assert_eq!(genes.get_accid(&model.sequences), "geneA");
        assert_eq!(genes.name(&model.sequences), "subset_geneA");

        let with_point = Subset::new(1, [LegoNode::from(b), point(2)].into_iter().collect());
        assert_eq!(with_point.name(&model.sequences), "subset_geneB_GrtP0P1P2");

        let points_only = Subset::new(7, [point(0)].into_iter().collect());
        assert_eq!(points_only.get_accid(&model.sequences), "7_GrtP0P1P0");
        assert_eq!(points_only.len(), 1);
        assert!(!points_only.is_empty());
    }

    #[test]
    fn test_fusion_graph_names() {
        let graph = FusionGraph {
            graph: LegoGraph::new(),
            is_clean: false,
        };
        assert_eq!(graph.name(), "nrfg_unclean");
        assert_eq!(FusionGraph { is_clean: true, ..graph }.name(), "nrfg");
    }

    #[test]
    fn test_graph_names_fall_back_to_indexes() {
        let model = Model::new();
        let subgraph = Subgraph {
            graph: LegoGraph::new(),
            subset: 3,
            algorithm: CONSENSUS_ALGORITHM.to_string(),
        };
        assert_eq!(subgraph.name(&model), "subgraph_3");

        let pregraph = Pregraph {
            graph: LegoGraph::new(),
            subset: 3,
            component: ComponentId(4),
        };
        assert_eq!(pregraph.name(&model), format!("pregraph_3_in_{}", ComponentId(4)));
    }
}
