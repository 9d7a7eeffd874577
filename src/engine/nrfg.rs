//! Assembly of the N-rooted fusion graph.
//!
//! Genes and fusion points are grouped into subsets, each subset gets a graph
//! built from the consensus splits, and the subset graphs are joined on their
//! shared genes and points.

use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::core::error::LegoError;
use crate::core::graph::LegoGraph;
use crate::core::nrfg::{FusionGraph, Pregraph, Subgraph, Subset};
use crate::core::split::Bipartition;
use crate::core::types::LegoNode;
use crate::engine::config::PipelineConfig;
use crate::model::stage::Stage;
use crate::model::store::Model;

/// Group the model's leaves into subsets. Returns the number of subsets.
///
/// Every fusion point gives two subsets: its pertinent inner and outer
/// genes, each with the point itself. Identical sets are kept once. Genes of
/// a component tree that no point covers join the first subset holding
/// another gene of that tree, or form a subset of their own. Without fusions
/// there is a single subset of every gene.
///
/// # Errors
///
/// Returns `LegoError::NotReady` if subsets exist or the consensus is not
/// complete, or `LegoError::NotFound` if the trees have no leaves.
pub fn create_subsets(model: &mut Model) -> Result<usize, LegoError> {
    model.assert_create(Stage::Subsets)?;

    let pertinent: BTreeSet<BTreeSet<LegoNode>> = model
        .fusion_events
        .points()
        .flat_map(|(formation, point)| [point.get_pertinent_inner(formation), point.get_pertinent_outer()])
        .collect();
    let mut sets: Vec<BTreeSet<LegoNode>> = pertinent.into_iter().collect();

    if sets.is_empty() {
        let genes: BTreeSet<LegoNode> = model
            .components
            .iter()
            .filter_map(|c| c.leaves.as_ref())
            .flatten()
            .filter(|node| node.as_sequence().is_some())
            .copied()
            .collect();

        if !genes.is_empty() {
            sets.push(genes);
        }
    } else {
        for component in model.components.iter() {
            let Some(leaves) = &component.leaves else {
                continue;
            };

            let leftover: Vec<LegoNode> = leaves
                .iter()
                .filter(|node| !sets.iter().any(|set| set.contains(*node)))
                .copied()
                .collect();
            if leftover.is_empty() {
                continue;
            }

            debug!("{} genes of component {} are in no pertinent set", leftover.len(), component.index);
            match sets.iter_mut().find(|set| !set.is_disjoint(leaves)) {
                Some(set) => set.extend(leftover),
                None => sets.push(leftover.into_iter().collect()),
            }
        }
    }

    if sets.is_empty() {
        return Err(LegoError::not_found("There are no tree leaves to place in subsets"));
    }

    model.subsets = sets
        .into_iter()
        .enumerate()
        .map(|(index, contents)| Subset::new(index, contents))
        .collect();

    info!("Created {} subsets", model.subsets.len());
    Ok(model.subsets.len())
}

/// Build, for every subset, one graph per component tree sharing leaves with
/// it, from that component's splits restricted to the shared leaves.
///
/// # Errors
///
/// Returns `LegoError::NotReady` if pregraphs exist or subsets are not complete.
pub fn create_pregraphs(model: &mut Model) -> Result<(), LegoError> {
    model.assert_create(Stage::Pregraphs)?;

    let pregraphs: Vec<Vec<Pregraph>> = model
        .subsets
        .iter()
        .map(|subset| {
            model
                .components
                .iter()
                .filter_map(|component| {
                    let leaves: BTreeSet<LegoNode> = component
                        .leaves
                        .as_ref()?
                        .intersection(&subset.contents)
                        .copied()
                        .collect();
                    if leaves.is_empty() {
                        return None;
                    }

                    let splits = component
                        .splits
                        .iter()
                        .flatten()
                        .filter_map(|&id| model.splits.get(id))
                        .map(|split| &split.bipartition);

                    Some(Pregraph {
                        graph: LegoGraph::from_splits(&leaves, splits),
                        subset: subset.index,
                        component: component.index,
                    })
                })
                .collect()
        })
        .collect();

    for (subset, graphs) in model.subsets.iter_mut().zip(pregraphs) {
        debug!("Subset {} has {} pregraphs", subset.index, graphs.len());
        subset.pregraphs = Some(graphs);
    }

    Ok(())
}

/// Build one graph per subset from the consensus splits.
///
/// # Errors
///
/// Returns `LegoError::NotReady` if subgraphs exist or pregraphs are not
/// complete, or `LegoError::UnsupportedVariant` for an unknown algorithm.
pub fn create_subgraphs(model: &mut Model, config: &PipelineConfig) -> Result<(), LegoError> {
    model.assert_create(Stage::Subgraphs)?;
    config.validate()?;

    let consensus = model
        .consensus
        .as_ref()
        .ok_or_else(|| LegoError::NotReady("Cannot build subgraphs without a consensus".to_string()))?;
    let splits: Vec<&Bipartition> = consensus
        .iter()
        .filter_map(|&id| model.splits.get(id))
        .map(|split| &split.bipartition)
        .collect();

    let subgraphs: Vec<Subgraph> = model
        .subsets
        .iter()
        .map(|subset| Subgraph {
            graph: LegoGraph::from_splits(&subset.contents, splits.iter().copied()),
            subset: subset.index,
            algorithm: config.subgraph_algorithm.clone(),
        })
        .collect();

    info!("Created {} subgraphs", subgraphs.len());
    model.subgraphs = subgraphs;
    Ok(())
}

/// Join the subgraphs on their shared genes and points.
///
/// # Errors
///
/// Returns `LegoError::NotReady` if the fused graph exists or subgraphs are
/// not complete.
pub fn create_fused(model: &mut Model) -> Result<(), LegoError> {
    model.assert_create(Stage::Fused)?;

    let graph = LegoGraph::union(model.subgraphs.iter().map(|s| &s.graph));
    info!(
        "Fused graph has {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    model.fusion_graph_unclean = Some(FusionGraph {
        graph,
        is_clean: false,
    });
    Ok(())
}

/// Copy the fused graph without redundant clades. Returns the number of
/// nodes removed.
///
/// # Errors
///
/// Returns `LegoError::NotReady` if the clean graph exists or the fused graph
/// does not.
pub fn create_cleaned(model: &mut Model) -> Result<usize, LegoError> {
    model.assert_create(Stage::Cleaned)?;

    let mut graph = model
        .fusion_graph_unclean
        .as_ref()
        .map(|fused| fused.graph.clone())
        .ok_or_else(|| LegoError::NotReady("Cannot clean a fused graph that does not exist".to_string()))?;

    let removed = graph.clean();
    info!("Cleaning removed {removed} nodes");

    model.fusion_graph_clean = Some(FusionGraph {
        graph,
        is_clean: true,
    });
    Ok(removed)
}
