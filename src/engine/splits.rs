use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

use crate::core::error::LegoError;
use crate::core::graph::LegoGraph;
use crate::core::split::{Bipartition, EvidenceRule};
use crate::core::types::{ComponentId, LegoNode, SplitId};
use crate::engine::config::PipelineConfig;
use crate::model::stage::Stage;
use crate::model::store::Model;

/// One bipartition per edge of `graph`, in edge order without repeats.
///
/// `inside` holds the leaves below the edge. Edges ending at a leaf give the
/// trivial splits.
pub fn splits_of_graph(graph: &LegoGraph) -> Vec<Bipartition> {
    let all = graph.leaves();
    let mut seen = HashSet::new();

    graph
        .graph
        .edge_references()
        .map(|edge| {
            let inside = graph.leaves_beyond(edge.target(), edge.source());
            let outside = all.difference(&inside).copied().collect();
            Bipartition::new(inside, outside)
        })
        .filter(|split| seen.insert(split.clone()))
        .collect()
}

/// Collect the splits of every component tree into the model's split arena.
/// Returns the number of distinct splits.
///
/// The unrooted tree is used where present, so a bifurcating root does not
/// give the same split twice with its sides swapped.
///
/// # Errors
///
/// Returns `LegoError::NotReady` if splits exist or fusions are not yet
/// detected, or `LegoError::NotFound` if a component lacks a tree.
pub fn create_splits(model: &mut Model) -> Result<usize, LegoError> {
    model.assert_create(Stage::Splits)?;

    let mut found = Vec::with_capacity(model.components.len());
    for component in model.components.iter() {
        let tree = component
            .tree_unrooted
            .as_ref()
            .or(component.tree.as_ref())
            .ok_or_else(|| LegoError::not_found(format!("Component {} has no tree", component.index)))?;

        found.push((component.index, splits_of_graph(tree), tree.leaves()));
    }

    for (component, bipartitions, leaves) in found {
        let ids: BTreeSet<SplitId> = bipartitions
            .into_iter()
            .map(|bipartition| model.splits.add(bipartition, component))
            .collect();

        debug!("Component {component} has {} splits over {} leaves", ids.len(), leaves.len());

        if let Some(target) = model.components.get_mut(component) {
            target.splits = Some(ids);
            target.leaves = Some(leaves);
        }
    }

    info!("Found {} distinct splits", model.splits.len());
    Ok(model.splits.len())
}

/// Record, for every split, which components support it, which contradict
/// it and which cannot judge it.
///
/// A component can judge a split when its tree spans all of the split's
/// leaves. It supports the split when one of its own splits evidences it
/// under `rule`.
///
/// # Errors
///
/// Returns `LegoError::NotReady` if splits are not complete.
pub fn evidence_splits(model: &mut Model, rule: EvidenceRule) -> Result<(), LegoError> {
    if !model.get_status(Stage::Splits).is_complete() {
        return Err(LegoError::NotReady(
            "Cannot evidence splits before the 'splits' stage is complete".to_string(),
        ));
    }

    let judges: Vec<(ComponentId, &BTreeSet<LegoNode>, Vec<&Bipartition>)> = model
        .components
        .iter()
        .filter_map(|c| {
            let leaves = c.leaves.as_ref()?;
            let own = c
                .splits
                .iter()
                .flatten()
                .filter_map(|&id| model.splits.get(id))
                .map(|s| &s.bipartition)
                .collect();
            Some((c.index, leaves, own))
        })
        .collect();

    let mut results = Vec::with_capacity(model.splits.len());
    for split in model.splits.iter() {
        let all = split.bipartition.all();
        let mut support = BTreeSet::new();
        let mut against = BTreeSet::new();
        let mut unused = BTreeSet::new();

        for (component, leaves, own) in &judges {
            if !all.is_subset(leaves) {
                unused.insert(*component);
            } else if own
                .iter()
                .any(|other| split.bipartition.is_evidenced_by(other, rule) == Some(true))
            {
                support.insert(*component);
            } else {
                against.insert(*component);
            }
        }

        results.push((split.index, support, against, unused));
    }

    for (id, support, against, unused) in results {
        if let Some(split) = model.splits.get_mut(id) {
            split.evidence_for = Some(support);
            split.evidence_against = Some(against);
            split.evidence_unused = Some(unused);
        }
    }

    Ok(())
}

/// Evidence the splits and keep those accepted by the consensus policy.
/// Returns the number of splits kept.
///
/// # Errors
///
/// Returns `LegoError::NotReady` if the consensus exists or splits are not
/// complete.
pub fn create_consensus(model: &mut Model, config: &PipelineConfig) -> Result<usize, LegoError> {
    model.assert_create(Stage::Consensus)?;

    evidence_splits(model, config.evidence_rule)?;

    let policy = config.consensus.normalized();
    let consensus: BTreeSet<SplitId> = model
        .splits
        .iter()
        .filter(|split| {
            let accepted = policy.accepts(split);
            if !accepted {
                debug!("{} rejected by the consensus", split.name());
            }
            accepted
        })
        .map(|split| split.index)
        .collect();

    info!("Consensus keeps {} of {} splits", consensus.len(), model.splits.len());
    let count = consensus.len();
    model.consensus = Some(consensus);
    Ok(count)
}
