//! Default clustering of sequences into components.
//!
//! Two sequences share a component when some edge between them covers at
//! least `major_coverage` of both. A gene fused from two families is only
//! partly covered by either, so it ends up in a component of its own with the
//! source families among its minor sequences.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

use crate::core::edge::EdgeQuery;
use crate::core::error::LegoError;
use crate::core::subsequence::Subsequence;
use crate::core::types::SequenceId;
use crate::model::stage::Stage;
use crate::model::store::Model;

/// A component's major sequences and minor subsequences
pub type ComponentGroup = (BTreeSet<SequenceId>, Vec<Subsequence>);

/// Cluster the model's sequences and register the components.
/// Returns the number of components created.
///
/// # Errors
///
/// Returns `LegoError::NotReady` if components already exist or there are no
/// edges yet.
pub fn detect_components(model: &mut Model, major_coverage: f64) -> Result<usize, LegoError> {
    model.assert_create(Stage::Components)?;

    let groups = find_groups(model, major_coverage)?;
    let count = groups.len();
    model.create_components(groups)?;

    info!("Detected {count} components");
    Ok(count)
}

/// Compute components without registering them
///
/// # Errors
///
/// Returns `LegoError::NotFound` if an edge references a missing sequence.
pub fn find_groups(model: &Model, major_coverage: f64) -> Result<Vec<ComponentGroup>, LegoError> {
    let ids: Vec<SequenceId> = model.sequences.ids().collect();
    let position: HashMap<SequenceId, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
    let mut sets = DisjointSets::new(ids.len());

    for edge in model.edges.iter() {
        let left = model.sequences.require(edge.left.sequence)?;
        let right = model.sequences.require(edge.right.sequence)?;

        if covers(&edge.left, left.length, major_coverage)
            && covers(&edge.right, right.length, major_coverage)
        {
            sets.union(position[&left.id], position[&right.id]);
        }
    }

    // Sequences are in accession order, so components are too
    let mut roots: BTreeMap<usize, usize> = BTreeMap::new();
    let mut majors: Vec<BTreeSet<SequenceId>> = Vec::new();
    for (i, &id) in ids.iter().enumerate() {
        let root = sets.find(i);
        let group = *roots.entry(root).or_insert_with(|| {
            majors.push(BTreeSet::new());
            majors.len() - 1
        });
        majors[group].insert(id);
    }

    majors
        .into_iter()
        .map(|group| {
            let minors = minor_subsequences(model, &group)?;
            debug!("Component of {} majors has {} minor subsequences", group.len(), minors.len());
            Ok((group, minors))
        })
        .collect()
}

fn covers(subsequence: &Subsequence, length: u32, fraction: f64) -> bool {
    f64::from(subsequence.length()) >= fraction * f64::from(length)
}

/// Whole of each major plus the far side of every edge touching one
fn minor_subsequences(model: &Model, majors: &BTreeSet<SequenceId>) -> Result<Vec<Subsequence>, LegoError> {
    let mut found = Vec::new();

    for &major in majors {
        found.push(model.sequences.require(major)?.totality());

        for edge in model.edges.find_sequence(major) {
            found.push(edge.opposite(EdgeQuery::Sequence(major))?.clone());
        }
    }

    collapse(found)
}

/// Fold overlapping ranges together, then merge adjacent ones
fn collapse(mut subsequences: Vec<Subsequence>) -> Result<Vec<Subsequence>, LegoError> {
    subsequences.sort_by_key(|s| (s.sequence, s.start(), s.end()));

    let mut folded: Vec<Subsequence> = Vec::with_capacity(subsequences.len());
    for next in subsequences {
        match folded.last_mut() {
            Some(last) if last.has_overlap(&next) => *last = last.union(&next)?,
            _ => folded.push(next),
        }
    }

    let mut merged = Subsequence::merge_list(folded);
    merged.sort_by_key(|s| (s.sequence, s.start()));
    Ok(merged)
}

/// Union-find with path halving
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a != b {
            self.parent[a.max(b)] = a.min(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ComponentId;
    use crate::engine::fixtures::{fused_model, id};

    #[test]
    fn test_fused_gene_gets_own_component() {
        let model = fused_model();
        assert_eq!(model.components.len(), 3);

        let a = model.components.get(ComponentId(0)).unwrap();
        assert_eq!(a.major_sequences, [id(&model, "A1"), id(&model, "A2"), id(&model, "A3")].into());
        let c = model.components.find_component_for_major_sequence(id(&model, "C1")).unwrap();
        assert_eq!(c.index, ComponentId(2));
        assert_eq!(c.major_sequences, [id(&model, "C1"), id(&model, "C2")].into());
    }

    #[test]
    fn test_minor_subsequences() {
        let model = fused_model();

        let a = model.components.get(ComponentId(0)).unwrap();
        let c1 = id(&model, "C1");
        assert_eq!(
            a.get_minor_subsequence_by_sequence(c1).unwrap(),
            &Subsequence::new(c1, 1, 10).unwrap()
        );

        let c = model.components.get(ComponentId(2)).unwrap();
        assert_eq!(
            c.minor_sequences(),
            ["A1", "A2", "B1", "B2", "C1", "C2"].iter().map(|a| id(&model, a)).collect()
        );
        // The totality swallows the edge ranges on C1
        assert_eq!(
            c.get_minor_subsequence_by_sequence(c1).unwrap(),
            &Subsequence::new(c1, 1, 20).unwrap()
        );
    }

    #[test]
    fn test_incoming_components_follow_fusion() {
        let model = fused_model();
        assert_eq!(model.components.incoming_components(ComponentId(0)), vec![ComponentId(2)]);
        assert_eq!(
            model.components.incoming_components(ComponentId(2)),
            vec![ComponentId(0), ComponentId(1)]
        );
    }

    #[test]
    fn test_collapse_overlapping_and_adjacent() {
        let s = |start, end| Subsequence::new(SequenceId(1), start, end).unwrap();
        let other = Subsequence::new(SequenceId(2), 1, 5).unwrap();
        let collapsed = collapse(vec![s(5, 10), other.clone(), s(1, 6), s(11, 20), s(30, 40)]).unwrap();
        assert_eq!(collapsed, vec![s(1, 20), s(30, 40), other]);
    }

    #[test]
    fn test_detect_requires_edges() {
        let mut model = Model::new();
        model.add_sequence("A").unwrap();
        assert!(matches!(
            detect_components(&mut model, 0.8),
            Err(LegoError::NotReady(_))
        ));
    }
}
