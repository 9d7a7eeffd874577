use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::core::types::{ComponentId, LegoNode, SplitId};

/// How a split may be supported by another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceRule {
    /// `inside ⊆ inside` and `outside ⊆ outside`
    #[default]
    Strict,
    /// As `Strict`, but a split whose sides are swapped also supports
    AllowFlipped,
}

/// Leaves on either side of a tree edge.
///
/// `inside` holds the leaves downstream of the edge in the rooted tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bipartition {
    pub inside: BTreeSet<LegoNode>,
    pub outside: BTreeSet<LegoNode>,
}

impl Bipartition {
    pub fn new(inside: BTreeSet<LegoNode>, outside: BTreeSet<LegoNode>) -> Self {
        Self { inside, outside }
    }

    /// Every leaf, regardless of side
    pub fn all(&self) -> BTreeSet<LegoNode> {
        self.inside.union(&self.outside).copied().collect()
    }

    /// A single leaf against the rest (or nothing against everything)
    pub fn is_trivial(&self) -> bool {
        self.inside.len() <= 1 || self.outside.len() <= 1
    }

    /// Both sides with everything outside `leaves` removed
    pub fn restrict(&self, leaves: &BTreeSet<LegoNode>) -> Self {
        Self {
            inside: self.inside.intersection(leaves).copied().collect(),
            outside: self.outside.intersection(leaves).copied().collect(),
        }
    }

    /// Is this bipartition supported by `other` under `rule`?
    ///
    /// `None` when `other` does not span every leaf of `self`.
    pub fn is_evidenced_by(&self, other: &Bipartition, rule: EvidenceRule) -> Option<bool> {
        let all = self.all();
        if !all.is_subset(&other.all()) {
            return None;
        }

        let straight = self.inside.is_subset(&other.inside) && self.outside.is_subset(&other.outside);
        let flipped = self.inside.is_subset(&other.outside) && self.outside.is_subset(&other.inside);

        Some(match rule {
            EvidenceRule::Strict => straight,
            EvidenceRule::AllowFlipped => straight || flipped,
        })
    }

    /// Render as `a,b|c,d` using `namer` for each leaf
    pub fn describe(&self, namer: impl Fn(&LegoNode) -> String) -> String {
        let side = |set: &BTreeSet<LegoNode>| set.iter().map(&namer).collect::<Vec<_>>().join(",");
        format!("{}|{}", side(&self.inside), side(&self.outside))
    }
}

/// A split observed in at least one component tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegoSplit {
    pub index: SplitId,
    pub bipartition: Bipartition,

    /// Components whose trees contain this split
    pub components: BTreeSet<ComponentId>,

    // Set by the evidence pass, `None` before
    pub evidence_for: Option<BTreeSet<ComponentId>>,
    pub evidence_against: Option<BTreeSet<ComponentId>>,
    pub evidence_unused: Option<BTreeSet<ComponentId>>,
}

impl LegoSplit {
    pub fn new(index: SplitId, bipartition: Bipartition) -> Self {
        Self {
            index,
            bipartition,
            components: BTreeSet::new(),
            evidence_for: None,
            evidence_against: None,
            evidence_unused: None,
        }
    }

    /// `Some(true)` if `other` supports this split, `Some(false)` if it
    /// rejects it and `None` if it cannot say.
    pub fn is_evidenced_by(&self, other: &LegoSplit, rule: EvidenceRule) -> Option<bool> {
        self.bipartition.is_evidenced_by(&other.bipartition, rule)
    }

    pub fn has_evidence(&self) -> bool {
        self.evidence_for.is_some()
    }

    pub fn name(&self) -> String {
        format!("split{}", self.index.0)
    }
}

impl PartialEq for LegoSplit {
    fn eq(&self, other: &Self) -> bool {
        self.bipartition == other.bipartition
    }
}

impl Eq for LegoSplit {}

impl std::hash::Hash for LegoSplit {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.bipartition.hash(state);
    }
}

/// Every distinct split in the model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitCollection {
    splits: Vec<LegoSplit>,

    /// Index: bipartition -> split
    #[serde(skip)]
    by_bipartition: HashMap<Bipartition, SplitId>,
}

impl SplitCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bipartition` as seen in `component`, reusing an existing
    /// split if the same bipartition was already registered.
    pub fn add(&mut self, bipartition: Bipartition, component: ComponentId) -> SplitId {
        let id = match self.by_bipartition.get(&bipartition) {
            Some(&id) => id,
            None => {
                let id = SplitId(self.splits.len());
                self.by_bipartition.insert(bipartition.clone(), id);
                self.splits.push(LegoSplit::new(id, bipartition));
                id
            }
        };

        self.splits[id.0].components.insert(component);
        id
    }

    pub fn get(&self, id: SplitId) -> Option<&LegoSplit> {
        self.splits.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: SplitId) -> Option<&mut LegoSplit> {
        self.splits.get_mut(id.0)
    }

    pub fn find(&self, bipartition: &Bipartition) -> Option<&LegoSplit> {
        self.by_bipartition.get(bipartition).and_then(|id| self.get(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LegoSplit> {
        self.splits.iter()
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    pub fn clear(&mut self) {
        self.splits.clear();
        self.by_bipartition.clear();
    }

    /// Forget the evidence computed for every split
    pub fn clear_evidence(&mut self) {
        for split in &mut self.splits {
            split.evidence_for = None;
            split.evidence_against = None;
            split.evidence_unused = None;
        }
    }

    /// Rebuild the lookup index after deserialization
    pub fn rebuild_indexes(&mut self) {
        self.by_bipartition = self
            .splits
            .iter()
            .map(|s| (s.bipartition.clone(), s.index))
            .collect();
    }
}
