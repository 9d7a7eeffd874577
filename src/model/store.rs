use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::core::accession;
use crate::core::edge::Edge;
use crate::core::error::LegoError;
use crate::core::fusion::{Formation, FusionEventCollection, Point};
use crate::core::graph::LegoGraph;
use crate::core::nrfg::{FusionGraph, Pregraph, Subgraph, Subset};
use crate::core::sequence::Sequence;
use crate::core::split::SplitCollection;
use crate::core::subsequence::Subsequence;
use crate::core::types::{ComponentId, LegoNode, SequenceId, SiteType, SplitId};
use crate::model::component::ComponentCollection;
use crate::model::stage::Stage;
use crate::parsing::fasta::read_fasta_text;
use crate::utils::validation::{check_sequence_limit, is_valid_accession};

/// Sequences, kept in accession order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceCollection {
    sequences: Vec<Sequence>,

    /// Index: sequence ID -> position in `sequences`
    #[serde(skip)]
    by_id: HashMap<SequenceId, usize>,
}

impl SequenceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert in accession order.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::DuplicateKey` if the accession is already in use.
    /// The collection is unchanged on error.
    pub fn add(&mut self, sequence: Sequence) -> Result<(), LegoError> {
        let position = match self
            .sequences
            .binary_search_by(|s| s.accession.as_str().cmp(&sequence.accession))
        {
            Ok(_) => {
                return Err(LegoError::DuplicateKey(format!(
                    "Cannot add the sequence '{}' because its accession is already in use",
                    sequence.accession
                )))
            }
            Err(position) => position,
        };

        if self.by_id.contains_key(&sequence.id) {
            return Err(LegoError::DuplicateKey(format!(
                "Cannot add the sequence '{}' because its ID {} is already in use",
                sequence.accession, sequence.id
            )));
        }

        self.sequences.insert(position, sequence);
        self.rebuild_indexes();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = SequenceId> + '_ {
        self.sequences.iter().map(|s| s.id)
    }

    pub fn get(&self, id: SequenceId) -> Option<&Sequence> {
        self.by_id.get(&id).map(|&i| &self.sequences[i])
    }

    pub(crate) fn get_mut(&mut self, id: SequenceId) -> Option<&mut Sequence> {
        self.by_id.get(&id).map(|&i| &mut self.sequences[i])
    }

    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if there is no such sequence.
    pub fn require(&self, id: SequenceId) -> Result<&Sequence, LegoError> {
        self.get(id)
            .ok_or_else(|| LegoError::not_found(format!("There is no sequence with the ID {id}")))
    }

    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if no sequence has this accession.
    pub fn find_by_accession(&self, accession: &str) -> Result<&Sequence, LegoError> {
        self.sequences
            .binary_search_by(|s| s.accession.as_str().cmp(accession))
            .map(|i| &self.sequences[i])
            .map_err(|_| {
                LegoError::not_found(format!("There is no sequence with the accession '{accession}'"))
            })
    }

    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if `name` is not a sequence legacy
    /// accession or names a sequence not in the collection.
    pub fn find_by_legacy_accession(&self, name: &str) -> Result<&Sequence, LegoError> {
        let id = SequenceId(accession::parse_sequence(name)?);
        self.get(id).ok_or_else(|| {
            LegoError::not_found(format!("There is no sequence with the internal ID {id}"))
        })
    }

    /// Number of sequences with sites loaded
    pub fn num_fasta(&self) -> usize {
        self.sequences.iter().filter(|s| s.site_array().is_some()).count()
    }

    pub fn to_fasta(&self) -> String {
        self.sequences.iter().map(Sequence::to_fasta).collect()
    }

    pub fn clear(&mut self) {
        self.sequences.clear();
        self.by_id.clear();
    }

    pub fn rebuild_indexes(&mut self) {
        self.by_id = self
            .sequences
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, i))
            .collect();
    }
}

/// Edges, indexed by the sequences at either end
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeCollection {
    edges: Vec<Edge>,

    /// Index: sequence ID -> positions in `edges`
    #[serde(skip)]
    by_sequence: HashMap<SequenceId, Vec<usize>>,
}

impl EdgeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, edge: Edge) {
        let index = self.edges.len();
        self.index_edge(index, &edge);
        self.edges.push(edge);
    }

    /// Edges with an end on `sequence`
    pub fn find_sequence(&self, sequence: SequenceId) -> impl Iterator<Item = &Edge> {
        self.by_sequence
            .get(&sequence)
            .into_iter()
            .flatten()
            .map(|&i| &self.edges[i])
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
        self.by_sequence.clear();
    }

    pub fn rebuild_indexes(&mut self) {
        self.by_sequence.clear();
        let edges = std::mem::take(&mut self.edges);
        for (index, edge) in edges.iter().enumerate() {
            self.index_edge(index, edge);
        }
        self.edges = edges;
    }

    fn index_edge(&mut self, index: usize, edge: &Edge) {
        for sequence in [edge.left.sequence, edge.right.sequence] {
            self.by_sequence.entry(sequence).or_default().push(index);
        }
    }
}

/// Domains specified by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDomainCollection {
    domains: Vec<Subsequence>,

    #[serde(skip)]
    by_sequence: HashMap<SequenceId, Vec<usize>>,
}

impl UserDomainCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, domain: Subsequence) {
        self.by_sequence
            .entry(domain.sequence)
            .or_default()
            .push(self.domains.len());
        self.domains.push(domain);
    }

    /// Domains registered for `sequence`, or a single domain spanning the
    /// whole sequence if there are none.
    pub fn by_sequence(&self, sequence: &Sequence) -> Vec<Subsequence> {
        match self.by_sequence.get(&sequence.id) {
            Some(indexes) => indexes.iter().map(|&i| self.domains[i].clone()).collect(),
            None => vec![sequence.totality()],
        }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subsequence> {
        self.domains.iter()
    }

    pub fn clear(&mut self) {
        self.domains.clear();
        self.by_sequence.clear();
    }

    pub fn rebuild_indexes(&mut self) {
        self.by_sequence.clear();
        for (index, domain) in self.domains.iter().enumerate() {
            self.by_sequence.entry(domain.sequence).or_default().push(index);
        }
    }
}

/// Everything known about a set of genes, from input sequences to the NRFG
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    /// Last sequence ID handed out
    next_id: u32,

    pub sequences: SequenceCollection,
    pub edges: EdgeCollection,
    pub user_domains: UserDomainCollection,
    pub components: ComponentCollection,
    pub fusion_events: FusionEventCollection,

    /// Distinct splits over all component trees
    pub splits: SplitCollection,

    /// Splits accepted by the consensus policy
    pub consensus: Option<BTreeSet<SplitId>>,

    pub subsets: Vec<Subset>,
    pub subgraphs: Vec<Subgraph>,
    pub fusion_graph_unclean: Option<FusionGraph>,
    pub fusion_graph_clean: Option<FusionGraph>,

    #[serde(default)]
    pub comments: Vec<String>,
}

impl Model {
    pub fn new() -> Self {
        Self {
            comments: vec![format!(
                "Model created at {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
            )],
            ..Self::default()
        }
    }

    /// Add a sequence with no sites.
    ///
    /// # Errors
    ///
    /// * `LegoError::InUse` once components exist
    /// * `LegoError::DuplicateKey` if the accession is taken or looks like a
    ///   legacy accession
    /// * `LegoError::InvalidRange` for an unusable accession or a full model
    pub fn add_sequence(&mut self, accession: &str) -> Result<SequenceId, LegoError> {
        self.assert_inputs_open("add sequences")?;

        if let Some(message) = check_sequence_limit(self.sequences.len()) {
            return Err(LegoError::InvalidRange(message));
        }

        if !is_valid_accession(accession) {
            return Err(LegoError::InvalidRange(format!(
                "'{accession}' is not a usable accession: it must be non-empty and free of whitespace and Newick punctuation"
            )));
        }

        let id = SequenceId(self.next_id + 1);
        self.sequences.add(Sequence::new(id, accession)?)?;
        self.next_id = id.0;

        debug!("Added sequence {accession} as {id}");
        Ok(id)
    }

    /// Find a sequence by accession, adding it if missing
    ///
    /// # Errors
    ///
    /// As [`Model::add_sequence`].
    pub fn find_or_add_sequence(&mut self, accession: &str) -> Result<SequenceId, LegoError> {
        match self.sequences.find_by_accession(accession) {
            Ok(sequence) => Ok(sequence.id),
            Err(_) => self.add_sequence(accession),
        }
    }

    /// Load the sites of a sequence, which sets its length.
    ///
    /// # Errors
    ///
    /// * `LegoError::NotFound` if there is no such sequence
    /// * `LegoError::InvalidRange` if the sites are empty or shorter than a
    ///   range already referencing the sequence
    pub fn set_site_array(&mut self, id: SequenceId, sites: &str) -> Result<(), LegoError> {
        let sequence = self
            .sequences
            .get_mut(id)
            .ok_or_else(|| LegoError::not_found(format!("There is no sequence with the ID {id}")))?;

        if (sites.len() as u64) < u64::from(sequence.length) {
            return Err(LegoError::InvalidRange(format!(
                "Sites for '{}' are {} long but positions up to {} are already referenced",
                sequence.accession,
                sites.len(),
                sequence.length
            )));
        }

        sequence.set_site_array(sites)
    }

    /// Create a subsequence, growing the sequence to fit.
    ///
    /// # Errors
    ///
    /// * `LegoError::NotFound` if there is no such sequence
    /// * `LegoError::InvalidRange` for a bad range, or one beyond loaded sites
    pub fn make_subsequence(&mut self, id: SequenceId, start: u32, end: u32) -> Result<Subsequence, LegoError> {
        let subsequence = Subsequence::new(id, start, end)?;

        self.sequences
            .get_mut(id)
            .ok_or_else(|| LegoError::not_found(format!("There is no sequence with the ID {id}")))?
            .ensure_length(end)?;

        Ok(subsequence)
    }

    /// # Errors
    ///
    /// * `LegoError::InUse` once components exist
    /// * `LegoError::NotFound` if either sequence is missing
    /// * `LegoError::InvariantViolation` if both ends are on one sequence
    pub fn add_edge(&mut self, left: Subsequence, right: Subsequence) -> Result<(), LegoError> {
        self.assert_inputs_open("add edges")?;
        self.sequences.require(left.sequence)?;
        self.sequences.require(right.sequence)?;

        self.edges.add(Edge::new(left, right)?);
        Ok(())
    }

    /// # Errors
    ///
    /// * `LegoError::InUse` once components exist
    /// * `LegoError::NotFound` if the sequence is missing
    pub fn add_user_domain(&mut self, domain: Subsequence) -> Result<(), LegoError> {
        self.assert_inputs_open("add domains")?;
        self.sequences.require(domain.sequence)?;

        self.user_domains.add(domain);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if no sequence has this accession.
    pub fn find_sequence_by_accession(&self, accession: &str) -> Result<&Sequence, LegoError> {
        self.sequences.find_by_accession(accession)
    }

    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if no sequence has this legacy accession.
    pub fn find_sequence_by_legacy_accession(&self, name: &str) -> Result<&Sequence, LegoError> {
        self.sequences.find_by_legacy_accession(name)
    }

    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if no fusion point has this legacy accession.
    pub fn find_fusion_point_by_legacy_accession(&self, name: &str) -> Result<&Point, LegoError> {
        let (event, formation, point) = accession::parse_point(name)?;
        self.fusion_events
            .point(crate::core::types::PointId {
                event,
                formation,
                point,
            })
            .ok_or_else(|| LegoError::not_found(format!("There is no fusion point '{name}'")))
    }

    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if no formation has this legacy accession.
    pub fn find_fusion_formation_by_legacy_accession(&self, name: &str) -> Result<&Formation, LegoError> {
        let (event, formation) = accession::parse_formation(name)?;
        self.fusion_events
            .formation(crate::core::types::FormationId { event, formation })
            .ok_or_else(|| LegoError::not_found(format!("There is no fusion formation '{name}'")))
    }

    /// Resolve a leaf name from an external tool.
    ///
    /// Accepts sequence and point legacy accessions as well as plain accessions.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if nothing in the model has this name.
    pub fn find_node(&self, name: &str) -> Result<LegoNode, LegoError> {
        if accession::is_sequence(name) {
            return Ok(LegoNode::Sequence(self.find_sequence_by_legacy_accession(name)?.id));
        }

        if accession::is_point(name) {
            return Ok(LegoNode::Point(self.find_fusion_point_by_legacy_accession(name)?.id));
        }

        Ok(LegoNode::Sequence(self.find_sequence_by_accession(name)?.id))
    }

    /// Display name of a node: the accession for genes, the legacy accession for points
    pub fn node_name(&self, node: &LegoNode) -> String {
        match node {
            LegoNode::Sequence(id) => self
                .sequences
                .get(*id)
                .map_or_else(|| node.legacy_accession(), |s| s.accession.clone()),
            LegoNode::Point(_) => node.legacy_accession(),
        }
    }

    pub fn fusion_points(&self) -> impl Iterator<Item = &Point> {
        self.fusion_events.points().map(|(_, point)| point)
    }

    pub fn iter_pregraphs(&self) -> impl Iterator<Item = &Pregraph> {
        self.subsets
            .iter()
            .filter_map(|s| s.pregraphs.as_ref())
            .flatten()
    }

    /// Every named graph in the model
    pub fn iter_graphs(&self) -> Vec<(String, &LegoGraph)> {
        let mut graphs = Vec::new();

        for component in self.components.iter() {
            let name = component.name(&self.sequences);
            if let Some(tree) = &component.tree {
                graphs.push((format!("{name}_tree"), tree));
            }
            if let Some(tree) = &component.tree_unrooted {
                graphs.push((format!("{name}_unrooted"), tree));
            }
        }

        for pregraph in self.iter_pregraphs() {
            graphs.push((pregraph.name(self), &pregraph.graph));
        }

        for subgraph in &self.subgraphs {
            graphs.push((subgraph.name(self), &subgraph.graph));
        }

        for graph in [&self.fusion_graph_unclean, &self.fusion_graph_clean].into_iter().flatten() {
            graphs.push((graph.name().to_string(), &graph.graph));
        }

        graphs
    }

    /// Protein, DNA or RNA, judged from the loaded sites
    pub fn site_type(&self) -> SiteType {
        SiteType::detect(self.sequences.iter().filter_map(Sequence::site_array))
    }

    /// Register components found by a clustering step.
    ///
    /// Each group gives the major sequences and the minor subsequences of
    /// one component.
    ///
    /// # Errors
    ///
    /// * `LegoError::NotReady` if components exist or there are no edges
    /// * `LegoError::NotFound` if a group names a missing sequence
    /// * `LegoError::InvariantViolation` if a sequence is major in two groups
    pub fn create_components(
        &mut self,
        groups: Vec<(BTreeSet<SequenceId>, Vec<Subsequence>)>,
    ) -> Result<(), LegoError> {
        self.assert_create(Stage::Components)?;

        let mut seen = BTreeSet::new();
        for (majors, minors) in &groups {
            for &sequence in majors {
                self.sequences.require(sequence)?;
                if !seen.insert(sequence) {
                    return Err(LegoError::invariant(format!(
                        "Sequence {sequence} is major in more than one component"
                    )));
                }
            }
            for minor in minors {
                self.sequences.require(minor.sequence)?;
            }
        }

        for (majors, minors) in groups {
            let id = self.components.add(majors);
            if let Some(component) = self.components.get_mut(id) {
                component.minor_subsequences = minors;
            }
        }

        Ok(())
    }

    /// Store the alignment of one component.
    ///
    /// The FASTA must name sequences by legacy accession.
    ///
    /// # Errors
    ///
    /// * `LegoError::NotReady` if the component is already aligned or
    ///   components are not complete
    /// * `LegoError::NotFound` for a missing component or sequence
    /// * `LegoError::InvariantViolation` if the text is not FASTA
    pub fn set_alignment(&mut self, component: ComponentId, fasta: &str) -> Result<(), LegoError> {
        self.assert_create(Stage::Alignments)?;

        if self.components.require(component)?.alignment.is_some() {
            return Err(LegoError::NotReady(format!(
                "Component {component} is already aligned"
            )));
        }

        let records = read_fasta_text(fasta)
            .map_err(|e| LegoError::invariant(format!("Alignment is not FASTA: {e}")))?;
        for (name, _) in &records {
            self.sequences.find_by_legacy_accession(name)?;
        }

        if let Some(target) = self.components.get_mut(component) {
            target.alignment = Some(fasta.to_string());
        }
        Ok(())
    }

    /// Store the rooted tree of one component, with an unrooted copy.
    ///
    /// # Errors
    ///
    /// * `LegoError::NotReady` if the component already has a tree or
    ///   alignments are not complete
    /// * `LegoError::NotFound` for a missing component or a leaf naming a
    ///   missing sequence
    pub fn set_tree(
        &mut self,
        component: ComponentId,
        tree: LegoGraph,
        newick: Option<String>,
    ) -> Result<(), LegoError> {
        self.assert_create(Stage::Trees)?;

        if self.components.require(component)?.tree.is_some() {
            return Err(LegoError::NotReady(format!(
                "Component {component} already has a tree"
            )));
        }

        for leaf in tree.leaves() {
            if let LegoNode::Sequence(id) = leaf {
                self.sequences.require(id)?;
            }
        }

        if let Some(target) = self.components.get_mut(component) {
            target.tree_unrooted = Some(tree.to_unrooted());
            target.tree = Some(tree);
            target.tree_newick = newick;
        }
        Ok(())
    }

    /// Counts and stage statuses for reporting
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            sequences: self.sequences.len(),
            sequences_with_sites: self.sequences.num_fasta(),
            site_type: self.site_type(),
            edges: self.edges.len(),
            user_domains: self.user_domains.len(),
            components: self.components.len(),
            aligned: self.components.num_aligned(),
            trees: self.components.num_trees(),
            fusion_events: self.fusion_events.len(),
            fusion_points: self.fusion_events.num_points(),
            splits: self.splits.len(),
            consensus: self.consensus.as_ref().map_or(0, BTreeSet::len),
            subsets: self.subsets.len(),
            subgraphs: self.subgraphs.len(),
            stages: Stage::ALL
                .iter()
                .map(|&stage| StageReport {
                    stage,
                    status: self.get_status(stage).describe(),
                    headline: stage.headline(self),
                })
                .collect(),
        }
    }

    /// Restore lookup indexes skipped during serialization
    pub fn rebuild_indexes(&mut self) {
        self.sequences.rebuild_indexes();
        self.edges.rebuild_indexes();
        self.user_domains.rebuild_indexes();
        self.splits.rebuild_indexes();
    }

    fn assert_inputs_open(&self, action: &str) -> Result<(), LegoError> {
        if self.components.is_empty() {
            Ok(())
        } else {
            Err(LegoError::InUse(format!(
                "Cannot {action} once components exist; drop the components first"
            )))
        }
    }
}

/// Per-stage line of a [`ModelSummary`]
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: &'static str,
    pub headline: String,
}

/// Snapshot of a model's contents
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub sequences: usize,
    pub sequences_with_sites: usize,
    pub site_type: SiteType,
    pub edges: usize,
    pub user_domains: usize,
    pub components: usize,
    pub aligned: usize,
    pub trees: usize,
    pub fusion_events: usize,
    pub fusion_points: usize,
    pub splits: usize,
    pub consensus: usize,
    pub subsets: usize,
    pub subgraphs: usize,
    pub stages: Vec<StageReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_kept_in_accession_order() {
        let mut model = Model::new();
        for accession in ["C", "A", "B"] {
            model.add_sequence(accession).unwrap();
        }
        let order: Vec<_> = model.sequences.iter().map(|s| s.accession.as_str()).collect();
        assert_eq!(order, ["A", "B", "C"]);
        assert_eq!(model.find_sequence_by_accession("B").unwrap().id, SequenceId(3));
    }

    #[test]
    fn test_duplicate_accession_leaves_model_unchanged() {
        let mut model = Model::new();
        model.add_sequence("A").unwrap();
        assert!(matches!(model.add_sequence("A"), Err(LegoError::DuplicateKey(_))));
        assert_eq!(model.sequences.len(), 1);
        // The failed call did not consume an ID
        assert_eq!(model.add_sequence("B").unwrap(), SequenceId(2));
    }

    #[test]
    fn test_reserved_accession_rejected() {
        let mut model = Model::new();
        assert!(matches!(model.add_sequence("GrtS5"), Err(LegoError::DuplicateKey(_))));
        let id = model.add_sequence("G5").unwrap();
        let legacy = model.sequences.get(id).unwrap().legacy_accession();
        assert_eq!(legacy, format!("GrtS{}", id.0));
        assert_eq!(model.find_sequence_by_legacy_accession(&legacy).unwrap().accession, "G5");
    }

    #[test]
    fn test_make_subsequence_grows_length() {
        let mut model = Model::new();
        let id = model.add_sequence("A").unwrap();
        model.make_subsequence(id, 10, 40).unwrap();
        model.make_subsequence(id, 1, 20).unwrap();
        assert_eq!(model.sequences.get(id).unwrap().length, 40);

        assert!(matches!(
            model.set_site_array(id, "ACGT"),
            Err(LegoError::InvalidRange(_))
        ));
        model.set_site_array(id, &"A".repeat(40)).unwrap();
        assert!(matches!(
            model.make_subsequence(id, 1, 41),
            Err(LegoError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_edges_indexed_by_sequence() {
        let mut model = Model::new();
        let a = model.add_sequence("A").unwrap();
        let b = model.add_sequence("B").unwrap();
        let c = model.add_sequence("C").unwrap();
        let left = model.make_subsequence(a, 1, 10).unwrap();
        let right = model.make_subsequence(b, 1, 10).unwrap();
        model.add_edge(left.clone(), right).unwrap();
        let right = model.make_subsequence(c, 1, 10).unwrap();
        model.add_edge(left, right).unwrap();

        assert_eq!(model.edges.find_sequence(a).count(), 2);
        assert_eq!(model.edges.find_sequence(b).count(), 1);

        model.edges.rebuild_indexes();
        assert_eq!(model.edges.find_sequence(c).count(), 1);
    }

    #[test]
    fn test_user_domains_default_to_whole_sequence() {
        let mut model = Model::new();
        let a = model.add_sequence("A").unwrap();
        let b = model.add_sequence("B").unwrap();
        model.make_subsequence(a, 1, 30).unwrap();
        let domain = model.make_subsequence(b, 5, 9).unwrap();
        model.add_user_domain(domain.clone()).unwrap();

        let seq_a = model.sequences.get(a).unwrap();
        assert_eq!(
            model.user_domains.by_sequence(seq_a),
            vec![Subsequence::new(a, 1, 30).unwrap()]
        );
        let seq_b = model.sequences.get(b).unwrap();
        assert_eq!(model.user_domains.by_sequence(seq_b), vec![domain]);
    }

    #[test]
    fn test_inputs_closed_once_components_exist() {
        let mut model = Model::new();
        let a = model.add_sequence("A").unwrap();
        let b = model.add_sequence("B").unwrap();
        let left = model.make_subsequence(a, 1, 10).unwrap();
        let right = model.make_subsequence(b, 1, 10).unwrap();
        model.add_edge(left.clone(), right.clone()).unwrap();
        model
            .create_components(vec![(BTreeSet::from([a, b]), vec![left, right])])
            .unwrap();

        assert!(matches!(model.add_sequence("C"), Err(LegoError::InUse(_))));
        let domain = Subsequence::new(a, 1, 5).unwrap();
        assert!(matches!(model.add_user_domain(domain), Err(LegoError::InUse(_))));
    }

    #[test]
    fn test_create_components_rejects_shared_major() {
        let mut model = Model::new();
        let a = model.add_sequence("A").unwrap();
        let b = model.add_sequence("B").unwrap();
        let left = model.make_subsequence(a, 1, 10).unwrap();
        let right = model.make_subsequence(b, 1, 10).unwrap();
        model.add_edge(left, right).unwrap();

        let result = model.create_components(vec![
            (BTreeSet::from([a]), Vec::new()),
            (BTreeSet::from([a, b]), Vec::new()),
        ]);
        assert!(matches!(result, Err(LegoError::InvariantViolation(_))));
        assert!(model.components.is_empty());
    }

    #[test]
    fn test_find_node() {
        let mut model = Model::new();
        let a = model.add_sequence("A").unwrap();
        assert_eq!(model.find_node("A").unwrap(), LegoNode::Sequence(a));
        assert_eq!(model.find_node(&format!("GrtS{}", a.0)).unwrap(), LegoNode::Sequence(a));
        assert!(matches!(model.find_node("GrtP0P0P0"), Err(LegoError::NotFound(_))));
        assert!(matches!(model.find_node("Z"), Err(LegoError::NotFound(_))));
    }

    #[test]
    fn test_site_type() {
        let mut model = Model::new();
        assert_eq!(model.site_type(), SiteType::Unknown);
        let a = model.add_sequence("A").unwrap();
        model.set_site_array(a, "GATTACA").unwrap();
        assert_eq!(model.site_type(), SiteType::Dna);
    }
}
