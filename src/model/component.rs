use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::error::LegoError;
use crate::core::graph::LegoGraph;
use crate::core::sequence::MISSING_SITES;
use crate::core::subsequence::Subsequence;
use crate::core::types::{ComponentId, LegoNode, SequenceId, SplitId};
use crate::model::store::SequenceCollection;
use crate::parsing::fasta::read_fasta_text;

/// A gene family: sequences that are similar to one another across their length
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub index: ComponentId,

    /// Sequences belonging wholly to this component
    pub major_sequences: BTreeSet<SequenceId>,

    /// Every domain in this component, possibly from other components' sequences
    pub minor_subsequences: Vec<Subsequence>,

    /// Aligned FASTA with sequences named by legacy accession
    pub alignment: Option<String>,

    pub tree: Option<LegoGraph>,
    pub tree_unrooted: Option<LegoGraph>,
    pub tree_newick: Option<String>,

    /// Splits of `tree`, set by the split stage
    pub splits: Option<BTreeSet<SplitId>>,

    /// Leaves used in `splits`
    pub leaves: Option<BTreeSet<LegoNode>>,
}

impl Component {
    pub fn new(index: ComponentId, major_sequences: BTreeSet<SequenceId>) -> Self {
        Self {
            index,
            major_sequences,
            minor_subsequences: Vec::new(),
            alignment: None,
            tree: None,
            tree_unrooted: None,
            tree_newick: None,
            splits: None,
            leaves: None,
        }
    }

    /// Sequences with at least one subsequence in the minor set
    pub fn minor_sequences(&self) -> BTreeSet<SequenceId> {
        self.minor_subsequences.iter().map(|s| s.sequence).collect()
    }

    /// Accession of the first major sequence, by accession order
    pub fn get_accid(&self, sequences: &SequenceCollection) -> String {
        self.major_sequences
            .iter()
            .filter_map(|&id| sequences.get(id))
            .map(|s| s.accession.as_str())
            .min()
            .map_or_else(|| self.index.to_string(), str::to_string)
    }

    /// `comp_<accid>`
    pub fn name(&self, sequences: &SequenceCollection) -> String {
        format!("comp_{}", self.get_accid(sequences))
    }

    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if `sequence` has no minor subsequence here.
    pub fn get_minor_subsequence_by_sequence(
        &self,
        sequence: SequenceId,
    ) -> Result<&Subsequence, LegoError> {
        self.minor_subsequences
            .iter()
            .find(|s| s.sequence == sequence)
            .ok_or_else(|| {
                LegoError::not_found(format!(
                    "Sequence {sequence} is not in component {}",
                    self.index
                ))
            })
    }

    /// Minor subsequences as FASTA, headed `>accession[start:end]`
    pub fn to_fasta(&self, sequences: &SequenceCollection) -> String {
        let mut fasta = String::new();

        for subsequence in &self.minor_subsequences {
            let sequence = sequences.get(subsequence.sequence);
            let accession =
                sequence.map_or_else(|| subsequence.sequence.to_string(), |s| s.accession.clone());
            fasta.push_str(&format!(
                ">{}[{}:{}]\n{}\n",
                accession,
                subsequence.start(),
                subsequence.end(),
                sites_of(subsequence, sequences)
            ));
        }

        fasta
    }

    /// Minor subsequences as FASTA, headed by legacy accession for external tools
    pub fn to_legacy_fasta(&self, sequences: &SequenceCollection) -> String {
        let mut fasta = String::new();

        for subsequence in &self.minor_subsequences {
            fasta.push_str(&format!(
                ">{}\n{}\n",
                crate::core::accession::format_sequence(subsequence.sequence.0),
                sites_of(subsequence, sequences)
            ));
        }

        fasta
    }

    /// The alignment with legacy accessions translated back to accessions.
    ///
    /// Returns `Ok(None)` before alignment.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if the alignment names a sequence that is
    /// not in the model, or `LegoError::InvariantViolation` if the stored
    /// alignment is not valid FASTA.
    pub fn get_alignment_fasta(
        &self,
        sequences: &SequenceCollection,
    ) -> Result<Option<String>, LegoError> {
        let Some(alignment) = &self.alignment else {
            return Ok(None);
        };

        let records = read_fasta_text(alignment).map_err(|e| {
            LegoError::invariant(format!("Alignment of component {} is not FASTA: {e}", self.index))
        })?;

        let mut fasta = String::new();
        for (name, sites) in records {
            let sequence = sequences.find_by_legacy_accession(&name)?;
            fasta.push_str(&format!(">{}\n{}\n", sequence.accession, sites));
        }

        Ok(Some(fasta))
    }
}

fn sites_of<'a>(subsequence: &Subsequence, sequences: &'a SequenceCollection) -> &'a str {
    sequences
        .get(subsequence.sequence)
        .and_then(|s| subsequence.site_array(s).ok().flatten())
        .unwrap_or(MISSING_SITES)
}

/// The model's components
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentCollection {
    components: Vec<Component>,
}

impl ComponentCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component, assigning it the next index
    pub fn add(&mut self, major_sequences: BTreeSet<SequenceId>) -> ComponentId {
        let id = ComponentId(self.components.len());
        self.components.push(Component::new(id, major_sequences));
        id
    }

    pub fn clear(&mut self) {
        self.components.clear();
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.components.iter_mut()
    }

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(id.0)
    }

    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if there is no such component.
    pub fn require(&self, id: ComponentId) -> Result<&Component, LegoError> {
        self.get(id)
            .ok_or_else(|| LegoError::not_found(format!("There is no component {id}")))
    }

    pub fn num_aligned(&self) -> usize {
        self.components.iter().filter(|c| c.alignment.is_some()).count()
    }

    pub fn num_trees(&self) -> usize {
        self.components.iter().filter(|c| c.tree.is_some()).count()
    }

    /// Components with a minor subsequence overlapping `subsequence`
    pub fn find_components_for_minor_subsequence(&self, subsequence: &Subsequence) -> Vec<ComponentId> {
        self.components
            .iter()
            .filter(|c| c.minor_subsequences.iter().any(|m| m.has_overlap(subsequence)))
            .map(|c| c.index)
            .collect()
    }

    /// Components with a minor subsequence anywhere on `sequence`
    pub fn find_components_for_minor_sequence(&self, sequence: SequenceId) -> Vec<ComponentId> {
        self.components
            .iter()
            .filter(|c| c.minor_subsequences.iter().any(|m| m.sequence == sequence))
            .map(|c| c.index)
            .collect()
    }

    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if `sequence` is not major in any component.
    pub fn find_component_for_major_sequence(&self, sequence: SequenceId) -> Result<&Component, LegoError> {
        self.components
            .iter()
            .find(|c| c.major_sequences.contains(&sequence))
            .ok_or_else(|| {
                LegoError::not_found(format!("Sequence {sequence} does not have a component"))
            })
    }

    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if no component has this name.
    pub fn find_component_by_name(
        &self,
        name: &str,
        sequences: &SequenceCollection,
    ) -> Result<&Component, LegoError> {
        self.components
            .iter()
            .find(|c| c.name(sequences) == name)
            .ok_or_else(|| LegoError::not_found(format!("Cannot find the component named '{name}'")))
    }

    pub fn has_sequence(&self, sequence: SequenceId) -> bool {
        self.find_component_for_major_sequence(sequence).is_ok()
    }

    /// Other components whose minor sequences include any major of `id`.
    ///
    /// These are the components that `id`'s genes flow into.
    pub fn incoming_components(&self, id: ComponentId) -> Vec<ComponentId> {
        let Some(component) = self.get(id) else {
            return Vec::new();
        };

        self.components
            .iter()
            .filter(|other| other.index != id)
            .filter(|other| {
                let minor = other.minor_sequences();
                component.major_sequences.iter().any(|s| minor.contains(s))
            })
            .map(|other| other.index)
            .collect()
    }

    /// Other components whose majors include any minor sequence of `id`
    pub fn outgoing_components(&self, id: ComponentId) -> Vec<ComponentId> {
        let Some(component) = self.get(id) else {
            return Vec::new();
        };
        let minor = component.minor_sequences();

        self.components
            .iter()
            .filter(|other| other.index != id)
            .filter(|other| other.major_sequences.iter().any(|s| minor.contains(s)))
            .map(|other| other.index)
            .collect()
    }

    /// Multi-line summary of a component and its neighbours
    ///
    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if there is no such component.
    pub fn to_details(&self, id: ComponentId, sequences: &SequenceCollection) -> Result<String, LegoError> {
        let component = self.require(id)?;

        let accessions = |ids: &BTreeSet<SequenceId>| {
            let mut names: Vec<_> = ids
                .iter()
                .map(|&s| sequences.get(s).map_or_else(|| s.to_string(), |x| x.accession.clone()))
                .collect();
            names.sort();
            names.join(", ")
        };

        let component_names = |ids: Vec<ComponentId>| {
            let mut names: Vec<_> = ids
                .into_iter()
                .filter_map(|c| self.get(c))
                .map(|c| c.name(sequences))
                .collect();
            names.sort();
            names.join(", ")
        };

        let minor_subsequences = component
            .minor_subsequences
            .iter()
            .map(|s| {
                let accession = sequences
                    .get(s.sequence)
                    .map_or_else(|| s.sequence.to_string(), |x| x.accession.clone());
                s.describe(&accession)
            })
            .collect::<Vec<_>>()
            .join(", ");

        Ok([
            format!("MAJOR-SE: {}", accessions(&component.major_sequences)),
            format!("MINOR-SE: {}", accessions(&component.minor_sequences())),
            format!("MINOR-SS: {minor_subsequences}"),
            format!("INCOMING: {}", component_names(self.incoming_components(id))),
            format!("OUTGOING: {}", component_names(self.outgoing_components(id))),
        ]
        .join("\n"))
    }
}
