use serde::{Deserialize, Serialize};

use crate::core::error::LegoError;
use crate::core::sequence::MISSING_SITES;
use crate::core::subsequence::Subsequence;
use crate::core::types::{LegoNode, SequenceId};
use crate::model::component::Component;
use crate::model::store::SequenceCollection;

/// Something that can be located on one side of an edge
#[derive(Debug, Clone, Copy)]
pub enum EdgeQuery<'a> {
    Sequence(SequenceId),
    Subsequence(&'a Subsequence),
    /// Only the component's major sequences are considered
    Component(&'a Component),
    /// Side given directly: `false` is left, `true` is right
    Side(bool),
    Node(LegoNode),
}

impl std::fmt::Display for EdgeQuery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequence(id) => write!(f, "sequence {id}"),
            Self::Subsequence(s) => write!(f, "subsequence {s}"),
            Self::Component(c) => write!(f, "component {}", c.index),
            Self::Side(side) => write!(f, "side {side}"),
            Self::Node(node) => write!(f, "node {}", node.legacy_accession()),
        }
    }
}

/// Similarity between two subsequences on different sequences.
///
/// Edges are undirected; `left` and `right` only name the two ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub left: Subsequence,
    pub right: Subsequence,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl Edge {
    /// # Errors
    ///
    /// Returns `LegoError::InvariantViolation` if both ends are on the same sequence.
    pub fn new(left: Subsequence, right: Subsequence) -> Result<Self, LegoError> {
        if left.sequence == right.sequence {
            return Err(LegoError::invariant(format!(
                "An edge cannot join sequence {} to itself ({left}--{right})",
                left.sequence
            )));
        }

        Ok(Self {
            left,
            right,
            comments: Vec::new(),
        })
    }

    /// Does either end lie on `sequence`?
    pub fn contains(&self, sequence: SequenceId) -> bool {
        self.left.sequence == sequence || self.right.sequence == sequence
    }

    /// Which side `query` is on: `false` for left, `true` for right.
    ///
    /// # Errors
    ///
    /// * `LegoError::NotFound` if `query` is on neither side
    /// * `LegoError::InvariantViolation` if a component owns both sides
    /// * `LegoError::UnsupportedVariant` for fusion point nodes
    pub fn position(&self, query: EdgeQuery<'_>) -> Result<bool, LegoError> {
        match query {
            EdgeQuery::Side(side) => Ok(side),
            EdgeQuery::Sequence(id) => self.position_of_sequence(id, &query),
            EdgeQuery::Subsequence(subsequence) => {
                self.position_of_sequence(subsequence.sequence, &query)
            }
            EdgeQuery::Node(LegoNode::Sequence(id)) => self.position_of_sequence(id, &query),
            EdgeQuery::Node(LegoNode::Point(point)) => Err(LegoError::UnsupportedVariant {
                what: "Edge::position",
                value: format!("fusion point {point}"),
            }),
            EdgeQuery::Component(component) => {
                let left = component.major_sequences.contains(&self.left.sequence);
                let right = component.major_sequences.contains(&self.right.sequence);

                match (left, right) {
                    (true, true) => Err(LegoError::invariant(format!(
                        "Both sides of the edge {self} are in {query}"
                    ))),
                    (true, false) => Ok(false),
                    (false, true) => Ok(true),
                    (false, false) => Err(LegoError::not_found(format!(
                        "Cannot find {query} within the edge {self}"
                    ))),
                }
            }
        }
    }

    /// Both sides, the side of `query` first
    ///
    /// # Errors
    ///
    /// As [`Edge::position`].
    pub fn sides(&self, query: EdgeQuery<'_>) -> Result<(&Subsequence, &Subsequence), LegoError> {
        Ok(if self.position(query)? {
            (&self.right, &self.left)
        } else {
            (&self.left, &self.right)
        })
    }

    /// The side of `query`, or the other side when `opposite` is set
    ///
    /// # Errors
    ///
    /// As [`Edge::position`].
    pub fn side(&self, query: EdgeQuery<'_>, opposite: bool) -> Result<&Subsequence, LegoError> {
        let position = self.position(query)? != opposite;
        Ok(if position { &self.right } else { &self.left })
    }

    /// # Errors
    ///
    /// As [`Edge::position`].
    pub fn opposite(&self, query: EdgeQuery<'_>) -> Result<&Subsequence, LegoError> {
        self.side(query, true)
    }

    /// Both ends as FASTA, headed `>accession[start:end]`
    pub fn to_fasta(&self, sequences: &SequenceCollection) -> String {
        let mut fasta = String::new();

        for end in [&self.left, &self.right] {
            let sequence = sequences.get(end.sequence);
            let accession = sequence.map_or_else(|| end.sequence.to_string(), |s| s.accession.clone());
            let sites = sequence
                .and_then(|s| end.site_array(s).ok().flatten())
                .unwrap_or(MISSING_SITES);

            fasta.push_str(&format!(
                ">{}[{}:{}]\n{}\n",
                accession,
                end.start(),
                end.end(),
                sites
            ));
        }

        fasta
    }

    fn position_of_sequence(&self, id: SequenceId, query: &EdgeQuery<'_>) -> Result<bool, LegoError> {
        if self.left.sequence == id {
            Ok(false)
        } else if self.right.sequence == id {
            Ok(true)
        } else {
            Err(LegoError::not_found(format!(
                "Cannot find {query} within the edge {self}"
            )))
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}--{}", self.left, self.right)
    }
}
