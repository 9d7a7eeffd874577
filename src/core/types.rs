use serde::{Deserialize, Serialize};

use crate::core::accession;

/// Internal sequence identifier, allocated from the model's counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceId(pub u32);

impl std::fmt::Display for SequenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a component within the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub usize);

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a split within the model's split arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SplitId(pub usize);

/// Address of a formation: (event index, formation index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FormationId {
    pub event: usize,
    pub formation: usize,
}

impl std::fmt::Display for FormationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "F{}.{}", self.event, self.formation)
    }
}

/// Address of a fusion point: (event index, formation index, point index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointId {
    pub event: usize,
    pub formation: usize,
    pub point: usize,
}

impl PointId {
    pub fn formation_id(&self) -> FormationId {
        FormationId {
            event: self.event,
            formation: self.formation,
        }
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "F{}.{}.{}", self.event, self.formation, self.point)
    }
}

/// Anything that can sit on a leaf of a graph: a gene or a fusion point
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegoNode {
    Sequence(SequenceId),
    Point(PointId),
}

impl LegoNode {
    /// Legacy accession of the node, used to name leaves in external formats
    pub fn legacy_accession(&self) -> String {
        match self {
            Self::Sequence(id) => accession::format_sequence(id.0),
            Self::Point(id) => accession::format_point(id.event, id.formation, id.point),
        }
    }

    pub fn as_sequence(&self) -> Option<SequenceId> {
        match self {
            Self::Sequence(id) => Some(*id),
            Self::Point(_) => None,
        }
    }
}

impl From<SequenceId> for LegoNode {
    fn from(id: SequenceId) -> Self {
        Self::Sequence(id)
    }
}

impl From<PointId> for LegoNode {
    fn from(id: PointId) -> Self {
        Self::Point(id)
    }
}

/// Placement of a sequence within the trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// No specific position
    #[default]
    None,
    /// Node is a root. Many tools only allow named taxa on leaves so this isn't recommended.
    Root,
    /// Node is an outgroup
    Outgroup,
}

/// Type of residues held by the model's site arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteType {
    /// Not yet determined
    #[default]
    Unknown,
    Protein,
    Dna,
    Rna,
}

impl SiteType {
    /// Infer the site type from a set of site arrays.
    ///
    /// `G`, `A` and `C` are uninformative. A `T` suggests DNA and a `U` RNA,
    /// unless something else was seen first; any other symbol means protein.
    pub fn detect<'a>(site_arrays: impl IntoIterator<Item = &'a str>) -> Self {
        let mut site_type = Self::Unknown;

        for sites in site_arrays {
            for symbol in sites.chars() {
                match symbol {
                    'G' | 'A' | 'C' => {}
                    'T' => {
                        if site_type == Self::Unknown {
                            site_type = Self::Dna;
                        }
                    }
                    'U' => {
                        if site_type == Self::Unknown {
                            site_type = Self::Rna;
                        }
                    }
                    _ => site_type = Self::Protein,
                }
            }
        }

        site_type
    }
}

impl std::fmt::Display for SiteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Protein => write!(f, "protein"),
            Self::Dna => write!(f, "DNA"),
            Self::Rna => write!(f, "RNA"),
        }
    }
}
