use serde::{Deserialize, Serialize};

use crate::core::accession;
use crate::core::error::LegoError;
use crate::core::subsequence::Subsequence;
use crate::core::types::{Position, SequenceId};

/// Marker written in place of sites when none are loaded
pub const MISSING_SITES: &str = ";MISSING";

/// A protein (or DNA) sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    /// Internal ID, unique within the model
    pub id: SequenceId,

    /// Database accession. Can never look like a legacy accession.
    pub accession: String,

    /// Length in sites. Grows to accommodate any subsequence referencing it.
    pub length: u32,

    /// Site data, if loaded. Its length always matches `length`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    site_array: Option<String>,

    /// Placement hint for tree building
    #[serde(default)]
    pub position: Position,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl Sequence {
    /// Create a sequence of length 1 with no sites.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::DuplicateKey` if the accession is reserved for
    /// legacy accessions.
    pub fn new(id: SequenceId, accession: impl Into<String>) -> Result<Self, LegoError> {
        let accession = accession.into();

        if accession::is_sequence(&accession) {
            return Err(LegoError::DuplicateKey(format!(
                "The accession '{accession}' is reserved for compatibility with legacy Phylip format files. \
                 Avoid accessions that only contain numbers prefixed by '{}S'.",
                accession::LEGACY_PREFIX
            )));
        }

        Ok(Self {
            id,
            accession,
            length: 1,
            site_array: None,
            position: Position::None,
            comments: Vec::new(),
        })
    }

    pub fn site_array(&self) -> Option<&str> {
        self.site_array.as_deref()
    }

    /// Replace the sites. The length follows the new site array.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::InvalidRange` for an empty site array, or one
    /// holding anything other than ASCII symbols.
    pub fn set_site_array(&mut self, sites: impl Into<String>) -> Result<(), LegoError> {
        let sites = sites.into();
        if !sites.is_ascii() {
            return Err(LegoError::InvalidRange(format!(
                "Site array of '{}' contains non-ASCII symbols",
                self.accession
            )));
        }

        let length = u32::try_from(sites.len()).map_err(|_| {
            LegoError::InvalidRange(format!("Site array of '{}' is too long", self.accession))
        })?;

        if length == 0 {
            return Err(LegoError::InvalidRange(format!(
                "Site array of '{}' is empty",
                self.accession
            )));
        }

        self.length = length;
        self.site_array = Some(sites);
        Ok(())
    }

    /// Grow the length to accommodate `new_length`. Never shrinks.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::InvalidRange` if sites are loaded and would no
    /// longer match the length.
    pub fn ensure_length(&mut self, new_length: u32) -> Result<(), LegoError> {
        if new_length <= self.length {
            return Ok(());
        }

        if self.site_array.is_some() {
            return Err(LegoError::InvalidRange(format!(
                "Position {new_length} is beyond the {} loaded sites of '{}'",
                self.length, self.accession
            )));
        }

        self.length = new_length;
        Ok(())
    }

    pub fn is_positioned(&self) -> bool {
        self.position != Position::None
    }

    /// Accession used when talking to legacy tools
    pub fn legacy_accession(&self) -> String {
        accession::format_sequence(self.id.0)
    }

    /// Subsequence spanning the whole sequence
    pub fn totality(&self) -> Subsequence {
        // `length` is always at least 1
        Subsequence::new(self.id, 1, self.length.max(1))
            .unwrap_or_else(|_| unreachable!("sequence length is at least 1"))
    }

    /// Sites from `start` to `end`, 1-based and inclusive.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::InvalidRange` if the range falls outside the sites.
    pub fn sub_sites(&self, start: u32, end: u32) -> Result<Option<&str>, LegoError> {
        let Some(sites) = self.site_array.as_deref() else {
            return Ok(None);
        };

        if start == 0 || start > end || end as usize > sites.len() {
            return Err(LegoError::InvalidRange(format!(
                "Cannot extract site range {start}-{end} from site array of length {}",
                sites.len()
            )));
        }

        Ok(sites.get(start as usize - 1..end as usize))
    }

    pub fn to_fasta(&self) -> String {
        format!(
            ">{}\n{}\n",
            self.accession,
            self.site_array.as_deref().unwrap_or(MISSING_SITES)
        )
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.accession)
    }
}
