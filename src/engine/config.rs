use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::error::LegoError;
use crate::core::nrfg::CONSENSUS_ALGORITHM;
use crate::core::split::{EvidenceRule, LegoSplit};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] LegoError),
}

/// Default fraction of a sequence an edge must cover to join two genes
/// into one component
pub const DEFAULT_MAJOR_COVERAGE: f64 = 0.8;

/// Which evidenced splits enter the consensus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusPolicy {
    /// Minimum number of components supporting the split
    pub min_support: usize,
    /// Maximum number of components contradicting the split
    pub max_against: usize,
}

impl Default for ConsensusPolicy {
    fn default() -> Self {
        Self {
            min_support: 1,
            max_against: 0,
        }
    }
}

impl ConsensusPolicy {
    /// Policy with `min_support` raised to at least 1, so a split nothing
    /// supports is never accepted
    pub fn normalized(&self) -> Self {
        Self {
            min_support: self.min_support.max(1),
            max_against: self.max_against,
        }
    }

    /// Does `split` pass? Splits without evidence never pass.
    pub fn accepts(&self, split: &LegoSplit) -> bool {
        match (&split.evidence_for, &split.evidence_against) {
            (Some(support), Some(against)) => {
                support.len() >= self.min_support && against.len() <= self.max_against
            }
            _ => false,
        }
    }
}

/// Settings for the derivation engines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fraction (0, 1] of both sequences an edge must cover for them to
    /// share a component
    pub major_coverage: f64,

    pub evidence_rule: EvidenceRule,
    pub consensus: ConsensusPolicy,

    /// Algorithm used to build subgraphs
    pub subgraph_algorithm: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            major_coverage: DEFAULT_MAJOR_COVERAGE,
            evidence_rule: EvidenceRule::default(),
            consensus: ConsensusPolicy::default(),
            subgraph_algorithm: CONSENSUS_ALGORITHM.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, `ConfigError::Json`
    /// if it is not valid JSON, or `ConfigError::Invalid` if a value is out of range.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// # Errors
    ///
    /// As [`PipelineConfig::load_from_file`], without I/O errors.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.consensus = config.consensus.normalized();
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `LegoError::InvalidRange` for a coverage outside (0, 1], or
    /// `LegoError::UnsupportedVariant` for an unknown subgraph algorithm.
    pub fn validate(&self) -> Result<(), LegoError> {
        if !(self.major_coverage > 0.0 && self.major_coverage <= 1.0) {
            return Err(LegoError::InvalidRange(format!(
                "major_coverage must be in (0, 1], found {}",
                self.major_coverage
            )));
        }

        if self.subgraph_algorithm != CONSENSUS_ALGORITHM {
            return Err(LegoError::UnsupportedVariant {
                what: "subgraph algorithm",
                value: self.subgraph_algorithm.clone(),
            });
        }

        Ok(())
    }
}
