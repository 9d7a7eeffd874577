use thiserror::Error;

/// Errors raised by the model and its engines.
///
/// None of these are transient: the caller decides whether to recover
/// (for instance by dropping a dependent stage) or abort.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LegoError {
    /// Lookup failed, or two ranges have no intersection
    #[error("Not found: {0}")]
    NotFound(String),

    /// A subsequence range is out of bounds
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// An accession is already in use or reserved
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// A structural invariant of the model would be broken
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// The stage cannot be created or dropped yet
    #[error("Not ready: {0}")]
    NotReady(String),

    /// Data is still required by a later stage
    #[error("In use: {0}")]
    InUse(String),

    /// A query was given a value of a variant it cannot handle
    #[error("Unsupported value for {what}: {value}")]
    UnsupportedVariant { what: &'static str, value: String },
}

impl LegoError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
