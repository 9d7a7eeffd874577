//! Readers for the files that feed a model.
//!
//! - **FASTA** (`.fa`, `.fasta`, `.faa`, `.fna`, optionally gzipped): sequences
//!   with their sites, and aligned FASTA written by an external aligner
//! - **Edge tables**: BLAST tabular output (`-outfmt 6`) or a plain
//!   six-column table of pairwise similarities
//! - **Newick**: component trees built by an external tree builder
//!
//! ## Edge table columns
//!
//! | Format | Columns used |
//! |--------|--------------|
//! | BLAST `-outfmt 6` | `qseqid` (1), `sseqid` (2), `qstart` (7), `qend` (8), `sstart` (9), `send` (10) |
//! | Six-column | `accession_a start_a end_a accession_b start_b end_b` |

use thiserror::Error;

use crate::core::error::LegoError;

pub mod edges;
pub mod fasta;
pub mod newick;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Too many sequences: {0} exceeds maximum allowed")]
    TooManySequences(usize),

    #[error("Too many edges: {0} exceeds maximum allowed")]
    TooManyEdges(usize),

    #[error(transparent)]
    Model(#[from] LegoError),
}
