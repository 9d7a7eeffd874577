//! Core data types of the Lego model.
//!
//! - [`Sequence`](sequence::Sequence) and [`Subsequence`](subsequence::Subsequence):
//!   genes and 1-based inclusive ranges over them
//! - [`Edge`](edge::Edge): a similarity between two subsequences
//! - [`LegoSplit`](split::LegoSplit): a bipartition of leaves with its evidence
//! - [`FusionEvent`](fusion::FusionEvent): components A and B forming C, with
//!   formations and points
//! - [`LegoGraph`](graph::LegoGraph): trees and fusion graphs
//!
//! ## Legacy accessions
//!
//! External tools only ever see internal names, so user accessions never
//! reach Newick or FASTA files produced for them:
//!
//! | Entity    | Format                          |
//! |-----------|---------------------------------|
//! | Sequence  | `GrtS{id}`                      |
//! | Formation | `GrtF{event}F{formation}`       |
//! | Point     | `GrtP{event}P{formation}P{point}` |

pub mod accession;
pub mod edge;
pub mod error;
pub mod fusion;
pub mod graph;
pub mod nrfg;
pub mod sequence;
pub mod split;
pub mod subsequence;
pub mod types;
