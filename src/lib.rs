//! # lego-fusion
//!
//! Detect gene-fusion events across families of similar genes and reconcile
//! their trees into a single N-rooted fusion graph (NRFG).
//!
//! A [`Model`] holds everything: sequences and the similarity edges between
//! them, the components (gene families) found from those edges, the trees
//! built for each component by external tools, and everything derived from
//! them. Work proceeds in stages, and the model refuses to build a stage
//! before its predecessor is complete:
//!
//! ```text
//! sequences → edges → components → alignments → trees → fusions → splits
//!           → consensus → subsets → pregraphs → subgraphs → fused → cleaned
//! ```
//!
//! A component `C` whose minor domains come from the majors of two other
//! components `A` and `B` is the product of a fusion event `A + B = C`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lego_fusion::engine::components::detect_components;
//! use lego_fusion::engine::config::DEFAULT_MAJOR_COVERAGE;
//! use lego_fusion::parsing::{edges, fasta};
//! use lego_fusion::Model;
//!
//! let mut model = Model::new();
//! let records = fasta::read_fasta_file("genes.fa".as_ref()).unwrap();
//! fasta::import_fasta(&mut model, &records).unwrap();
//! let pairs = edges::parse_edges_file("blast.tsv".as_ref()).unwrap();
//! edges::import_edges(&mut model, &pairs).unwrap();
//!
//! detect_components(&mut model, DEFAULT_MAJOR_COVERAGE).unwrap();
//! for component in model.components.iter() {
//!     println!("{}", component.name(&model.sequences));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: sequences, subsequences, edges, splits, fusion events and graphs
//! - [`model`]: the model store, components, stage tracking and model files
//! - [`engine`]: the derivation stages, from components to the cleaned NRFG
//! - [`parsing`]: FASTA, edge table and Newick readers
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod engine;
pub mod model;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::error::LegoError;
pub use core::types::*;
pub use engine::config::PipelineConfig;
pub use model::stage::Stage;
pub use model::store::Model;
