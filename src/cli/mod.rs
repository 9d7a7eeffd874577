//! Command-line interface for lego-fusion.
//!
//! Every command works on a model file given with `--model`:
//!
//! - **import**: add sequences (FASTA) and similarity edges to a model
//! - **components**: detect components, or list and describe them
//! - **align**: hand a component to an aligner, or store its alignment
//! - **tree**: store the Newick tree built for a component
//! - **status**: show what the model holds, stage by stage
//! - **fasta**: write sequences or a component's domains as FASTA
//! - **nrfg**: derive the N-rooted fusion graph from the component trees
//! - **drop**: discard a stage and everything derived from it
//!
//! ## Usage
//!
//! ```text
//! lego-fusion import --model genes.json --fasta genes.fa --edges blast.tsv
//! lego-fusion components --model genes.json --detect
//! lego-fusion align --model genes.json comp_A1 > comp_A1.fa
//! lego-fusion align --model genes.json comp_A1 --input comp_A1.aln.fa
//! lego-fusion tree --model genes.json comp_A1 comp_A1.nwk
//! lego-fusion nrfg --model genes.json --output nrfg.tsv
//! lego-fusion status --model genes.json --format json
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::core::types::ComponentId;
use crate::model::store::Model;

pub mod align;
pub mod components;
pub mod drop;
pub mod fasta;
pub mod import;
pub mod nrfg;
pub mod status;
pub mod tree;

#[derive(Parser)]
#[command(name = "lego-fusion")]
#[command(version)]
#[command(about = "Detect gene fusions and build N-rooted fusion graphs")]
#[command(
    long_about = "lego-fusion groups similar genes into components, finds components formed by the fusion of two others, and reconciles the component trees into a single N-rooted fusion graph (NRFG).\n\nAlignment and tree building are left to external tools: export each component as FASTA, then import the alignment and the Newick tree back."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add sequences and similarity edges to a model
    Import(import::ImportArgs),

    /// Detect, list or describe components
    Components(components::ComponentsArgs),

    /// Export a component for alignment, or import its alignment
    Align(align::AlignArgs),

    /// Import the tree of a component
    Tree(tree::TreeArgs),

    /// Show the contents of a model
    Status(status::StatusArgs),

    /// Write sequences as FASTA
    Fasta(fasta::FastaArgs),

    /// Derive the N-rooted fusion graph
    Nrfg(nrfg::NrfgArgs),

    /// Drop a stage and the stages derived from it
    Drop(drop::DropArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Model file shared by every command
#[derive(clap::Args)]
pub struct ModelArg {
    /// Model file (JSON)
    #[arg(short, long, required = true)]
    pub model: PathBuf,
}

/// Load an existing model file.
///
/// # Errors
///
/// Returns an error if the file is missing or is not a model.
pub fn load_model(path: &Path) -> anyhow::Result<Model> {
    if !path.exists() {
        anyhow::bail!("Model file not found: {}", path.display());
    }
    Model::load_from_file(path)
        .map_err(|e| anyhow::anyhow!("Cannot load model {}: {e}", path.display()))
}

/// Save a model, replacing the file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_model(model: &Model, path: &Path) -> anyhow::Result<()> {
    model
        .save(path)
        .map_err(|e| anyhow::anyhow!("Cannot save model {}: {e}", path.display()))
}

/// Find a component by display name (`comp_A1`), index, or the accession of
/// one of its major sequences.
///
/// # Errors
///
/// Returns an error if nothing matches.
pub fn resolve_component(model: &Model, query: &str) -> anyhow::Result<ComponentId> {
    if let Ok(component) = model.components.find_component_by_name(query, &model.sequences) {
        return Ok(component.index);
    }

    if let Ok(index) = query.parse::<usize>() {
        if let Some(component) = model.components.get(ComponentId(index)) {
            return Ok(component.index);
        }
    }

    let sequence = model
        .find_sequence_by_accession(query)
        .map_err(|_| anyhow::anyhow!("No component matches '{query}'"))?;
    Ok(model.components.find_component_for_major_sequence(sequence.id)?.index)
}
