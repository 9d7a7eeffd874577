use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::cli::{load_model, save_model, OutputFormat};
use crate::model::store::Model;
use crate::parsing::edges::{import_edges, parse_edges_file};
use crate::parsing::fasta::{import_fasta, is_fasta_file, read_fasta_file};

#[derive(Args)]
pub struct ImportArgs {
    /// Model file (JSON), created if it does not exist
    #[arg(short, long, required = true)]
    pub model: PathBuf,

    /// FASTA file(s) of sequences (.fa, .fasta, .faa, .fna, optionally gzipped)
    #[arg(long = "fasta", num_args = 1..)]
    pub fasta: Vec<PathBuf>,

    /// Similarity edges: BLAST tabular output or a six-column table
    #[arg(long = "edges", num_args = 1..)]
    pub edges: Vec<PathBuf>,

    /// Start a new model even if the file exists
    #[arg(long)]
    pub force: bool,
}

/// Execute import subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be parsed, or conflicts with the model.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ImportArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if args.fasta.is_empty() && args.edges.is_empty() {
        anyhow::bail!("Nothing to import: give --fasta and/or --edges");
    }

    let mut model = if args.model.exists() && !args.force {
        load_model(&args.model)?
    } else {
        info!("Creating model {}", args.model.display());
        Model::new()
    };

    let mut sequences = 0;
    for path in &args.fasta {
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        if !is_fasta_file(path) {
            anyhow::bail!(
                "Unrecognised FASTA extension: {} (expected .fa, .fasta, .faa or .fna)",
                path.display()
            );
        }

        let records = read_fasta_file(path)?;
        let count = import_fasta(&mut model, &records)?;
        if verbose {
            eprintln!("Read {count} sequences from {}", path.display());
        }
        sequences += count;
    }

    let mut edges = 0;
    for path in &args.edges {
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }

        let records = parse_edges_file(path)?;
        let count = import_edges(&mut model, &records)?;
        if verbose {
            eprintln!("Read {count} edges from {}", path.display());
        }
        edges += count;
    }

    model
        .comments
        .push(format!("Imported {sequences} sequences and {edges} edges"));
    save_model(&model, &args.model)?;

    match format {
        OutputFormat::Text => {
            println!("Imported {sequences} sequences and {edges} edges");
            println!(
                "Model now holds {} sequences and {} edges",
                model.sequences.len(),
                model.edges.len()
            );
        }
        OutputFormat::Json => {
            let report = serde_json::json!({
                "imported_sequences": sequences,
                "imported_edges": edges,
                "sequences": model.sequences.len(),
                "edges": model.edges.len(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Tsv => {
            println!("imported_sequences\timported_edges\tsequences\tedges");
            println!(
                "{sequences}\t{edges}\t{}\t{}",
                model.sequences.len(),
                model.edges.len()
            );
        }
    }

    Ok(())
}
