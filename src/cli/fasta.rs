use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_model, resolve_component, ModelArg, OutputFormat};

#[derive(Args)]
pub struct FastaArgs {
    #[command(flatten)]
    pub model: ModelArg,

    /// Write only the domains of this component (name, index or major accession)
    #[arg(long)]
    pub component: Option<String>,

    /// Write the stored alignment of the component instead of its domains
    #[arg(long, requires = "component")]
    pub alignment: bool,

    /// Name sequences by legacy accession, as external tools expect
    #[arg(long, conflicts_with = "alignment")]
    pub legacy: bool,

    /// Output file. If not specified, prints to stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute fasta subcommand
///
/// # Errors
///
/// Returns an error if the component is unknown or has no alignment.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: FastaArgs, _format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let model = load_model(&args.model.model)?;

    let fasta = match &args.component {
        None if args.legacy => model
            .sequences
            .iter()
            .filter_map(|s| s.site_array().map(|sites| format!(">{}\n{sites}\n", s.legacy_accession())))
            .collect(),
        None => model.sequences.to_fasta(),
        Some(query) => {
            let id = resolve_component(&model, query)?;
            let component = model.components.require(id)?;

            if args.alignment {
                component.get_alignment_fasta(&model.sequences)?.ok_or_else(|| {
                    anyhow::anyhow!("{} has no alignment", component.name(&model.sequences))
                })?
            } else if args.legacy {
                component.to_legacy_fasta(&model.sequences)
            } else {
                component.to_fasta(&model.sequences)
            }
        }
    };

    if let Some(path) = &args.output {
        std::fs::write(path, &fasta)?;
        if verbose {
            eprintln!("Wrote {} records to {}", fasta.matches('>').count(), path.display());
        }
    } else {
        print!("{fasta}");
    }

    Ok(())
}
