use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_model, resolve_component, save_model, ModelArg, OutputFormat};

#[derive(Args)]
pub struct AlignArgs {
    #[command(flatten)]
    pub model: ModelArg,

    /// Component name, index or major accession
    #[arg(required = true)]
    pub component: String,

    /// Aligned FASTA to store, with sequences named by legacy accession.
    /// Without it, the component's domains are written to stdout for the aligner.
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

/// Execute align subcommand
///
/// # Errors
///
/// Returns an error if the component is unknown or the alignment is refused.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: AlignArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut model = load_model(&args.model.model)?;
    let id = resolve_component(&model, &args.component)?;

    let Some(input) = &args.input else {
        let component = model.components.require(id)?;
        print!("{}", component.to_legacy_fasta(&model.sequences));
        return Ok(());
    };

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let fasta = std::fs::read_to_string(input)?;
    model.set_alignment(id, &fasta)?;

    let name = model.components.require(id)?.name(&model.sequences);
    model.comments.push(format!("Aligned {name}"));
    save_model(&model, &args.model.model)?;

    if verbose {
        eprintln!("Stored alignment of {name} from {}", input.display());
    }

    match format {
        OutputFormat::Text => println!(
            "Aligned {name} ({} of {} components aligned)",
            model.components.num_aligned(),
            model.components.len()
        ),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "component": name,
                "aligned": model.components.num_aligned(),
                "components": model.components.len(),
            }))?
        ),
        OutputFormat::Tsv => println!(
            "{name}\t{}\t{}",
            model.components.num_aligned(),
            model.components.len()
        ),
    }

    Ok(())
}
