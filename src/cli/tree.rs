use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_model, resolve_component, save_model, ModelArg, OutputFormat};
use crate::parsing::newick::parse_newick_file;

#[derive(Args)]
pub struct TreeArgs {
    #[command(flatten)]
    pub model: ModelArg,

    /// Component name, index or major accession
    #[arg(required = true)]
    pub component: String,

    /// Newick tree with leaves named by accession or legacy accession
    #[arg(required = true)]
    pub input: PathBuf,
}

/// Execute tree subcommand
///
/// # Errors
///
/// Returns an error if the tree cannot be parsed or is refused by the model.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: TreeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut model = load_model(&args.model.model)?;
    let id = resolve_component(&model, &args.component)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    let (tree, newick) = parse_newick_file(&args.input, &model)?;
    let leaves = tree.leaves().len();
    model.set_tree(id, tree, Some(newick))?;

    let name = model.components.require(id)?.name(&model.sequences);
    model.comments.push(format!("Added tree of {name}"));
    save_model(&model, &args.model.model)?;

    if verbose {
        eprintln!("Read a tree of {leaves} leaves for {name}");
    }

    match format {
        OutputFormat::Text => println!(
            "Stored tree of {name} with {leaves} leaves ({} of {} components have trees)",
            model.components.num_trees(),
            model.components.len()
        ),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "component": name,
                "leaves": leaves,
                "trees": model.components.num_trees(),
                "components": model.components.len(),
            }))?
        ),
        OutputFormat::Tsv => println!(
            "{name}\t{leaves}\t{}\t{}",
            model.components.num_trees(),
            model.components.len()
        ),
    }

    Ok(())
}
