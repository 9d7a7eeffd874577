use clap::Args;

use crate::cli::{load_model, save_model, ModelArg, OutputFormat};
use crate::model::stage::Stage;

#[derive(Args)]
pub struct DropArgs {
    #[command(flatten)]
    pub model: ModelArg,

    /// Stage to drop (sequences, edges, components, alignments, trees,
    /// fusions, splits, consensus, subsets, pregraphs, subgraphs, fused, cleaned)
    #[arg(required = true)]
    pub stage: Stage,

    /// Also drop every stage derived from it
    #[arg(long)]
    pub cascade: bool,
}

/// Execute drop subcommand
///
/// # Errors
///
/// Returns an error if the stage is empty, or in use by a later stage and
/// `--cascade` is not given.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DropArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut model = load_model(&args.model.model)?;

    let mut targets = vec![args.stage];
    if args.cascade {
        targets.extend(Stage::ALL[args.stage.index() + 1..].iter().copied());
        targets.reverse();
    }

    let mut dropped = Vec::new();
    for stage in targets {
        if stage != args.stage && model.get_status(stage).is_none() {
            continue;
        }
        model.drop_stage(stage)?;
        dropped.push(stage);
        if verbose {
            eprintln!("Dropped {stage}");
        }
    }

    model
        .comments
        .push(format!("Dropped {}", dropped.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")));
    save_model(&model, &args.model.model)?;

    match format {
        OutputFormat::Text => {
            for stage in &dropped {
                println!("Dropped {stage}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&dropped)?),
        OutputFormat::Tsv => {
            for stage in &dropped {
                println!("{stage}");
            }
        }
    }

    Ok(())
}
