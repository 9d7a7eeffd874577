use clap::Args;

use crate::cli::{load_model, ModelArg, OutputFormat};

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub model: ModelArg,

    /// Also print the model's comments
    #[arg(long)]
    pub comments: bool,
}

/// Execute status subcommand
///
/// # Errors
///
/// Returns an error if the model cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: StatusArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let model = load_model(&args.model.model)?;
    let summary = model.summary();

    match format {
        OutputFormat::Text => {
            println!("Model: {}", args.model.model.display());
            println!(
                "Sequences: {} ({} with sites, {})",
                summary.sequences, summary.sequences_with_sites, summary.site_type
            );
            println!("Edges: {}", summary.edges);
            if summary.user_domains > 0 || verbose {
                println!("User domains: {}", summary.user_domains);
            }
            println!();
            println!("{:<12} {:<10} Contents", "Stage", "Status");
            println!("{}", "-".repeat(50));
            for report in &summary.stages {
                println!("{:<12} {:<10} {}", report.stage, report.status, report.headline);
            }

            if args.comments {
                println!();
                for comment in &model.comments {
                    println!("# {comment}");
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Tsv => {
            println!("stage\tstatus\theadline");
            for report in &summary.stages {
                println!("{}\t{}\t{}", report.stage, report.status, report.headline);
            }
        }
    }

    Ok(())
}
