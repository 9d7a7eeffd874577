use clap::Args;
use serde::Serialize;

use crate::cli::{load_model, resolve_component, save_model, ModelArg, OutputFormat};
use crate::engine::components::detect_components;
use crate::engine::config::{PipelineConfig, DEFAULT_MAJOR_COVERAGE};
use crate::model::store::Model;

#[derive(Args)]
pub struct ComponentsArgs {
    #[command(flatten)]
    pub model: ModelArg,

    /// Detect components from the sequences and edges
    #[arg(long)]
    pub detect: bool,

    /// Fraction of both sequences an edge must cover to join them (0-1]
    #[arg(long, default_value_t = DEFAULT_MAJOR_COVERAGE)]
    pub major_coverage: f64,

    /// Show details of one component (name, index or major accession)
    #[arg(long)]
    pub show: Option<String>,
}

#[derive(Serialize)]
struct ComponentRow {
    index: usize,
    name: String,
    majors: usize,
    minors: usize,
    aligned: bool,
    tree: bool,
    incoming: Vec<String>,
    outgoing: Vec<String>,
}

/// Execute components subcommand
///
/// # Errors
///
/// Returns an error if the model cannot be loaded or detection is refused.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ComponentsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut model = load_model(&args.model.model)?;

    if args.detect {
        let config = PipelineConfig {
            major_coverage: args.major_coverage,
            ..PipelineConfig::default()
        };
        config.validate()?;

        let count = detect_components(&mut model, config.major_coverage)?;
        model.comments.push(format!("Detected {count} components"));
        save_model(&model, &args.model.model)?;

        if verbose {
            eprintln!("Detected {count} components");
        }
    }

    if let Some(query) = &args.show {
        let id = resolve_component(&model, query)?;
        let details = model.components.to_details(id, &model.sequences)?;
        println!("{details}");
        return Ok(());
    }

    let rows = component_rows(&model);
    match format {
        OutputFormat::Text => {
            if rows.is_empty() {
                eprintln!("No components. Run with --detect to find them.");
            }
            for row in &rows {
                println!(
                    "{:<4} {:<20} {} majors, {} minors{}{}",
                    row.index,
                    row.name,
                    row.majors,
                    row.minors,
                    if row.aligned { ", aligned" } else { "" },
                    if row.tree { ", tree" } else { "" },
                );
                if !row.incoming.is_empty() {
                    println!("     from: {}", row.incoming.join(", "));
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Tsv => {
            println!("index\tname\tmajors\tminors\taligned\ttree\tincoming\toutgoing");
            for row in &rows {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    row.index,
                    row.name,
                    row.majors,
                    row.minors,
                    row.aligned,
                    row.tree,
                    row.incoming.join(","),
                    row.outgoing.join(","),
                );
            }
        }
    }

    Ok(())
}

fn component_rows(model: &Model) -> Vec<ComponentRow> {
    let names = |ids: Vec<_>| -> Vec<String> {
        ids.into_iter()
            .filter_map(|id| model.components.get(id))
            .map(|c| c.name(&model.sequences))
            .collect()
    };

    model
        .components
        .iter()
        .map(|component| ComponentRow {
            index: component.index.0,
            name: component.name(&model.sequences),
            majors: component.major_sequences.len(),
            minors: component.minor_subsequences.len(),
            aligned: component.alignment.is_some(),
            tree: component.tree.is_some(),
            incoming: names(model.components.incoming_components(component.index)),
            outgoing: names(model.components.outgoing_components(component.index)),
        })
        .collect()
}
