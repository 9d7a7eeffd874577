use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::cli::{load_model, save_model, ModelArg, OutputFormat};
use crate::core::split::EvidenceRule;
use crate::engine::config::PipelineConfig;
use crate::engine::{create_nrfg, NRFG_STAGES};

#[derive(Args)]
pub struct NrfgArgs {
    #[command(flatten)]
    pub model: ModelArg,

    /// Pipeline configuration (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Count a split with its sides swapped as evidence
    #[arg(long)]
    pub allow_flipped: bool,

    /// Write the cleaned NRFG to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Format of the written graph
    #[arg(long, value_enum, default_value = "edges")]
    pub graph_format: GraphFormat,

    /// Write the graph before cleaning
    #[arg(long)]
    pub unclean: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GraphFormat {
    /// Tab-separated edge list
    Edges,
    /// One Newick line per subgraph
    Newick,
}

/// Execute nrfg subcommand
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a component has no
/// tree, or a stage fails. Stages completed before a failure are saved.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: NrfgArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load_from_file(path)?,
        None => PipelineConfig::default(),
    };
    if args.allow_flipped {
        config.evidence_rule = EvidenceRule::AllowFlipped;
    }
    if verbose {
        eprintln!("Configuration: {}", serde_json::to_string(&config)?);
    }

    let mut model = load_model(&args.model.model)?;
    let result = create_nrfg(&mut model, &config);
    save_model(&model, &args.model.model)?;
    result?;

    if let Some(path) = &args.output {
        let graph = if args.unclean {
            &model.fusion_graph_unclean
        } else {
            &model.fusion_graph_clean
        }
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("The model has no fusion graph"))?;

        let text = match args.graph_format {
            GraphFormat::Edges => graph.graph.to_edge_list(|n| model.node_name(n)),
            GraphFormat::Newick => model
                .subgraphs
                .iter()
                .map(|s| format!("{}\t{}\n", s.name(&model), s.graph.to_newick(|n| model.node_name(n))))
                .collect(),
        };
        std::fs::write(path, text)?;

        if verbose {
            eprintln!("Wrote {} to {}", graph.name(), path.display());
        }
    }

    match format {
        OutputFormat::Text => {
            for stage in NRFG_STAGES {
                println!("{:<12} {}", stage, stage.headline(&model));
            }
        }
        OutputFormat::Json => {
            let stages: Vec<_> = NRFG_STAGES
                .iter()
                .map(|stage| {
                    serde_json::json!({
                        "stage": stage,
                        "headline": stage.headline(&model),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&stages)?);
        }
        OutputFormat::Tsv => {
            println!("stage\theadline");
            for stage in NRFG_STAGES {
                println!("{stage}\t{}", stage.headline(&model));
            }
        }
    }

    Ok(())
}
