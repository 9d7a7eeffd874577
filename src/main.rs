use clap::Parser;
use tracing_subscriber::EnvFilter;

use lego_fusion::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("lego_fusion=debug,info")
    } else {
        EnvFilter::new("lego_fusion=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Import(args) => cli::import::run(args, cli.format, cli.verbose)?,
        cli::Commands::Components(args) => cli::components::run(args, cli.format, cli.verbose)?,
        cli::Commands::Align(args) => cli::align::run(args, cli.format, cli.verbose)?,
        cli::Commands::Tree(args) => cli::tree::run(args, cli.format, cli.verbose)?,
        cli::Commands::Status(args) => cli::status::run(args, cli.format, cli.verbose)?,
        cli::Commands::Fasta(args) => cli::fasta::run(args, cli.format, cli.verbose)?,
        cli::Commands::Nrfg(args) => cli::nrfg::run(args, cli.format, cli.verbose)?,
        cli::Commands::Drop(args) => cli::drop::run(args, cli.format, cli.verbose)?,
    }

    Ok(())
}
