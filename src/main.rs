mod check;
mod checker;
mod cli;
mod config;
mod exec;
mod progress;
mod report;
mod types;

use std::sync::Arc;

use clap::Parser;
use cli::Cli;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    }
}

/// Check the script named on the command line and print the report.
/// Returns whether every check passed.
async fn run(cli: &Cli) -> anyhow::Result<bool> {
    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::CheckerConfig::default(),
    };
    tracing::debug!(?cfg, "loaded configuration");

    let checker = checker::Checker::new(cfg, Arc::new(exec::SystemRunner));

    let pb = progress::suite_spinner(&cli.script);
    let outcome = match checker.run(&cli.script).await {
        Ok(o) => o,
        Err(e) => {
            pb.abandon();
            return Err(e);
        }
    };
    progress::finish_suite_spinner(&pb, outcome.valid_count(), outcome.results.len());

    report::print_report(&cli.script, &outcome);
    Ok(outcome.passed)
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("WARNING: could not install log subscriber: {e}");
    }
}
