use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "buildscript-check",
    about = "Check a generated JavaScript launcher script against the build-script conventions"
)]
pub struct Cli {
    /// Shell script to check
    #[arg(default_value = "./java_script_run.sh")]
    pub script: PathBuf,

    /// TOML file overriding the expected frameworks, literals, and tools
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,
}
