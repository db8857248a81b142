use clap::Parser;

use crate::output::OutputDisplay;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to use
    #[arg(short = 'f', long = "file", default_value = "jsglue.toml")]
    pub file: String,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Override the engine timeout (e.g., "5m", "30s", "1h30m")
    #[arg(short = 't', long = "timeout")]
    pub timeout: Option<String>,

    /// Show the stages that would run without invoking any engine
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print the planned stages as JSON and exit
    #[arg(long = "plan", conflicts_with = "dry_run")]
    pub plan: bool,

    /// How to display engine output in the terminal
    #[arg(long = "display", value_enum)]
    pub display: Option<OutputDisplay>,

    /// Bundle to build, builds the default bundle or all bundles if not specified
    pub bundle: Option<String>,
}
