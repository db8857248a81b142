use clap::ValueEnum;
use serde::Deserialize;

/// How engine output is shown in the terminal.
#[derive(ValueEnum, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputDisplay {
    /// Stream engine output live.
    Stream,
    /// Print each stage's output as a single block after it completes.
    Group,
}
