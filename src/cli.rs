use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

use crate::source::{DEFAULT_DISTRICTS_URL, DEFAULT_STATES_URL};
use crate::PlanMode;

/// District viewer CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "fairmap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a state's district drilldown to an SVG file
    Show(ShowArgs),

    /// Serve the demo metrics endpoint
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Two-letter code, e.g. IL, CA, PR
    pub state: String,

    /// Output SVG file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub out: PathBuf,

    /// Apply a generated-plan styling before rendering
    #[arg(long, value_enum)]
    pub plan: Option<PlanModeArg>,

    /// State boundaries topology URL
    #[arg(long, default_value = DEFAULT_STATES_URL)]
    pub states_url: String,

    /// Congressional districts topology URL
    #[arg(long, default_value = DEFAULT_DISTRICTS_URL)]
    pub districts_url: String,

    /// Metrics endpoint base URL
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub metrics_url: String,

    /// Overwrite if the file already exists (off by default)
    #[arg(long)]
    pub force: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum PlanModeArg {
    Fair,
    FavorA,
    FavorB,
}

impl From<PlanModeArg> for PlanMode {
    fn from(mode: PlanModeArg) -> Self {
        match mode {
            PlanModeArg::Fair => PlanMode::Fair,
            PlanModeArg::FavorA => PlanMode::FavorA,
            PlanModeArg::FavorB => PlanMode::FavorB,
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address; falls back to FAIRMAP_ADDR, then 127.0.0.1:8000
    #[arg(long)]
    pub addr: Option<String>,

    /// Demo metrics JSON file keyed by state code; falls back to
    /// FAIRMAP_METRICS_FILE
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub metrics_file: Option<PathBuf>,
}
