use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::check::CheckId;

#[derive(Parser)]
#[command(
    name = "cvp-checks",
    about = "Validate a deployed OpenStack/DriveTrain cloud against its expected state",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run checks against the live environment (default)")]
    Run(RunArgs),
    #[command(about = "List available checks")]
    List,
}

#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    #[arg(
        long,
        short,
        env = "CVP_CHECKS_CONFIG",
        help = "Config file (default: ./global_config.toml when present)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "check",
        short = 'k',
        value_enum,
        help = "Run only the named check (repeatable)"
    )]
    pub checks: Vec<CheckId>,

    #[arg(long, help = "Print the run report as JSON")]
    pub json: bool,
}

impl RunArgs {
    pub fn selected(&self) -> Vec<CheckId> {
        if self.checks.is_empty() {
            return CheckId::ALL.to_vec();
        }
        CheckId::ALL
            .into_iter()
            .filter(|id| self.checks.contains(id))
            .collect()
    }
}
