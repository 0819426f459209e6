use crate::command::Command;
use crate::engine::EngineConfig;
use crate::error::Result;
use crate::seed;
use crate::tree::Node;
use clap::{ArgAction, Args, Parser};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "redo-fs",
    version,
    about = "Simulate crash recovery of a journaled file store (NO-UNDO/REDO)"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Load the stable tree from this directory instead of the built-in demo
    #[arg(long, value_name = "DIR", global = true)]
    pub seed: Option<PathBuf>,

    /// Pause this many milliseconds after every operation
    #[arg(long, value_name = "MS", global = true)]
    pub delay_ms: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl GlobalArgs {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            pacing: self.delay_ms.map(Duration::from_millis),
        }
    }

    /// Stable tree to start from.
    pub fn load_stable(&self) -> Result<Node> {
        match &self.seed {
            Some(dir) => seed::from_dir(dir),
            None => Ok(seed::demo()),
        }
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
