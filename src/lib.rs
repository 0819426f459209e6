#![doc = include_str!("../README.md")]

pub mod cli;
pub mod command;
pub mod engine;
pub mod error;
pub mod journal;
pub mod narrative;
pub mod registry;
pub mod report;
pub mod seed;
pub mod tree;
pub mod validation;

pub use error::*;

pub fn run() -> Result<()> {
    use clap::Parser;
    use command::Command;

    let cli = cli::Cli::parse();
    init_logging(cli.global.log_filter());

    match cli.command {
        Command::Run(args) => command::run::execute(args, &cli.global),
        Command::Shell(args) => command::shell::execute(args, &cli.global),
    }
}

/// `RUST_LOG` takes precedence over the verbosity flags.
fn init_logging(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
