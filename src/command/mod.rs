pub mod run;
pub mod script;
pub mod session;
pub mod shell;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Command {
    /// Execute a scenario script and print the resulting state.
    Run(run::RunArgs),
    /// Read commands interactively from stdin.
    Shell(shell::ShellArgs),
}
