use super::script::ScriptParser;
use super::session::Session;
use crate::cli::GlobalArgs;
use crate::error::{JournalError, Result};
use crate::report::View;
use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Scenario script to execute (`-` reads stdin)
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Views to print after the script [default: disk, cache, journal, transactions]
    #[arg(long, value_enum, value_name = "VIEW")]
    pub show: Vec<View>,

    /// Also print the full narrative log
    #[arg(long)]
    pub narrative: bool,

    /// Print narrative events as each command runs
    #[arg(long, short = 'e')]
    pub echo: bool,
}

pub fn execute(args: RunArgs, global: &GlobalArgs) -> Result<()> {
    let source = read_script(&args.script)?;

    // A bad line fails the run before any command executes.
    let commands = ScriptParser::new()?.parse(&source)?;
    log::info!(
        "Running {} commands from {}",
        commands.len(),
        args.script.display()
    );

    let mut session = Session::new(global.load_stable()?, global.engine_config()).echo(args.echo);
    for (line, command) in &commands {
        if args.echo {
            println!("{} {:?}", format!("{:>4}", line).dimmed(), command);
        }
        if let Err(e) = session.execute(command) {
            log::error!("Script stopped at line {}", line);
            return Err(JournalError::Script {
                line: *line,
                message: e.to_string(),
            });
        }
    }

    let views: Vec<View> = if args.show.is_empty() {
        View::DEFAULT.to_vec()
    } else {
        args.show.clone()
    };

    println!();
    for view in views {
        println!("{}", session.render(view));
    }
    if args.narrative && !args.show.contains(&View::Log) {
        println!("{}", session.render(View::Log));
    }

    Ok(())
}

fn read_script(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    Ok(source)
}
