use super::script::ScriptParser;
use super::session::Session;
use crate::cli::GlobalArgs;
use crate::error::Result;
use crate::report::View;
use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, IsTerminal, Write};

#[derive(Parser, Debug, Clone)]
pub struct ShellArgs {
    /// Do not print a prompt, even on a terminal
    #[arg(long)]
    pub no_prompt: bool,
}

const HELP: &str = "\
start | restart
commit <TX> | abort <TX>
read <TX> <PATH>
write <TX> <PATH> \"<TEXT>\"
create <TX> <PATH> file|folder
delete <TX> <PATH>
rename <TX> <PATH> <NAME>
show disk|cache|journal|transactions|log|actions
help | quit";

pub fn execute(args: ShellArgs, global: &GlobalArgs) -> Result<()> {
    let parser = ScriptParser::new()?;
    let mut session = Session::new(global.load_stable()?, global.engine_config()).echo(true);

    let stdin = io::stdin();
    let prompt = !args.no_prompt && stdin.is_terminal();
    if prompt {
        println!("{}", "redo-fs shell, type 'help' for commands".dimmed());
    }

    let mut lines = stdin.lock().lines();
    loop {
        if prompt {
            print!("{} ", "redo-fs>".bold());
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else { break };
        let line = line?;

        match line.trim() {
            "quit" | "exit" => break,
            "help" => {
                println!("{}", HELP);
                continue;
            }
            _ => {}
        }

        match parser.parse_line(&line) {
            Ok(Some(command)) => session.execute(&command)?,
            Ok(None) => {}
            Err(message) => eprintln!("{} {}", "Error:".red().bold(), message),
        }
    }

    print!("{}", session.render(View::Transactions));
    Ok(())
}
