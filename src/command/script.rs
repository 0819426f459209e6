//! Line-oriented scenario language.
//!
//! One command per line; blank lines and lines starting with `#` are
//! ignored. Tokens are separated by whitespace and may be double-quoted
//! (`\"`, `\\` and `\n` are understood inside quotes). A `-` in place of a
//! transaction id means no transaction is selected.
//!
//! ```text
//! start
//! read T0 fs/readme
//! write T0 fs/readme "hello world"
//! create T0 fs/docs folder
//! rename T0 "fs/docs/folder 1" archive
//! commit T0
//! restart
//! show disk
//! ```

use crate::error::{JournalError, Result};
use crate::registry::TxnId;
use crate::report::View;
use crate::tree::{NodeKind, NodePath};
use clap::ValueEnum;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Start,
    Commit(Option<TxnId>),
    Abort(Option<TxnId>),
    Read(Option<TxnId>, NodePath),
    Write(Option<TxnId>, NodePath, String),
    Create(Option<TxnId>, NodePath, NodeKind),
    Delete(Option<TxnId>, NodePath),
    Rename(Option<TxnId>, NodePath, String),
    Restart,
    Show(View),
}

pub struct ScriptParser {
    token: Regex,
}

impl ScriptParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            token: Regex::new(r#""((?:[^"\\]|\\.)*)"|(\S+)"#)?,
        })
    }

    /// Parses a whole script, failing on the first bad line.
    pub fn parse(&self, source: &str) -> Result<Vec<(usize, ScriptCommand)>> {
        let mut commands = Vec::new();
        for (index, line) in source.lines().enumerate() {
            let line_no = index + 1;
            let parsed = self
                .parse_line(line)
                .map_err(|message| JournalError::Script {
                    line: line_no,
                    message,
                })?;
            if let Some(command) = parsed {
                commands.push((line_no, command));
            }
        }
        Ok(commands)
    }

    /// `Ok(None)` for blank and comment lines.
    pub fn parse_line(&self, line: &str) -> std::result::Result<Option<ScriptCommand>, String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let tokens = self.tokenize(trimmed)?;
        let (verb, args) = match tokens.split_first() {
            Some((verb, args)) => (verb.to_ascii_lowercase(), args),
            None => return Ok(None),
        };

        let command = match (verb.as_str(), args) {
            ("start", []) => ScriptCommand::Start,
            ("restart", []) => ScriptCommand::Restart,
            ("commit", [txn]) => ScriptCommand::Commit(parse_txn(txn)?),
            ("abort", [txn]) => ScriptCommand::Abort(parse_txn(txn)?),
            ("read", [txn, path]) => ScriptCommand::Read(parse_txn(txn)?, parse_path(path)?),
            ("write", [txn, path, text]) => {
                ScriptCommand::Write(parse_txn(txn)?, parse_path(path)?, text.clone())
            }
            ("create", [txn, path, kind]) => ScriptCommand::Create(
                parse_txn(txn)?,
                parse_path(path)?,
                kind.parse::<NodeKind>().map_err(|e| e.to_string())?,
            ),
            ("delete", [txn, path]) => ScriptCommand::Delete(parse_txn(txn)?, parse_path(path)?),
            ("rename", [txn, path, name]) => {
                ScriptCommand::Rename(parse_txn(txn)?, parse_path(path)?, name.clone())
            }
            ("show", [view]) => ScriptCommand::Show(
                View::from_str(view, true).map_err(|_| format!("unknown view '{}'", view))?,
            ),
            (verb, _) => return Err(usage(verb)),
        };
        Ok(Some(command))
    }

    fn tokenize(&self, line: &str) -> std::result::Result<Vec<String>, String> {
        let mut tokens = Vec::new();
        let mut consumed = 0;
        for caps in self.token.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            if !line[consumed..whole.start()].trim().is_empty() {
                return Err(format!("unexpected input near '{}'", &line[consumed..]));
            }
            consumed = whole.end();

            match (caps.get(1), caps.get(2)) {
                (Some(quoted), _) => tokens.push(unescape(quoted.as_str())),
                (None, Some(bare)) if bare.as_str().starts_with('"') => {
                    return Err("unterminated quote".to_string());
                }
                (None, Some(bare)) => tokens.push(bare.as_str().to_string()),
                (None, None) => {}
            }
        }
        Ok(tokens)
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn parse_txn(token: &str) -> std::result::Result<Option<TxnId>, String> {
    if token == "-" {
        return Ok(None);
    }
    token
        .parse::<TxnId>()
        .map(Some)
        .map_err(|_| format!("invalid transaction id '{}'", token))
}

fn parse_path(token: &str) -> std::result::Result<NodePath, String> {
    token.parse::<NodePath>().map_err(|e| e.to_string())
}

fn usage(verb: &str) -> String {
    let form = match verb {
        "start" => "start",
        "restart" => "restart",
        "commit" => "commit <TX>",
        "abort" => "abort <TX>",
        "read" => "read <TX> <PATH>",
        "write" => "write <TX> <PATH> \"<TEXT>\"",
        "create" => "create <TX> <PATH> file|folder",
        "delete" => "delete <TX> <PATH>",
        "rename" => "rename <TX> <PATH> <NAME>",
        "show" => "show disk|cache|journal|transactions|log|actions",
        other => return format!("unknown command '{}'", other),
    };
    format!("usage: {}", form)
}
