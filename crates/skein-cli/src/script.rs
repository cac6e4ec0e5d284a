//! Command scripts driven against a [`LoadBalancer`].
//!
//! One command per line:
//!
//! ```text
//! add_server <id>
//! remove_server <id>
//! store <key> <value>
//! retrieve <key>
//! remove <key>
//! ```
//!
//! Tokens are split on whitespace and may be wrapped in double quotes to
//! keep spaces; the quotes themselves are dropped. Blank lines and lines
//! starting with `#` are skipped.

use std::io::Write;

use skein_balancer::{BalancerError, LoadBalancer};
use skein_types::StoreId;
use tracing::debug;

/// A single parsed script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddServer(StoreId),
    RemoveServer(StoreId),
    Store { key: String, value: String },
    Retrieve { key: String },
    Remove { key: String },
}

/// Errors raised while parsing or running a script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The line is not a valid command.
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The balancer rejected the command.
    #[error("line {line}: {source}")]
    Balancer { line: usize, source: BalancerError },

    /// Writing a result line failed.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Counters collected over one script run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Commands executed.
    pub commands: usize,
    /// Result lines written.
    pub lines: usize,
    /// Entries moved by membership changes.
    pub migrations: usize,
}

// -----------------------------------------------------------------------
// Parsing
// -----------------------------------------------------------------------

/// Parse a whole script, returning each command with its 1-based line number.
pub fn parse_script(source: &str) -> Result<Vec<(usize, Command)>, ScriptError> {
    let mut commands = Vec::new();
    for (idx, text) in source.lines().enumerate() {
        let line = idx + 1;
        if let Some(command) = parse_line(text).map_err(|reason| ScriptError::Parse { line, reason })? {
            commands.push((line, command));
        }
    }
    Ok(commands)
}

/// Parse one line. `Ok(None)` for blank and comment lines.
pub fn parse_line(text: &str) -> Result<Option<Command>, String> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let tokens = tokenize(text)?;
    let Some((name, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match (name.as_str(), args) {
        ("add_server", [id]) => Command::AddServer(parse_store_id(id)?),
        ("remove_server", [id]) => Command::RemoveServer(parse_store_id(id)?),
        ("store", [key, value]) => Command::Store {
            key: key.clone(),
            value: value.clone(),
        },
        ("retrieve", [key]) => Command::Retrieve { key: key.clone() },
        ("remove", [key]) => Command::Remove { key: key.clone() },
        ("add_server" | "remove_server" | "retrieve" | "remove", _) => {
            return Err(format!("`{name}` takes 1 argument, got {}", args.len()));
        }
        ("store", _) => {
            return Err(format!("`store` takes 2 arguments, got {}", args.len()));
        }
        (other, _) => return Err(format!("unknown command `{other}`")),
    };
    Ok(Some(command))
}

fn parse_store_id(token: &str) -> Result<StoreId, String> {
    token
        .parse::<u32>()
        .map(StoreId::new)
        .map_err(|e| format!("invalid store id `{token}`: {e}"))
}

/// Split on whitespace outside double quotes and drop the quotes.
fn tokenize(text: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for c in text.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err("unterminated quote".to_string());
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

// -----------------------------------------------------------------------
// Execution
// -----------------------------------------------------------------------

/// Runs commands against an owned balancer.
#[derive(Debug)]
pub struct ScriptRunner {
    balancer: LoadBalancer,
    summary: RunSummary,
}

impl ScriptRunner {
    pub fn new(balancer: LoadBalancer) -> Self {
        Self {
            balancer,
            summary: RunSummary::default(),
        }
    }

    pub fn balancer(&self) -> &LoadBalancer {
        &self.balancer
    }

    /// Execute one command and return the line it reports, if any.
    pub fn execute(&mut self, command: &Command) -> Result<Option<String>, BalancerError> {
        self.summary.commands += 1;
        let line = match command {
            Command::AddServer(id) => {
                let moved = self.balancer.add_store(*id)?;
                self.summary.migrations += moved.len();
                None
            }
            Command::RemoveServer(id) => {
                let moved = self.balancer.remove_store(*id)?;
                self.summary.migrations += moved.len();
                None
            }
            Command::Store { key, value } => {
                let id = self.balancer.store(key.as_bytes(), value.as_bytes())?;
                Some(format!("Stored {value} on server {id}."))
            }
            Command::Retrieve { key } => Some(match self.balancer.retrieve(key.as_bytes()) {
                Some((id, value)) => {
                    format!("Retrieved {} from server {id}.", String::from_utf8_lossy(value))
                }
                None => format!("Key {key} not present."),
            }),
            Command::Remove { key } => Some(match self.balancer.remove(key.as_bytes()) {
                Some((id, _)) => format!("Removed {key} from server {id}."),
                None => format!("Key {key} not present."),
            }),
        };
        Ok(line)
    }

    /// Parse `source` and execute every command, writing result lines to `out`.
    ///
    /// The whole script is parsed before anything runs, so a malformed line
    /// leaves the balancer untouched.
    pub fn run<W: Write>(&mut self, source: &str, out: &mut W) -> Result<RunSummary, ScriptError> {
        let commands = parse_script(source)?;
        debug!(commands = commands.len(), "parsed script");

        for (line, command) in &commands {
            let result = self
                .execute(command)
                .map_err(|source| ScriptError::Balancer { line: *line, source })?;
            if let Some(text) = result {
                writeln!(out, "{text}")?;
                self.summary.lines += 1;
            }
        }
        Ok(self.summary)
    }
}
