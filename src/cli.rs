use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use thiserror::Error;

use crate::repl;
use crate::session::{Session, SessionError};

#[derive(Parser)]
#[command(name = "overflow")]
#[command(about = "Overflow - a task tracker you talk to one line at a time")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Task file to use instead of the configured one
    #[arg(long)]
    pub data_file: Option<String>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use development mode (uses separate dev config/data)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive session (default if no subcommand)
    Shell,
    /// Run a single command line, e.g. `overflow exec todo read book`
    Exec {
        /// Command words
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Console error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Command(#[from] SessionError),
}

/// Handle the shell command: read stdin line by line until `bye` or EOF
pub fn handle_shell(session: &mut Session) -> Result<(), CliError> {
    let stdin = io::stdin();
    let lines = stdin.lock().lines().map_while(Result::ok);
    let mut stdout = io::stdout().lock();
    repl::run(session, lines, &mut stdout)?;
    Ok(())
}

/// Handle the exec command: run one line and print the reply
pub fn handle_exec(words: &[String], session: &mut Session) -> Result<(), CliError> {
    let line = words.join(" ");
    let response = session.handle_line(&line)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", response)?;
    Ok(())
}
