use chrono::{Local, NaiveDateTime};
use thiserror::Error;

use crate::datetime::parse_datetime_at;

const BY_SEPARATOR: &str = " /by ";
const FROM_SEPARATOR: &str = " /from ";
const TO_SEPARATOR: &str = " /to ";

/// Malformed command input. Always recoverable; the command has no effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("OOPS!!! The description of a {0} cannot be empty.")]
    EmptyDescription(&'static str),
    #[error("OOPS!!! The {command} must have a {clause} time.")]
    MissingClause {
        command: &'static str,
        clause: &'static str,
    },
    #[error("OOPS! You have to choose a task number!")]
    MissingIndex,
    #[error("OOPS! Please provide a valid task number, got '{0}'.")]
    InvalidIndex(String),
    #[error("OOPS! You have to key in some keywords for me to find!")]
    EmptyKeywords,
    #[error(
        "OOPS! I can't read '{0}' as a time. Try one of: now, today, HHmm, MM-dd HHmm, \
         MM-dd, yyyy-MM-dd HHmm, yyyy-MM-dd (e.g. 2024-12-25 1800)"
    )]
    InvalidTimestamp(String),
    #[error("Sorry I don't understand what you are saying ;-; ('{0}')")]
    UnknownCommand(String),
}

/// Classification of the first word of an input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandWord {
    List,
    Mark,
    Unmark,
    Delete,
    Todo,
    Deadline,
    Event,
    Find,
    Undo,
    Unknown,
}

impl CommandWord {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandWord::List => "list",
            CommandWord::Mark => "mark",
            CommandWord::Unmark => "unmark",
            CommandWord::Delete => "delete",
            CommandWord::Todo => "todo",
            CommandWord::Deadline => "deadline",
            CommandWord::Event => "event",
            CommandWord::Find => "find",
            CommandWord::Undo => "undo",
            CommandWord::Unknown => "unknown",
        }
    }
}

/// A classified, field-validated command. Indices are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Mark { index: usize },
    Unmark { index: usize },
    Delete { index: usize },
    Todo { description: String },
    Deadline { description: String, due: NaiveDateTime },
    Event {
        description: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    Find { keywords: Vec<String> },
    Undo,
}

impl Command {
    /// Parse a full input line, resolving relative times against the local clock
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Self::parse_at(input, Local::now().naive_local())
    }

    /// Parse a full input line, resolving relative times against `now`
    pub fn parse_at(input: &str, now: NaiveDateTime) -> Result<Self, ParseError> {
        let input = input.trim();
        let word = parse_command(input);
        let len = word.as_str().len();

        let command = match word {
            CommandWord::List => Command::List,
            CommandWord::Undo => Command::Undo,
            CommandWord::Mark => Command::Mark {
                index: to_zero_based(parse_index(input, len)?)?,
            },
            CommandWord::Unmark => Command::Unmark {
                index: to_zero_based(parse_index(input, len)?)?,
            },
            CommandWord::Delete => Command::Delete {
                index: to_zero_based(parse_index(input, len)?)?,
            },
            CommandWord::Todo => Command::Todo {
                description: parse_todo(input)?,
            },
            CommandWord::Deadline => {
                let (description, due) = parse_deadline(input, now)?;
                Command::Deadline { description, due }
            }
            CommandWord::Event => {
                let (description, start, end) = parse_event(input, now)?;
                Command::Event {
                    description,
                    start,
                    end,
                }
            }
            CommandWord::Find => Command::Find {
                keywords: parse_keywords(input, len)?,
            },
            CommandWord::Unknown => {
                let first = input.split_whitespace().next().unwrap_or_default();
                return Err(ParseError::UnknownCommand(first.to_string()));
            }
        };
        Ok(command)
    }

    /// Whether executing this command changes the task list
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Command::List | Command::Find { .. })
    }
}

/// Classify the first whitespace-delimited token of `input`
pub fn parse_command(input: &str) -> CommandWord {
    match input.split_whitespace().next().unwrap_or_default() {
        "list" => CommandWord::List,
        "mark" => CommandWord::Mark,
        "unmark" => CommandWord::Unmark,
        "delete" => CommandWord::Delete,
        "todo" => CommandWord::Todo,
        "deadline" => CommandWord::Deadline,
        "event" => CommandWord::Event,
        "find" => CommandWord::Find,
        "undo" => CommandWord::Undo,
        _ => CommandWord::Unknown,
    }
}

/// Description of a `todo` line
pub fn parse_todo(input: &str) -> Result<String, ParseError> {
    let description = remainder(input, CommandWord::Todo.as_str().len());
    if description.is_empty() {
        return Err(ParseError::EmptyDescription("todo"));
    }
    Ok(description.to_string())
}

/// Description and due time of a `deadline ... /by <time>` line
pub fn parse_deadline(input: &str, now: NaiveDateTime) -> Result<(String, NaiveDateTime), ParseError> {
    let rest = remainder(input, CommandWord::Deadline.as_str().len());
    if rest.is_empty() {
        return Err(ParseError::EmptyDescription("deadline"));
    }

    let missing_by = ParseError::MissingClause {
        command: "deadline",
        clause: "/by",
    };
    let mut parts = rest.split(BY_SEPARATOR);
    let description = parts.next().unwrap_or_default();
    let time = parts.next().ok_or(missing_by.clone())?;
    if time.trim().is_empty() {
        return Err(missing_by);
    }

    let description = description.trim();
    if description.is_empty() {
        return Err(ParseError::EmptyDescription("deadline"));
    }
    Ok((description.to_string(), parse_datetime_at(time, now)?))
}

/// Description, start and end of an `event ... /from <time> /to <time>` line
pub fn parse_event(
    input: &str,
    now: NaiveDateTime,
) -> Result<(String, NaiveDateTime, NaiveDateTime), ParseError> {
    let rest = remainder(input, CommandWord::Event.as_str().len());
    if rest.is_empty() {
        return Err(ParseError::EmptyDescription("event"));
    }

    let missing_from = ParseError::MissingClause {
        command: "event",
        clause: "/from",
    };
    let missing_to = ParseError::MissingClause {
        command: "event",
        clause: "/to",
    };

    let mut parts = rest.split(FROM_SEPARATOR);
    let description = parts.next().unwrap_or_default();
    let times = parts.next().ok_or(missing_from.clone())?;
    let mut times = times.split(TO_SEPARATOR);
    let start = times.next().unwrap_or_default();
    let end = times.next().ok_or(missing_to.clone())?;
    if start.trim().is_empty() {
        return Err(missing_from);
    }
    if end.trim().is_empty() {
        return Err(missing_to);
    }

    let description = description.trim();
    if description.is_empty() {
        return Err(ParseError::EmptyDescription("event"));
    }
    Ok((
        description.to_string(),
        parse_datetime_at(start, now)?,
        parse_datetime_at(end, now)?,
    ))
}

/// 1-based task number following a command word of `command_len` bytes
pub fn parse_index(input: &str, command_len: usize) -> Result<usize, ParseError> {
    let text = remainder(input, command_len);
    if text.is_empty() {
        return Err(ParseError::MissingIndex);
    }
    text.parse::<usize>()
        .map_err(|_| ParseError::InvalidIndex(text.to_string()))
}

/// Whitespace-separated keywords following a command word of `command_len` bytes
pub fn parse_keywords(input: &str, command_len: usize) -> Result<Vec<String>, ParseError> {
    let text = remainder(input, command_len);
    if text.is_empty() {
        return Err(ParseError::EmptyKeywords);
    }
    Ok(text.split_whitespace().map(str::to_string).collect())
}

fn to_zero_based(number: usize) -> Result<usize, ParseError> {
    number
        .checked_sub(1)
        .ok_or_else(|| ParseError::InvalidIndex(number.to_string()))
}

fn remainder(input: &str, command_len: usize) -> &str {
    input.trim_start().get(command_len..).unwrap_or_default().trim()
}
