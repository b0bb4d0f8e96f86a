use log::{debug, info, warn};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::datetime::parse_storage;
use crate::models::{FIELD_SEPARATOR, Task};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {}: {source}. Try creating it manually.", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Why a stored line was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadProblem {
    MissingFields { kind: String, found: usize, needed: usize },
    UnknownKind(String),
    InvalidTimestamp(String),
    InvalidEncoding,
}

impl fmt::Display for LoadProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadProblem::MissingFields { kind, found, needed } => write!(
                f,
                "'{}' record has {} field(s), needs {}",
                kind, found, needed
            ),
            LoadProblem::UnknownKind(kind) => write!(f, "unknown task type '{}'", kind),
            LoadProblem::InvalidTimestamp(text) => write!(f, "invalid timestamp '{}'", text),
            LoadProblem::InvalidEncoding => write!(f, "not valid UTF-8"),
        }
    }
}

/// A corrupt line skipped during `load`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// 1-based line number in the file
    pub line_number: usize,
    pub line: String,
    pub problem: LoadProblem,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line_number, self.problem, self.line)
    }
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub tasks: Vec<Task>,
    pub warnings: Vec<LoadWarning>,
}

/// Flat-file persistence for the task list
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every task from the file. A missing file yields an empty report;
    /// corrupt lines are skipped and reported as warnings.
    pub fn load(&self) -> Result<LoadReport, StorageError> {
        if !self.path.exists() {
            info!("event=load status=empty path={}", self.path.display());
            return Ok(LoadReport::default());
        }

        let contents = fs::read(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;

        let report = decode(&contents);
        for warning in &report.warnings {
            warn!("event=load_skip path={} {}", self.path.display(), warning);
        }
        info!(
            "event=load status=ok path={} tasks={} skipped={}",
            self.path.display(),
            report.tasks.len(),
            report.warnings.len()
        );
        Ok(report)
    }

    /// Rewrite the whole file from `tasks`, creating the parent directory on demand
    pub fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        fs::write(&self.path, encode(tasks)).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!("event=save status=ok path={} tasks={}", self.path.display(), tasks.len());
        Ok(())
    }
}

/// Serialize tasks to the line format, one task per line
pub fn encode(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|task| task.render_storage() + "\n")
        .collect()
}

/// Deserialize the line format, collecting a warning for every unusable line.
/// Lines are decoded one at a time, so bad bytes only cost their own line.
/// Blank lines are ignored.
pub fn decode(contents: &[u8]) -> LoadReport {
    let mut report = LoadReport::default();
    for (i, raw) in contents.split(|b| *b == b'\n').enumerate() {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let decoded = std::str::from_utf8(raw)
            .map_err(|_| LoadProblem::InvalidEncoding)
            .and_then(|line| {
                if line.trim().is_empty() {
                    Ok(None)
                } else {
                    decode_line(line).map(Some)
                }
            });
        match decoded {
            Ok(Some(task)) => report.tasks.push(task),
            Ok(None) => {}
            Err(problem) => report.warnings.push(LoadWarning {
                line_number: i + 1,
                line: String::from_utf8_lossy(raw).into_owned(),
                problem,
            }),
        }
    }
    report
}

/// Timestamps are taken from the end of the line and everything between the
/// status field and them is the description, so descriptions may contain the
/// separator.
fn decode_line(line: &str) -> Result<Task, LoadProblem> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    let kind = fields[0];
    let times = match kind {
        "T" => 0,
        "D" => 1,
        "E" => 2,
        other => return Err(LoadProblem::UnknownKind(other.to_string())),
    };
    let needed = 3 + times;
    if fields.len() < needed {
        return Err(LoadProblem::MissingFields {
            kind: kind.to_string(),
            found: fields.len(),
            needed,
        });
    }

    let timestamp =
        |text: &str| parse_storage(text).map_err(|_| LoadProblem::InvalidTimestamp(text.to_string()));
    let split = fields.len() - times;
    let description = fields[2..split].join(FIELD_SEPARATOR);
    let mut task = match kind {
        "D" => Task::deadline(description, timestamp(fields[split])?),
        "E" => Task::event(
            description,
            timestamp(fields[split])?,
            timestamp(fields[split + 1])?,
        ),
        _ => Task::todo(description),
    };

    if fields[1] == "1" {
        task.mark();
    }
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_line_reports_each_problem() {
        assert_eq!(
            decode_line("X | 0 | what"),
            Err(LoadProblem::UnknownKind("X".to_string()))
        );
        assert_eq!(
            decode_line("D | 0 | return book"),
            Err(LoadProblem::MissingFields {
                kind: "D".to_string(),
                found: 3,
                needed: 4
            })
        );
        assert_eq!(
            decode_line("E | 1 | party | 2024-12-20 1400 | tomorrow"),
            Err(LoadProblem::InvalidTimestamp("tomorrow".to_string()))
        );
    }

    #[test]
    fn decode_skips_blank_lines_without_warning() {
        let report = decode(b"T | 0 | a\r\n\n   \nT | 1 | b\n");
        assert_eq!(report.tasks.len(), 2);
        assert!(report.warnings.is_empty());
        assert!(report.tasks[1].is_complete());
    }

    #[test]
    fn separator_inside_description_survives() {
        assert_eq!(
            decode_line("T | 0 | x | y").unwrap().description(),
            "x | y"
        );
        let task = decode_line("E | 0 | a | b | 2024-12-20 1400 | 2024-12-20 1600").unwrap();
        assert_eq!(task.description(), "a | b");
    }

    #[test]
    fn warning_keeps_original_line_number() {
        let report = decode(b"T | 0 | a\nbroken\n");
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].line_number, 2);
        assert_eq!(report.warnings[0].line, "broken");
    }
}
