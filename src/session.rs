use log::{debug, warn};
use std::fmt;
use thiserror::Error;

use crate::models::Task;
use crate::parser::{Command, ParseError};
use crate::storage::{LoadWarning, Storage, StorageError};
use crate::task_list::{Change, TaskList, TaskListError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    TaskList(#[from] TaskListError),
    #[error("Error saving tasks: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Malformed input, unknown command or out-of-range task number
    pub fn is_validation(&self) -> bool {
        match self {
            SessionError::Parse(_) => true,
            SessionError::TaskList(err) => matches!(err, TaskListError::IndexOutOfRange { .. }),
            SessionError::Storage(_) => false,
        }
    }
}

/// Outcome of one successfully executed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Listed { tasks: Vec<Task> },
    Added { task: Task, total: usize },
    Deleted { task: Task, total: usize },
    Marked { task: Task },
    Unmarked { task: Task },
    Found { groups: Vec<(String, Vec<Task>)> },
    Undone { change: Change },
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Listed { tasks } if tasks.is_empty() => {
                write!(f, "There currently isn't any added task QAQ")
            }
            Response::Listed { tasks } => {
                writeln!(f, "Here are the tasks in your list:")?;
                write_numbered(f, tasks.iter())
            }
            Response::Added { task, total } => {
                writeln!(f, "Got it! I've added the task: {}", task)?;
                write!(f, "Currently you have {} tasks.", total)
            }
            Response::Deleted { task, total } => {
                writeln!(f, "Deleted!")?;
                writeln!(f, "{}", task)?;
                write!(f, "Currently you have {} tasks.", total)
            }
            Response::Marked { task } => write!(f, "Marked!\n{}", task),
            Response::Unmarked { task } => write!(f, "Unmarked!\n{}", task),
            Response::Found { groups } if groups.is_empty() => {
                write!(f, "No matching tasks found!")
            }
            Response::Found { groups } => {
                for (i, (keyword, tasks)) in groups.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    writeln!(f, "Tasks matching \"{}\":", keyword)?;
                    write_numbered(f, tasks.iter())?;
                }
                Ok(())
            }
            Response::Undone { change } => match change {
                Change::Added { .. } => write!(f, "Undone! The last added task has been removed."),
                Change::Deleted { task, .. } => write!(f, "Undone! Restored:\n{}", task),
                Change::Marked { index } => write!(f, "Undone! Task {} is unmarked again.", index + 1),
                Change::Unmarked { index } => write!(f, "Undone! Task {} is marked again.", index + 1),
            },
        }
    }
}

fn write_numbered<'a>(f: &mut fmt::Formatter<'_>, tasks: impl Iterator<Item = &'a Task>) -> fmt::Result {
    let lines: Vec<String> = tasks
        .enumerate()
        .map(|(i, task)| format!("{}. {}", i + 1, task))
        .collect();
    write!(f, "{}", lines.join("\n"))
}

/// Owns the task list and its backing file for one user session
#[derive(Debug)]
pub struct Session {
    tasks: TaskList,
    storage: Storage,
}

impl Session {
    /// Load the backing file. Corrupt lines are returned as warnings.
    pub fn open(storage: Storage) -> Result<(Self, Vec<LoadWarning>), StorageError> {
        let report = storage.load()?;
        let session = Self {
            tasks: TaskList::from_tasks(report.tasks),
            storage,
        };
        Ok((session, report.warnings))
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Parse one input line and apply it
    pub fn handle_line(&mut self, line: &str) -> Result<Response, SessionError> {
        let command = Command::parse(line).inspect_err(|err| {
            debug!("event=command status=rejected error={}", err);
        })?;
        self.execute(command)
    }

    /// Apply `command`, persisting the whole list after any successful mutation.
    /// A failed save leaves the in-memory change in place.
    pub fn execute(&mut self, command: Command) -> Result<Response, SessionError> {
        let persist = command.is_mutation();
        let response = match command {
            Command::List => Response::Listed {
                tasks: self.tasks.tasks().to_vec(),
            },
            Command::Todo { description } => self.add(Task::todo(description)),
            Command::Deadline { description, due } => self.add(Task::deadline(description, due)),
            Command::Event {
                description,
                start,
                end,
            } => self.add(Task::event(description, start, end)),
            Command::Delete { index } => {
                let task = self.tasks.delete(index)?;
                Response::Deleted {
                    task,
                    total: self.tasks.size(),
                }
            }
            Command::Mark { index } => Response::Marked {
                task: self.tasks.mark(index)?.clone(),
            },
            Command::Unmark { index } => Response::Unmarked {
                task: self.tasks.unmark(index)?.clone(),
            },
            Command::Find { keywords } => Response::Found {
                groups: self
                    .tasks
                    .find(keywords.as_slice())
                    .iter()
                    .map(|(k, tasks)| (k.to_string(), tasks.iter().map(|t| (*t).clone()).collect()))
                    .collect(),
            },
            Command::Undo => Response::Undone {
                change: self.tasks.undo()?,
            },
        };

        if persist {
            self.storage.save(self.tasks.tasks()).inspect_err(|err| {
                warn!("event=save status=error error={}", err);
            })?;
        }
        Ok(response)
    }

    fn add(&mut self, task: Task) -> Response {
        self.tasks.add(task.clone());
        Response::Added {
            task,
            total: self.tasks.size(),
        }
    }
}
