use thiserror::Error;

use crate::models::Task;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskListError {
    #[error("OOPS! Task number {number} is out of range! You have {len} task(s).")]
    IndexOutOfRange { number: usize, len: usize },
    #[error("Nothing to undo!")]
    NothingToUndo,
}

/// The single reversible mutation remembered for `undo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added { index: usize },
    Deleted { index: usize, task: Task },
    Marked { index: usize },
    Unmarked { index: usize },
}

/// Tasks matching each searched keyword, in the order the keywords were given
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Matches<'a> {
    groups: Vec<(String, Vec<&'a Task>)>,
}

impl<'a> Matches<'a> {
    pub fn get(&self, keyword: &str) -> Option<&[&'a Task]> {
        self.groups
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, tasks)| tasks.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a Task])> {
        self.groups.iter().map(|(k, tasks)| (k.as_str(), tasks.as_slice()))
    }

    /// Number of keywords with at least one match
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Ordered collection of tasks with a single-slot undo
#[derive(Debug, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    last_change: Option<Change>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            last_change: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn size(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The change the next `undo` would revert, if any
    pub fn last_change(&self) -> Option<&Change> {
        self.last_change.as_ref()
    }

    pub fn add(&mut self, task: Task) {
        self.tasks.push(task);
        self.last_change = Some(Change::Added {
            index: self.tasks.len() - 1,
        });
    }

    pub fn delete(&mut self, index: usize) -> Result<Task, TaskListError> {
        self.check_index(index)?;
        let task = self.tasks.remove(index);
        self.last_change = Some(Change::Deleted {
            index,
            task: task.clone(),
        });
        Ok(task)
    }

    pub fn mark(&mut self, index: usize) -> Result<&Task, TaskListError> {
        self.check_index(index)?;
        self.tasks[index].mark();
        self.last_change = Some(Change::Marked { index });
        Ok(&self.tasks[index])
    }

    pub fn unmark(&mut self, index: usize) -> Result<&Task, TaskListError> {
        self.check_index(index)?;
        self.tasks[index].unmark();
        self.last_change = Some(Change::Unmarked { index });
        Ok(&self.tasks[index])
    }

    pub fn get(&self, index: usize) -> Result<&Task, TaskListError> {
        self.check_index(index)?;
        Ok(&self.tasks[index])
    }

    /// Case-insensitive substring search on descriptions. Keywords without any
    /// match are left out; a repeated keyword is only reported once.
    pub fn find<S: AsRef<str>>(&self, keywords: &[S]) -> Matches<'_> {
        let mut matches = Matches::default();
        for keyword in keywords {
            let keyword = keyword.as_ref();
            if matches.get(keyword).is_some() {
                continue;
            }
            let needle = keyword.to_lowercase();
            let found: Vec<&Task> = self
                .tasks
                .iter()
                .filter(|task| task.description().to_lowercase().contains(&needle))
                .collect();
            if !found.is_empty() {
                matches.groups.push((keyword.to_string(), found));
            }
        }
        matches
    }

    /// Revert the last recorded change and return it. The slot is emptied, so a
    /// second consecutive call fails.
    pub fn undo(&mut self) -> Result<Change, TaskListError> {
        let change = self.last_change.take().ok_or(TaskListError::NothingToUndo)?;
        match &change {
            Change::Added { index } => {
                if *index < self.tasks.len() {
                    self.tasks.remove(*index);
                }
            }
            Change::Deleted { index, task } => {
                let at = (*index).min(self.tasks.len());
                self.tasks.insert(at, task.clone());
            }
            Change::Marked { index } => {
                if let Some(task) = self.tasks.get_mut(*index) {
                    task.unmark();
                }
            }
            Change::Unmarked { index } => {
                if let Some(task) = self.tasks.get_mut(*index) {
                    task.mark();
                }
            }
        }
        Ok(change)
    }

    fn check_index(&self, index: usize) -> Result<(), TaskListError> {
        if index >= self.tasks.len() {
            return Err(TaskListError::IndexOutOfRange {
                number: index.saturating_add(1),
                len: self.tasks.len(),
            });
        }
        Ok(())
    }
}
