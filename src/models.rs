use chrono::NaiveDateTime;
use std::fmt;

use crate::datetime::{format_display, format_storage};

/// Field separator used by the storage line format
pub const FIELD_SEPARATOR: &str = " | ";

/// Variant-specific part of a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Todo,
    Deadline { due: NaiveDateTime },
    Event { start: NaiveDateTime, end: NaiveDateTime },
}

impl TaskKind {
    /// One-letter tag shared by the display and storage renderings
    pub fn tag(&self) -> &'static str {
        match self {
            TaskKind::Todo => "T",
            TaskKind::Deadline { .. } => "D",
            TaskKind::Event { .. } => "E",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    description: String,
    done: bool,
    kind: TaskKind,
}

impl Task {
    pub fn todo(description: impl Into<String>) -> Self {
        Self::new(description, TaskKind::Todo)
    }

    pub fn deadline(description: impl Into<String>, due: NaiveDateTime) -> Self {
        Self::new(description, TaskKind::Deadline { due })
    }

    /// No ordering is enforced between `start` and `end`
    pub fn event(description: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self::new(description, TaskKind::Event { start, end })
    }

    fn new(description: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            description: description.into(),
            done: false,
            kind,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    pub fn is_complete(&self) -> bool {
        self.done
    }

    pub fn mark(&mut self) {
        self.done = true;
    }

    pub fn unmark(&mut self) {
        self.done = false;
    }

    /// Human-readable line, e.g. `[D][ ] return book (by: Dec 25 2024, 6:00PM)`
    pub fn render_display(&self) -> String {
        let glyph = if self.done { "X" } else { " " };
        let head = format!("[{}][{}] {}", self.kind.tag(), glyph, self.description);
        match &self.kind {
            TaskKind::Todo => head,
            TaskKind::Deadline { due } => format!("{} (by: {})", head, format_display(due)),
            TaskKind::Event { start, end } => format!(
                "{} (from: {} to: {})",
                head,
                format_display(start),
                format_display(end)
            ),
        }
    }

    /// Pipe-delimited storage line, e.g. `D | 0 | return book | 2024-12-25 1800`
    pub fn render_storage(&self) -> String {
        let status = if self.done { "1" } else { "0" };
        let mut fields = vec![
            self.kind.tag().to_string(),
            status.to_string(),
            self.description.clone(),
        ];
        match &self.kind {
            TaskKind::Todo => {}
            TaskKind::Deadline { due } => fields.push(format_storage(due)),
            TaskKind::Event { start, end } => {
                fields.push(format_storage(start));
                fields.push(format_storage(end));
            }
        }
        fields.join(FIELD_SEPARATOR)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn todo_renders_and_toggles() {
        let mut task = Task::todo("read book");
        assert_eq!(task.render_storage(), "T | 0 | read book");
        assert_eq!(task.render_display(), "[T][ ] read book");

        task.mark();
        assert!(task.is_complete());
        assert_eq!(task.render_storage(), "T | 1 | read book");
        assert_eq!(task.render_display(), "[T][X] read book");

        task.unmark();
        assert!(!task.is_complete());
        assert_eq!(task.description(), "read book");
    }

    #[test]
    fn deadline_renders_canonical_and_friendly_times() {
        let task = Task::deadline("return book", at(2024, 12, 25, 18, 0));
        assert_eq!(task.render_storage(), "D | 0 | return book | 2024-12-25 1800");
        assert!(task.render_display().contains("Dec 25 2024"));
        assert_eq!(task.to_string(), "[D][ ] return book (by: Dec 25 2024, 6:00PM)");
    }

    #[test]
    fn event_keeps_times_when_marked() {
        let mut task = Task::event("meeting", at(2024, 12, 20, 14, 0), at(2024, 12, 20, 16, 0));
        task.mark();
        assert_eq!(
            task.render_storage(),
            "E | 1 | meeting | 2024-12-20 1400 | 2024-12-20 1600"
        );
        assert_eq!(
            task.render_display(),
            "[E][X] meeting (from: Dec 20 2024, 2:00PM to: Dec 20 2024, 4:00PM)"
        );
    }
}
