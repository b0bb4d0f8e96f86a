use chrono::{NaiveDate, NaiveDateTime};
use overflow::storage::{LoadProblem, Storage, StorageError};
use overflow::Task;
use std::fs;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[test]
fn missing_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(dir.path().join("nope.txt"));

    let report = storage.load().unwrap();
    assert!(report.tasks.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn save_then_load_round_trips_every_kind() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(dir.path().join("data").join("tasks.txt"));

    let mut todo = Task::todo("read book");
    todo.mark();
    let deadline = Task::deadline("return book", at(2024, 12, 25, 18, 0));
    let mut event = Task::event("meeting", at(2024, 12, 20, 14, 0), at(2024, 12, 20, 16, 0));
    event.mark();
    let tasks = vec![todo, deadline, event];

    storage.save(&tasks).unwrap();
    let written = fs::read_to_string(storage.path()).unwrap();
    assert_eq!(
        written,
        "T | 1 | read book\n\
         D | 0 | return book | 2024-12-25 1800\n\
         E | 1 | meeting | 2024-12-20 1400 | 2024-12-20 1600\n"
    );

    let report = storage.load().unwrap();
    assert!(report.warnings.is_empty());
    let reloaded: Vec<String> = report.tasks.iter().map(Task::render_storage).collect();
    let original: Vec<String> = tasks.iter().map(Task::render_storage).collect();
    assert_eq!(reloaded, original);
}

#[test]
fn save_rewrites_instead_of_appending() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(dir.path().join("tasks.txt"));

    storage
        .save(&[Task::todo("one"), Task::todo("two")])
        .unwrap();
    storage.save(&[Task::todo("three")]).unwrap();

    assert_eq!(
        fs::read_to_string(storage.path()).unwrap(),
        "T | 0 | three\n"
    );
}

#[test]
fn corrupt_lines_are_skipped_with_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.txt");
    fs::write(
        &path,
        "T | 0 | read book\n\
         D | 1 | missing due date\n\
         Q | 0 | mystery\n\
         D | 0 | bad date | 25/12/2024\n\
         E | 1 | party | 2024-12-20 1400 | 2024-12-20 2300\n",
    )
    .unwrap();

    let report = Storage::new(&path).load().unwrap();

    assert_eq!(report.tasks.len(), 2);
    assert_eq!(report.tasks[0].description(), "read book");
    assert!(report.tasks[1].is_complete());

    let problems: Vec<(usize, &LoadProblem)> = report
        .warnings
        .iter()
        .map(|w| (w.line_number, &w.problem))
        .collect();
    assert_eq!(
        problems,
        vec![
            (
                2,
                &LoadProblem::MissingFields {
                    kind: "D".to_string(),
                    found: 3,
                    needed: 4
                }
            ),
            (3, &LoadProblem::UnknownKind("Q".to_string())),
            (4, &LoadProblem::InvalidTimestamp("25/12/2024".to_string())),
        ]
    );
}

#[test]
fn one_good_line_and_one_short_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.txt");
    fs::write(&path, "T | 0 | read book\nT | 1\n").unwrap();

    let report = Storage::new(&path).load().unwrap();
    assert_eq!(report.tasks.len(), 1);
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn save_fails_when_directory_cannot_be_created() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let storage = Storage::new(blocker.join("sub").join("tasks.txt"));
    let err = storage.save(&[Task::todo("x")]).unwrap_err();
    assert!(matches!(err, StorageError::CreateDir { .. }));
}

#[test]
fn invalid_utf8_only_costs_its_own_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.txt");
    fs::write(&path, b"T | 0 | read book\nT | 0 | bad \xff\xfe\nT | 1 | keep me\n").unwrap();

    let report = Storage::new(&path).load().unwrap();

    let kept: Vec<String> = report.tasks.iter().map(Task::render_storage).collect();
    assert_eq!(kept, vec!["T | 0 | read book", "T | 1 | keep me"]);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].line_number, 2);
    assert_eq!(report.warnings[0].problem, LoadProblem::InvalidEncoding);
}

#[test]
fn descriptions_containing_the_separator_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(dir.path().join("tasks.txt"));

    let mut todo = Task::todo("x | y");
    todo.mark();
    let tasks = vec![
        Task::deadline("pay a | b", at(2024, 12, 25, 18, 0)),
        todo,
        Task::event("a | b | c", at(2024, 12, 20, 14, 0), at(2024, 12, 20, 16, 0)),
    ];
    storage.save(&tasks).unwrap();

    let report = storage.load().unwrap();
    assert!(report.warnings.is_empty());
    assert_eq!(report.tasks, tasks);
}
