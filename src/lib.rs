pub mod cli;
pub mod config;
pub mod datetime;
pub mod logging;
pub mod models;
pub mod parser;
pub mod repl;
pub mod session;
pub mod storage;
pub mod task_list;
pub mod utils;

pub use config::Config;
pub use models::{Task, TaskKind};
pub use parser::{Command, CommandWord, ParseError};
pub use session::{Response, Session, SessionError};
pub use storage::{LoadReport, LoadWarning, Storage, StorageError};
pub use task_list::{Change, Matches, TaskList, TaskListError};
pub use utils::Profile;
