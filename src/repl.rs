use log::info;
use std::io::{self, Write};

use crate::session::Session;

pub const GREETING: &str = "Good to see you!\nI'm Overflow, lemme know what I could do for you :>";
pub const FAREWELL: &str = "Looking forward to the next time we meet!";
pub const EXIT_WORD: &str = "bye";

/// Drive `session` with lines from `lines`, writing every reply to `out`.
///
/// Stops at `bye` or when the line source runs dry. Command failures are written
/// to `out` and the loop continues; only a failing sink ends it early.
pub fn run<I, W>(session: &mut Session, lines: I, out: &mut W) -> io::Result<()>
where
    I: IntoIterator<Item = String>,
    W: Write,
{
    writeln!(out, "{}", GREETING)?;

    let mut handled = 0usize;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == EXIT_WORD {
            break;
        }

        handled += 1;
        match session.handle_line(line) {
            Ok(response) => writeln!(out, "{}", response)?,
            Err(err) => writeln!(out, "{}", err)?,
        }
        out.flush()?;
    }

    info!("event=session_end commands={}", handled);
    writeln!(out, "{}", FAREWELL)?;
    out.flush()
}
