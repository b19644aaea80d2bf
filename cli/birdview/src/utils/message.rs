use std::fmt::Display;
use std::io::Write;

use super::TERMINAL_STDERR;

/// Write a message to stderr.
///
/// Holds the terminal lock so messages do not tear log lines.
fn print_message(v: impl Display) {
    match TERMINAL_STDERR.lock() {
        Ok(mut stderr) => {
            let _ = writeln!(stderr, "{v}");
        },
        Err(_) => eprintln!("{v}"),
    }
}

pub(crate) fn error(v: impl Display) {
    print_message(std::format_args!("❌ ERROR: {v}"));
}
/// double width character, add an additional space for alignment
pub(crate) fn warning(v: impl Display) {
    print_message(std::format_args!("⚠️  {v}"));
}
