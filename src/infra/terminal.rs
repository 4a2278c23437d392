use std::io::{self, Write};

use clipboard_rs::{Clipboard, ClipboardContext};
use tracing::debug;

use crate::error::AppResult;
use crate::services::Console;

pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn say(&self, line: &str) {
        println!("{line}");
    }

    fn confirm(&self, question: &str) -> AppResult<bool> {
        let mut stdout = io::stdout();
        write!(stdout, "{question} [y/n]? ")?;
        stdout.flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(is_yes(&input))
    }
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Clipboard text with its lines joined by single spaces; empty when unavailable.
pub fn clipboard_text() -> String {
    match ClipboardContext::new().and_then(|ctx| ctx.get_text()) {
        Ok(text) => join_lines(&text),
        Err(err) => {
            debug!("clipboard unavailable: {err}");
            String::new()
        }
    }
}

fn join_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_y_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" Y "));
        assert!(!is_yes("yes"));
        assert!(!is_yes("\n"));
        assert!(!is_yes("n"));
    }

    #[test]
    fn joins_clipboard_lines() {
        assert_eq!(
            join_lines("Fix login\r\nhttps://github.com/o/r/issues/1\n\n"),
            "Fix login https://github.com/o/r/issues/1"
        );
    }
}
