//! Console interaction for `stdout <<` and `stdin >>` statements and progress lines.

use std::io::{self, BufRead, Write};

/// Trait for console input and output.
pub trait Console {
    /// Writes `text` as is, without adding a newline.
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Reads one line without its terminator. `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Reports a created or skipped entry.
    fn progress(&mut self, message: &str);
}

/// Console bound to the process standard streams.
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    pub fn new() -> Self {
        Self
    }
}

impl Console for StdConsole {
    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(strip_line_ending(line)))
    }

    fn progress(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Removes one trailing `\n` or `\r\n`.
pub fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}
