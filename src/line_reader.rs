//! Interactive line input.

use std::io;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// What a single prompt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C at the prompt.
    Interrupted,
    /// Ctrl-D or closed input.
    Eof,
}

/// Source of prompted input lines.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome>;
}

/// Rustyline-backed reader with in-memory history.
pub struct LineReader {
    editor: DefaultEditor,
}

impl LineReader {
    pub fn new() -> io::Result<Self> {
        let editor = DefaultEditor::new().map_err(readline_io_error)?;
        Ok(Self { editor })
    }
}

impl LineSource for LineReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(error) => Err(readline_io_error(error)),
        }
    }
}

fn readline_io_error(error: ReadlineError) -> io::Error {
    match error {
        ReadlineError::Io(error) => error,
        other => io::Error::other(other),
    }
}
