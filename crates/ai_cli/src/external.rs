//! External programs: `$EDITOR` for composing messages and `fzf` for picking files.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use chat_term::{Output, Tone};

use crate::error::AppError;
use crate::outcome::Outcome;

pub const EDITOR_ENV_VAR: &str = "EDITOR";
pub const EDITOR_HEADER: &str = "# Enter your prompt below. Save and exit the editor when done.";
const FZF_CANCELLED_EXIT_CODE: i32 = 130;

/// Drops the seeded header line and trims the rest.
pub fn strip_editor_header(text: &str) -> String {
    text.lines()
        .filter(|line| line.trim() != EDITOR_HEADER)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Splits an `$EDITOR` value such as `code --wait` into program and arguments.
pub fn editor_command(value: &str) -> Option<(String, Vec<String>)> {
    let mut parts = value.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Opens `$EDITOR` on a scratch Markdown file and returns what was written.
///
/// An empty string means the user saved nothing.
pub fn compose_in_editor(output: &Output) -> Outcome<String> {
    let configured = std::env::var(EDITOR_ENV_VAR).unwrap_or_default();
    let Some((program, args)) = editor_command(&configured) else {
        return Outcome::failed(AppError::invalid_argument(
            "$EDITOR environment variable is not set. Please set it (e.g. export EDITOR=vim).",
        ));
    };

    let scratch = match tempfile::Builder::new()
        .prefix("ai-cli-prompt-")
        .suffix(".md")
        .tempfile()
    {
        Ok(file) => file,
        Err(error) => return Outcome::failed(AppError::io("creating editor scratch file", error)),
    };
    let seeded = writeln!(scratch.as_file(), "{EDITOR_HEADER}\n")
        .and_then(|()| scratch.as_file().sync_all());
    if let Err(error) = seeded {
        return Outcome::failed(AppError::io("writing editor scratch file", error));
    }

    tracing::debug!(editor = %program, file = %scratch.path().display(), "launching editor");
    let status = match Command::new(&program).args(&args).arg(scratch.path()).status() {
        Ok(status) => status,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Outcome::failed(AppError::NotFound(format!(
                "Editor command not found: '{program}'. Check your $EDITOR setting."
            )));
        }
        Err(error) => return Outcome::failed(AppError::io("launching editor", error)),
    };
    if !status.success() {
        output.notice(
            Tone::Warning,
            &format!("Editor exited with status {status}. Reading the file anyway."),
        );
    }

    match fs::read_to_string(scratch.path()) {
        Ok(text) => Outcome::Ok(strip_editor_header(&text)),
        Err(error) => Outcome::failed(AppError::io("reading editor scratch file", error)),
    }
}

/// Runs `fzf` and returns the selected path. Escape in the picker cancels.
pub fn pick_file_with_fzf() -> Outcome<PathBuf> {
    let result = Command::new("fzf")
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output();
    let output = match result {
        Ok(output) => output,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Outcome::failed(AppError::NotFound(
                "fzf not found. Install it (e.g. 'brew install fzf' or 'apt install fzf') or pass a path: /upload <file_path>"
                    .to_string(),
            ));
        }
        Err(error) => return Outcome::failed(AppError::io("launching fzf", error)),
    };

    match output.status.code() {
        Some(0) => {
            let selected = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if selected.is_empty() {
                Outcome::Cancelled
            } else {
                Outcome::Ok(PathBuf::from(selected))
            }
        }
        Some(FZF_CANCELLED_EXIT_CODE) => Outcome::Cancelled,
        code => {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                match code {
                    Some(code) => format!("fzf exited with code {code}"),
                    None => "fzf was terminated by a signal".to_string(),
                }
            } else {
                format!("fzf failed: {stderr}")
            };
            Outcome::failed(AppError::io("picking a file", io::Error::other(message)))
        }
    }
}
