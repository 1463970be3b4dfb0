use std::io;
use std::path::PathBuf;

use chat_term::{LineReader, LineSource, Output, ReadOutcome, Tone};
use completion_provider::{ChatMessage, Role};
use dialoguer::Confirm;

use crate::controller::{ChatHost, PromptLabel};
use crate::external;
use crate::outcome::Outcome;

const HISTORY_SEPARATOR_WIDTH: usize = 20;

pub fn prompt_text(label: &PromptLabel) -> String {
    match &label.files {
        Some(files) => format!("{} (files: {files}) > ", label.session),
        None => format!("{} > ", label.session),
    }
}

/// [`ChatHost`] over a real terminal.
pub struct TerminalHost<R = LineReader> {
    output: Output,
    reader: R,
}

impl TerminalHost<LineReader> {
    pub fn new(output: Output) -> io::Result<Self> {
        Ok(Self::with_reader(output, LineReader::new()?))
    }
}

impl<R: LineSource> TerminalHost<R> {
    pub fn with_reader(output: Output, reader: R) -> Self {
        Self { output, reader }
    }
}

impl<R: LineSource> ChatHost for TerminalHost<R> {
    fn read_line(&mut self, label: &PromptLabel) -> io::Result<ReadOutcome> {
        self.reader.read_line(&prompt_text(label))
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .map_err(|error| match error {
                dialoguer::Error::IO(source) => source,
            })
    }

    fn notify(&mut self, tone: Tone, message: &str) {
        self.output.line(tone, message);
    }

    fn show_reply(&mut self, text: &str) {
        self.output.blank();
        self.output.line(Tone::Assistant, "Assistant:");
        self.output.reply(text);
        self.output.blank();
    }

    fn show_history(&mut self, display_name: &str, messages: &[ChatMessage]) {
        self.output.line(
            Tone::Heading,
            &format!("History for Session: {display_name}"),
        );
        for message in messages {
            match message.role {
                Role::User => {
                    self.output.line(Tone::User, "User:");
                    self.output.line(Tone::Plain, &message.content);
                }
                Role::Assistant => {
                    self.output.line(Tone::Assistant, "Assistant:");
                    self.output.reply(&message.content);
                }
            }
            self.output
                .line(Tone::Muted, &"-".repeat(HISTORY_SEPARATOR_WIDTH));
        }
    }

    fn compose_in_editor(&mut self) -> Outcome<String> {
        external::compose_in_editor(&self.output)
    }

    fn pick_file(&mut self) -> Outcome<PathBuf> {
        external::pick_file_with_fzf()
    }
}

#[cfg(test)]
mod tests {
    use super::prompt_text;
    use crate::controller::PromptLabel;

    #[test]
    fn prompt_shows_session_and_staged_files() {
        assert_eq!(
            prompt_text(&PromptLabel {
                session: "[Pending Name]".to_string(),
                files: None,
            }),
            "[Pending Name] > "
        );
        assert_eq!(
            prompt_text(&PromptLabel {
                session: "bread-baking".to_string(),
                files: Some("a.md, b.txt".to_string()),
            }),
            "bread-baking (files: a.md, b.txt) > "
        );
    }
}
