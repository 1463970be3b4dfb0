//! Interactive chat session.
//!
//! A controller starts [`SessionState::Unnamed`] when no name was given and
//! becomes [`SessionState::Active`] once the first message has been used to
//! name and create its record. Every user turn is persisted before the model
//! is called, and every reply is persisted before it joins the in-memory
//! history, so memory never runs ahead of disk.

use std::io;
use std::path::PathBuf;

use chat_term::{ReadOutcome, Tone};
use completion_provider::{ChatMessage, CompletionProvider, Role};
use session_store::{id, RenameOutcome, SessionStore};

use crate::attachments::{AttachmentError, Attachments};
use crate::commands::{parse_slash_command, SlashCommand, HELP_LINES};
use crate::error::AppError;
use crate::naming;
use crate::outcome::Outcome;

pub const PENDING_NAME_LABEL: &str = "[Pending Name]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unnamed,
    Active { full_id: String },
    Terminated { full_id: Option<String> },
}

/// What the input prompt should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptLabel {
    pub session: String,
    pub files: Option<String>,
}

/// Terminal side of a chat: input, notices, and rendering.
pub trait ChatHost {
    fn read_line(&mut self, label: &PromptLabel) -> io::Result<ReadOutcome>;
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
    fn notify(&mut self, tone: Tone, message: &str);
    fn show_reply(&mut self, text: &str);
    fn show_history(&mut self, display_name: &str, messages: &[ChatMessage]);
    fn compose_in_editor(&mut self) -> Outcome<String>;
    fn pick_file(&mut self) -> Outcome<PathBuf>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opening {
    Fresh,
    Started,
    Resumed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Exit,
}

pub struct ChatController<'a> {
    store: &'a SessionStore,
    provider: &'a dyn CompletionProvider,
    state: SessionState,
    messages: Vec<ChatMessage>,
    attachments: Attachments,
    opening: Opening,
}

impl<'a> ChatController<'a> {
    /// A chat that will be named after its first message.
    pub fn unnamed(store: &'a SessionStore, provider: &'a dyn CompletionProvider) -> Self {
        Self {
            store,
            provider,
            state: SessionState::Unnamed,
            messages: Vec::new(),
            attachments: Attachments::new(),
            opening: Opening::Fresh,
        }
    }

    /// Creates a fresh record for `display_name`.
    pub fn named(
        store: &'a SessionStore,
        provider: &'a dyn CompletionProvider,
        display_name: &str,
    ) -> Result<Self, AppError> {
        let full_id = store.create_named(display_name)?;
        Ok(Self {
            state: SessionState::Active { full_id },
            opening: Opening::Started,
            ..Self::unnamed(store, provider)
        })
    }

    /// Loads an existing record.
    pub fn resume(
        store: &'a SessionStore,
        provider: &'a dyn CompletionProvider,
        full_id: &str,
    ) -> Result<Self, AppError> {
        let messages = store.load(full_id)?;
        Ok(Self {
            state: SessionState::Active {
                full_id: full_id.to_string(),
            },
            messages,
            opening: Opening::Resumed,
            ..Self::unnamed(store, provider)
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn full_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Active { full_id } => Some(full_id),
            SessionState::Terminated { full_id } => full_id.as_deref(),
            SessionState::Unnamed => None,
        }
    }

    pub fn prompt_label(&self) -> PromptLabel {
        PromptLabel {
            session: self
                .full_id()
                .map_or(PENDING_NAME_LABEL, id::display_name)
                .to_string(),
            files: self.attachments.prompt_summary(),
        }
    }

    /// Runs the read-eval loop until exit, end of input, or interrupt.
    ///
    /// Errors from individual lines are reported and the loop continues.
    pub fn run(&mut self, host: &mut dyn ChatHost) -> Outcome<()> {
        self.announce(host);

        loop {
            let label = self.prompt_label();
            let line = match host.read_line(&label) {
                Ok(line) => line,
                Err(error) => {
                    return self.terminate(Outcome::failed(AppError::io("reading input", error)));
                }
            };

            match line {
                ReadOutcome::Line(text) => match self.handle_line(host, &text) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => {
                        host.notify(Tone::Info, "Exiting session.");
                        return self.terminate(Outcome::Ok(()));
                    }
                    Err(error) => {
                        tracing::debug!(error = %error, "chat turn failed");
                        host.notify(Tone::Error, &format!("Error: {error}"));
                    }
                },
                ReadOutcome::Eof => {
                    host.notify(Tone::Info, "Exiting session (EOF detected).");
                    return self.terminate(Outcome::Ok(()));
                }
                ReadOutcome::Interrupted => {
                    host.notify(Tone::Warning, "Exiting session (Interrupt detected).");
                    if self.attachments.clear() > 0 {
                        host.notify(Tone::Warning, "Pending file(s) cleared due to interrupt.");
                    }
                    return self.terminate(Outcome::Cancelled);
                }
            }
        }
    }

    fn terminate(&mut self, outcome: Outcome<()>) -> Outcome<()> {
        self.state = SessionState::Terminated {
            full_id: self.full_id().map(str::to_string),
        };
        outcome
    }

    fn announce(&self, host: &mut dyn ChatHost) {
        match (self.opening, self.full_id()) {
            (Opening::Started, Some(full_id)) => host.notify(
                Tone::Success,
                &format!(
                    "Started new session: {} (ID: {full_id})",
                    id::display_name(full_id)
                ),
            ),
            (Opening::Resumed, Some(full_id)) => {
                let display_name = id::display_name(full_id);
                host.notify(
                    Tone::Info,
                    &format!("Resuming session: {display_name} (ID: {full_id})"),
                );
                if !self.messages.is_empty() {
                    host.show_history(display_name, &self.messages);
                }
            }
            _ => host.notify(
                Tone::Info,
                "Starting new chat. Session will be named after your first message.",
            ),
        }
        host.notify(
            Tone::Muted,
            "Type '/help' for commands, '/exit' or '/quit' to end.",
        );
    }

    fn handle_line(&mut self, host: &mut dyn ChatHost, line: &str) -> Result<LoopControl, AppError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(LoopControl::Continue);
        }
        if let Some(command) = parse_slash_command(trimmed) {
            return self.handle_command(host, command);
        }

        self.submit_message(host, trimmed)?;
        Ok(LoopControl::Continue)
    }

    fn handle_command(
        &mut self,
        host: &mut dyn ChatHost,
        command: SlashCommand,
    ) -> Result<LoopControl, AppError> {
        if command.requires_session() && self.full_id().is_none() {
            host.notify(
                Tone::Warning,
                "Cannot run this command until the session is named.",
            );
            return Ok(LoopControl::Continue);
        }

        match command {
            SlashCommand::Help => show_help(host),
            SlashCommand::Exit => return Ok(LoopControl::Exit),
            SlashCommand::History => self.show_history(host),
            SlashCommand::Clear => self.clear_history(host)?,
            SlashCommand::Rename(None) => {
                host.notify(Tone::Warning, "Please provide a new name: /rename <new_name>");
            }
            SlashCommand::Rename(Some(name)) => self.rename(host, &name),
            SlashCommand::Upload(path) => self.upload(host, path)?,
            SlashCommand::Edit => match host.compose_in_editor() {
                Outcome::Ok(text) if text.is_empty() => {
                    host.notify(Tone::Info, "No content entered. Nothing was sent.");
                }
                Outcome::Ok(text) => self.submit_message(host, &text)?,
                Outcome::Cancelled => host.notify(Tone::Info, "Edit cancelled."),
                Outcome::Failed(error) => return Err(error),
            },
            SlashCommand::Status => self.show_status(host),
            SlashCommand::ClearFiles => match self.attachments.clear() {
                0 => host.notify(Tone::Info, "No files pending for the next prompt."),
                count => host.notify(
                    Tone::Success,
                    &format!("Cleared {count} pending file(s)."),
                ),
            },
            SlashCommand::Unknown(word) => {
                host.notify(Tone::Warning, &format!("Unknown command: {word}"));
                host.notify(Tone::Muted, "Type '/help' for available commands.");
            }
        }
        Ok(LoopControl::Continue)
    }

    /// Sends one user message, naming the session first when needed.
    pub fn submit_message(&mut self, host: &mut dyn ChatHost, text: &str) -> Result<(), AppError> {
        let full_id = match self.full_id() {
            Some(full_id) => full_id.to_string(),
            None => match self.name_session(host, text) {
                Some(full_id) => full_id,
                None => return Ok(()),
            },
        };

        let content = format!("{}{text}", self.attachments.context());
        self.store.append(&full_id, Role::User, content.as_str())?;
        self.messages.push(ChatMessage::user(content));
        self.attachments.clear();

        tracing::debug!(session = %full_id, turns = self.messages.len(), "sending chat turn");
        let reply = self.provider.complete(&self.messages, None)?;
        if reply.trim().is_empty() {
            host.notify(Tone::Warning, "(Empty response received)");
            return Ok(());
        }

        host.show_reply(&reply);
        self.store.append(&full_id, Role::Assistant, reply.as_str())?;
        self.messages.push(ChatMessage::assistant(reply));
        Ok(())
    }

    /// Names and creates the record from the first message. `None` leaves the
    /// session unnamed so the user can try again.
    fn name_session(&mut self, host: &mut dyn ChatHost, first_message: &str) -> Option<String> {
        let created = naming::suggest_name(self.provider, first_message)
            .and_then(|name| self.store.create_named(&name).map_err(AppError::from));

        match created {
            Ok(full_id) => {
                host.notify(
                    Tone::Success,
                    &format!(
                        "Session automatically named: {} (ID: {full_id})",
                        id::display_name(&full_id)
                    ),
                );
                self.state = SessionState::Active {
                    full_id: full_id.clone(),
                };
                Some(full_id)
            }
            Err(error) => {
                tracing::warn!(error = %error, "session naming failed");
                host.notify(Tone::Error, &format!("Error: {error}"));
                host.notify(Tone::Error, "Session naming failed. Please try again.");
                None
            }
        }
    }

    fn show_history(&self, host: &mut dyn ChatHost) {
        if self.messages.is_empty() {
            host.notify(Tone::Info, "Session history is empty.");
            return;
        }
        let display_name = self.full_id().map_or(PENDING_NAME_LABEL, id::display_name);
        host.show_history(display_name, &self.messages);
    }

    fn clear_history(&mut self, host: &mut dyn ChatHost) -> Result<(), AppError> {
        let Some(full_id) = self.full_id().map(str::to_string) else {
            return Ok(());
        };
        let display_name = id::display_name(&full_id);

        let confirmed = host
            .confirm(&format!(
                "Are you sure you want to clear all history for session '{display_name}'? This cannot be undone."
            ))
            .map_err(|error| AppError::io("reading confirmation", error))?;
        if !confirmed {
            host.notify(Tone::Info, "Clear operation cancelled.");
            return Ok(());
        }

        self.store.save(&full_id, &[])?;
        self.messages.clear();
        host.notify(
            Tone::Success,
            &format!("History for session '{display_name}' cleared."),
        );
        Ok(())
    }

    fn rename(&mut self, host: &mut dyn ChatHost, new_name: &str) {
        let Some(old_id) = self.full_id().map(str::to_string) else {
            return;
        };

        match self.store.rename(&old_id, new_name) {
            Ok(RenameOutcome::Moved {
                new_id,
                suffix_regenerated,
            }) => {
                if suffix_regenerated {
                    host.notify(
                        Tone::Warning,
                        "Session ID had no unique suffix; a new ID was generated.",
                    );
                }
                host.notify(
                    Tone::Success,
                    &format!(
                        "Session renamed from '{}' to '{}' (ID: {new_id})",
                        id::display_name(&old_id),
                        id::display_name(&new_id)
                    ),
                );
                self.state = SessionState::Active { full_id: new_id };
            }
            Ok(RenameOutcome::Unchanged) => {
                host.notify(Tone::Info, "Session name unchanged.");
            }
            Err(error) => host.notify(Tone::Error, &format!("Rename failed: {error}")),
        }
    }

    fn upload(&mut self, host: &mut dyn ChatHost, path: Option<String>) -> Result<(), AppError> {
        let path = match path {
            Some(path) => path,
            None => match host.pick_file() {
                Outcome::Ok(path) => path.display().to_string(),
                Outcome::Cancelled => {
                    host.notify(Tone::Info, "File selection cancelled.");
                    return Ok(());
                }
                Outcome::Failed(error) => return Err(error),
            },
        };

        match self.attachments.stage(&path) {
            Ok(file) => {
                if file.content.is_empty() {
                    host.notify(Tone::Warning, &format!("File '{}' is empty.", file.name));
                }
                let message = format!(
                    "Staged '{}' ({:.1} KB) for the next prompt.",
                    file.name,
                    file.size_kb()
                );
                host.notify(Tone::Success, &message);
            }
            Err(error @ AttachmentError::Duplicate { .. }) => {
                host.notify(Tone::Warning, &error.to_string());
            }
            Err(error) => host.notify(Tone::Error, &format!("Upload failed: {error}")),
        }
        Ok(())
    }

    fn show_status(&self, host: &mut dyn ChatHost) {
        let files = self.attachments.files();
        if files.is_empty() {
            host.notify(Tone::Info, "No files pending for the next prompt.");
            return;
        }

        host.notify(Tone::Heading, &format!("Pending files ({}):", files.len()));
        for (index, file) in files.iter().enumerate() {
            host.notify(
                Tone::Plain,
                &format!("  {}. {} ({:.1} KB)", index + 1, file.name, file.size_kb()),
            );
        }
        host.notify(
            Tone::Muted,
            &format!("Total size: {:.1} KB", self.attachments.total_kb()),
        );
    }
}

fn show_help(host: &mut dyn ChatHost) {
    host.notify(Tone::Heading, "Available commands:");
    for (command, description) in HELP_LINES {
        host.notify(Tone::Plain, &format!("  {command:<22} {description}"));
    }
}
