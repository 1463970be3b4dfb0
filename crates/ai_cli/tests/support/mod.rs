#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;

use ai_cli::controller::{ChatHost, PromptLabel};
use ai_cli::prompter::Prompter;
use ai_cli::{AppError, Outcome};
use chat_term::{ReadOutcome, Tone};
use completion_provider::ChatMessage;
use session_store::SessionStore;

pub fn temp_store() -> (tempfile::TempDir, SessionStore) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = SessionStore::open(dir.path().join("chat_sessions")).expect("store should open");
    (dir, store)
}

/// Scripted chat host that records everything shown to the user.
#[derive(Default)]
pub struct HostSpy {
    pub inputs: VecDeque<ReadOutcome>,
    pub confirmations: VecDeque<bool>,
    pub edits: VecDeque<Outcome<String>>,
    pub picks: VecDeque<Outcome<PathBuf>>,
    pub labels: Vec<PromptLabel>,
    pub notices: Vec<(Tone, String)>,
    pub replies: Vec<String>,
    pub histories: Vec<(String, Vec<ChatMessage>)>,
}

impl HostSpy {
    pub fn with_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut host = Self::default();
        for line in lines {
            host.inputs.push_back(ReadOutcome::Line(line.to_string()));
        }
        host
    }

    pub fn then(mut self, input: ReadOutcome) -> Self {
        self.inputs.push_back(input);
        self
    }

    pub fn saw(&self, message: &str) -> bool {
        self.notices.iter().any(|(_, notice)| notice == message)
    }

    pub fn saw_containing(&self, fragment: &str) -> bool {
        self.notices.iter().any(|(_, notice)| notice.contains(fragment))
    }

    pub fn count(&self, message: &str) -> usize {
        self.notices
            .iter()
            .filter(|(_, notice)| notice == message)
            .count()
    }
}

impl ChatHost for HostSpy {
    fn read_line(&mut self, label: &PromptLabel) -> io::Result<ReadOutcome> {
        self.labels.push(label.clone());
        Ok(self.inputs.pop_front().unwrap_or(ReadOutcome::Eof))
    }

    fn confirm(&mut self, _question: &str) -> io::Result<bool> {
        Ok(self.confirmations.pop_front().unwrap_or(false))
    }

    fn notify(&mut self, tone: Tone, message: &str) {
        self.notices.push((tone, message.to_string()));
    }

    fn show_reply(&mut self, text: &str) {
        self.replies.push(text.to_string());
    }

    fn show_history(&mut self, display_name: &str, messages: &[ChatMessage]) {
        self.histories
            .push((display_name.to_string(), messages.to_vec()));
    }

    fn compose_in_editor(&mut self) -> Outcome<String> {
        self.edits.pop_front().unwrap_or(Outcome::Cancelled)
    }

    fn pick_file(&mut self) -> Outcome<PathBuf> {
        self.picks.pop_front().unwrap_or(Outcome::Cancelled)
    }
}

/// Prompter that answers from queues and fails on unexpected questions.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub selections: VecDeque<Option<usize>>,
    pub multi_selections: VecDeque<Option<Vec<usize>>>,
    pub confirmations: VecDeque<bool>,
    pub secrets: VecDeque<String>,
    pub asked: Vec<String>,
}

fn unexpected(prompt: &str) -> AppError {
    AppError::invalid_argument(format!("unexpected prompt: {prompt}"))
}

impl Prompter for ScriptedPrompter {
    fn select(
        &mut self,
        prompt: &str,
        _items: &[String],
        _default: usize,
    ) -> Result<Option<usize>, AppError> {
        self.asked.push(prompt.to_string());
        self.selections.pop_front().ok_or_else(|| unexpected(prompt))
    }

    fn multi_select(
        &mut self,
        prompt: &str,
        _items: &[String],
    ) -> Result<Option<Vec<usize>>, AppError> {
        self.asked.push(prompt.to_string());
        self.multi_selections
            .pop_front()
            .ok_or_else(|| unexpected(prompt))
    }

    fn confirm(&mut self, prompt: &str, _default: bool) -> Result<bool, AppError> {
        self.asked.push(prompt.to_string());
        self.confirmations.pop_front().ok_or_else(|| unexpected(prompt))
    }

    fn secret(&mut self, prompt: &str) -> Result<String, AppError> {
        self.asked.push(prompt.to_string());
        self.secrets.pop_front().ok_or_else(|| unexpected(prompt))
    }
}
