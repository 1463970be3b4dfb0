//! `ai-cli session new|resume|list|delete`.

use chat_term::{Output, Tone};
use completion_provider::CompletionProvider;
use session_store::{SessionStore, SessionSummary};

use crate::controller::{ChatController, ChatHost};
use crate::error::AppError;
use crate::outcome::Outcome;
use crate::prompter::Prompter;

pub fn run_new(
    store: &SessionStore,
    provider: &dyn CompletionProvider,
    host: &mut dyn ChatHost,
    name: Option<&str>,
) -> Outcome<()> {
    let name = name.map(str::trim).filter(|name| !name.is_empty());
    let mut controller = match name {
        Some(name) => match ChatController::named(store, provider, name) {
            Ok(controller) => controller,
            Err(error) => return Outcome::Failed(error),
        },
        None => ChatController::unnamed(store, provider),
    };
    controller.run(host)
}

pub fn run_resume(
    store: &SessionStore,
    provider: &dyn CompletionProvider,
    host: &mut dyn ChatHost,
    prompter: &mut dyn Prompter,
    output: &Output,
    session_id: Option<&str>,
) -> Outcome<()> {
    let full_id = match session_id {
        Some(full_id) => full_id.to_string(),
        None => match choose_session(store, prompter, output) {
            Outcome::Ok(full_id) => full_id,
            Outcome::Cancelled => return Outcome::Cancelled,
            Outcome::Failed(error) => return Outcome::Failed(error),
        },
    };

    let mut controller = match ChatController::resume(store, provider, &full_id) {
        Ok(controller) => controller,
        Err(error) => return Outcome::Failed(error),
    };
    controller.run(host)
}

fn choose_session(
    store: &SessionStore,
    prompter: &mut dyn Prompter,
    output: &Output,
) -> Outcome<String> {
    let sessions = match store.list() {
        Ok(sessions) => sessions,
        Err(error) => return Outcome::failed(error),
    };
    if sessions.is_empty() {
        output.line(Tone::Info, "No saved sessions found.");
        return Outcome::Cancelled;
    }

    let items = choice_labels(&sessions);
    match prompter.select("Choose a session to resume", &items, 0) {
        Ok(Some(index)) => match sessions.into_iter().nth(index) {
            Some(session) => Outcome::Ok(session.full_id),
            None => Outcome::Cancelled,
        },
        Ok(None) => {
            output.line(Tone::Info, "Resume cancelled.");
            Outcome::Cancelled
        }
        Err(error) => Outcome::Failed(error),
    }
}

pub fn choice_labels(sessions: &[SessionSummary]) -> Vec<String> {
    sessions
        .iter()
        .map(|session| format!("{} ({})", session.display_name, session.full_id))
        .collect()
}

pub fn run_list(store: &SessionStore, output: &Output) -> Outcome<()> {
    let sessions = match store.list() {
        Ok(sessions) => sessions,
        Err(error) => return Outcome::failed(error),
    };
    if sessions.is_empty() {
        output.line(Tone::Info, "No saved sessions.");
        return Outcome::Ok(());
    }

    output.line(Tone::Heading, &format!("Saved sessions ({}):", sessions.len()));
    for session in &sessions {
        output.line(
            Tone::Plain,
            &format!(
                "  {} {}",
                session.display_name,
                output.paint(Tone::Muted, &format!("({})", session.full_id))
            ),
        );
    }
    Outcome::Ok(())
}

/// Per-session results of a delete run.
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, AppError)>,
}

/// Deletes every id in order, continuing past failures.
pub fn delete_sessions(store: &SessionStore, full_ids: &[String]) -> DeleteReport {
    let mut report = DeleteReport::default();
    for full_id in full_ids {
        match store.delete(full_id) {
            Ok(()) => report.deleted.push(full_id.clone()),
            Err(error) => report.failed.push((full_id.clone(), error.into())),
        }
    }
    report
}

pub fn run_delete(
    store: &SessionStore,
    prompter: &mut dyn Prompter,
    output: &Output,
    session_ids: &[String],
    skip_confirmation: bool,
) -> Outcome<()> {
    let full_ids = if session_ids.is_empty() {
        match choose_for_deletion(store, prompter, output) {
            Outcome::Ok(full_ids) => full_ids,
            Outcome::Cancelled => return Outcome::Cancelled,
            Outcome::Failed(error) => return Outcome::Failed(error),
        }
    } else {
        session_ids.to_vec()
    };

    if !skip_confirmation {
        let names: Vec<&str> = full_ids
            .iter()
            .map(|full_id| session_store::id::display_name(full_id))
            .collect();
        let question = format!(
            "Permanently delete {} session(s): {}?",
            full_ids.len(),
            names.join(", ")
        );
        match prompter.confirm(&question, false) {
            Ok(true) => {}
            Ok(false) => {
                output.line(Tone::Info, "Deletion cancelled.");
                return Outcome::Cancelled;
            }
            Err(error) => return Outcome::Failed(error),
        }
    }

    let report = delete_sessions(store, &full_ids);
    for full_id in &report.deleted {
        output.line(Tone::Success, &format!("Deleted session: {full_id}"));
    }
    if report.failed.is_empty() {
        output.line(
            Tone::Info,
            &format!("Deleted {} session(s).", report.deleted.len()),
        );
        return Outcome::Ok(());
    }

    output.notice(
        Tone::Error,
        &format!(
            "Deleted {} session(s); failed to delete {}:",
            report.deleted.len(),
            report.failed.len()
        ),
    );
    for (full_id, error) in &report.failed {
        output.notice(Tone::Error, &format!("  - {full_id}: {error}"));
    }
    let count = report.failed.len();
    Outcome::Failed(AppError::invalid_argument(format!(
        "{count} session(s) could not be deleted"
    )))
}

fn choose_for_deletion(
    store: &SessionStore,
    prompter: &mut dyn Prompter,
    output: &Output,
) -> Outcome<Vec<String>> {
    let sessions = match store.list() {
        Ok(sessions) => sessions,
        Err(error) => return Outcome::failed(error),
    };
    if sessions.is_empty() {
        output.line(Tone::Info, "No saved sessions to delete.");
        return Outcome::Cancelled;
    }

    let items = choice_labels(&sessions);
    match prompter.multi_select("Select sessions to delete (space to toggle)", &items) {
        Ok(Some(indices)) if !indices.is_empty() => Outcome::Ok(
            indices
                .into_iter()
                .filter_map(|index| sessions.get(index))
                .map(|session| session.full_id.clone())
                .collect(),
        ),
        Ok(_) => {
            output.line(Tone::Info, "No sessions selected.");
            Outcome::Cancelled
        }
        Err(error) => Outcome::Failed(error),
    }
}
