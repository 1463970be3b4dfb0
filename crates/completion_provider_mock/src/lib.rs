//! Deterministic mock implementation of the shared `completion_provider` contract.
//!
//! This crate contains no transport logic and is intended for local
//! development and controller-level integration testing.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use completion_provider::{
    ChatMessage, CompletionError, CompletionProvider, ProviderProfile, Role,
};

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

/// One request observed by [`MockProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
}

#[derive(Debug)]
enum ScriptedReply {
    Text(String),
    Failure(String),
}

#[derive(Debug, Default)]
struct MockState {
    script: VecDeque<ScriptedReply>,
    requests: Vec<RecordedRequest>,
}

/// Deterministic mock provider used by `ai_cli` tests and local runs.
///
/// Scripted replies are consumed in order. Once the script is exhausted the
/// provider echoes the last user message back as Markdown.
#[derive(Debug)]
pub struct MockProvider {
    model_id: String,
    state: Mutex<MockState>,
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            model_id: "mock".to_string(),
            state: Mutex::new(MockState::default()),
        }
    }

    /// Creates a provider that answers with `replies` in order.
    #[must_use]
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        for reply in replies {
            provider.push_reply(reply);
        }
        provider
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        lock_unpoisoned(&self.state)
            .script
            .push_back(ScriptedReply::Text(reply.into()));
    }

    /// Queues a failure for the next call.
    pub fn push_failure(&self, message: impl Into<String>) {
        lock_unpoisoned(&self.state)
            .script
            .push_back(ScriptedReply::Failure(message.into()));
    }

    /// Number of calls that reached the provider with a non-empty history.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock_unpoisoned(&self.state).requests.len()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock_unpoisoned(&self.state).requests.clone()
    }

    fn echo(messages: &[ChatMessage]) -> String {
        let last_user = messages
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
            .map_or("", |message| message.content.as_str());
        format!("**Mock reply** to:\n\n> {}", last_user.trim())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            model_id: self.model_id.clone(),
        }
    }

    fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: Option<f32>,
    ) -> Result<String, CompletionError> {
        if messages.is_empty() {
            return Ok(String::new());
        }

        let mut state = lock_unpoisoned(&self.state);
        state.requests.push(RecordedRequest {
            messages: messages.to_vec(),
            temperature,
        });

        match state.script.pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Failure(message)) => Err(CompletionError::new(message)),
            None => Ok(Self::echo(messages)),
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use completion_provider::{ChatMessage, CompletionProvider};

    use super::{MockProvider, RecordedRequest, MOCK_PROVIDER_ID};

    #[test]
    fn scripted_replies_are_consumed_in_order() {
        let provider = MockProvider::with_replies(["first", "second"]);
        let history = [ChatMessage::user("hi")];

        assert_eq!(provider.complete(&history, None).expect("reply"), "first");
        assert_eq!(provider.complete(&history, None).expect("reply"), "second");
        assert_eq!(provider.call_count(), 2);
    }

    #[test]
    fn empty_history_short_circuits_without_recording() {
        let provider = MockProvider::with_replies(["unused"]);

        assert_eq!(provider.complete(&[], Some(0.1)).expect("reply"), "");
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn failures_surface_as_completion_errors() {
        let provider = MockProvider::new();
        provider.push_failure("service unavailable");

        let error = provider
            .complete(&[ChatMessage::user("hi")], None)
            .expect_err("scripted failure should surface");
        assert_eq!(error.message(), "service unavailable");
    }

    #[test]
    fn exhausted_script_echoes_last_user_message() {
        let provider = MockProvider::new();
        let reply = provider
            .complete(
                &[
                    ChatMessage::user("older"),
                    ChatMessage::assistant("ok"),
                    ChatMessage::user("  latest  "),
                ],
                Some(0.3),
            )
            .expect("reply");

        assert_eq!(reply, "**Mock reply** to:\n\n> latest");
        assert_eq!(
            provider.requests().last(),
            Some(&RecordedRequest {
                messages: vec![
                    ChatMessage::user("older"),
                    ChatMessage::assistant("ok"),
                    ChatMessage::user("  latest  "),
                ],
                temperature: Some(0.3),
            })
        );
        assert_eq!(provider.profile().provider_id, MOCK_PROVIDER_ID);
    }
}
