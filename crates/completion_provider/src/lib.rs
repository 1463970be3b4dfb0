//! Minimal provider-agnostic contract for a single chat completion.
//!
//! This crate defines only the message shape shared by the session store and
//! the providers, the completion error, and the provider trait. It excludes
//! transport details and protocol payloads.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Originator of one turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One role-tagged message in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Error returned while constructing/configuring a provider before any request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderInitError {
    /// A required setting was empty or malformed.
    #[error("invalid provider argument: {0}")]
    InvalidArgument(String),

    /// The provider could not prepare its runtime or transport.
    #[error("{0}")]
    Setup(String),
}

impl ProviderInitError {
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    #[must_use]
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup(message.into())
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(message) | Self::Setup(message) => message,
        }
    }
}

/// Failure of one remote completion call, carrying the original cause when known.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CompletionError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl CompletionError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Immutable metadata describing a completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub model_id: String,
}

/// Provider interface for one blocking completion request.
pub trait CompletionProvider: Send + Sync {
    /// Returns provider/model identity metadata.
    fn profile(&self) -> ProviderProfile;

    /// Sends `messages` in order and returns the generated text.
    ///
    /// Implementations return an empty string without contacting the remote
    /// endpoint when `messages` is empty, and normalize an absent reply to an
    /// empty string. `temperature` falls back to the provider default.
    fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: Option<f32>,
    ) -> Result<String, CompletionError>;
}

impl<P: CompletionProvider + ?Sized> CompletionProvider for Box<P> {
    fn profile(&self) -> ProviderProfile {
        (**self).profile()
    }

    fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: Option<f32>,
    ) -> Result<String, CompletionError> {
        (**self).complete(messages, temperature)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use serde_json::json;

    use super::{ChatMessage, CompletionError, ProviderInitError, Role};

    #[test]
    fn chat_message_serializes_with_lowercase_role() {
        let value = serde_json::to_value(ChatMessage::assistant("hi"))
            .expect("message should serialize");
        assert_eq!(value, json!({"role": "assistant", "content": "hi"}));
    }

    #[test]
    fn chat_message_rejects_unknown_roles_and_fields() {
        let bad_role = serde_json::from_value::<ChatMessage>(json!({
            "role": "system",
            "content": "x"
        }));
        assert!(bad_role.is_err());

        let extra_field = serde_json::from_value::<ChatMessage>(json!({
            "role": "user",
            "content": "x",
            "name": "bob"
        }));
        assert!(extra_field.is_err());
    }

    #[test]
    fn role_display_matches_wire_name() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn provider_init_error_preserves_message() {
        let error = ProviderInitError::invalid_argument("api key must not be empty");
        assert_eq!(error.message(), "api key must not be empty");
        assert_eq!(
            error.to_string(),
            "invalid provider argument: api key must not be empty"
        );
    }

    #[test]
    fn completion_error_keeps_original_cause() {
        let cause = io::Error::new(io::ErrorKind::TimedOut, "deadline elapsed");
        let error = CompletionError::with_source("request failed", cause);

        assert_eq!(error.to_string(), "request failed");
        let source = error.source().expect("cause should be attached");
        assert_eq!(source.to_string(), "deadline elapsed");
        assert!(CompletionError::new("plain").source().is_none());
    }
}
