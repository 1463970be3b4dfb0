use std::io;

use completion_provider::{CompletionError, ProviderInitError};
use session_store::SessionStoreError;
use thiserror::Error;

use crate::config::ConfigError;

/// Error taxonomy surfaced to the user at the command or chat-loop boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    /// Storage I/O or encoding failure.
    #[error(transparent)]
    Store(SessionStoreError),

    #[error(transparent)]
    CorruptData(SessionStoreError),

    #[error("AI error: {0}")]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl AppError {
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    #[must_use]
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

impl From<SessionStoreError> for AppError {
    fn from(error: SessionStoreError) -> Self {
        match error {
            SessionStoreError::InvalidArgument(message) => Self::InvalidArgument(message),
            SessionStoreError::NotFound { .. } => Self::NotFound(error.to_string()),
            SessionStoreError::AlreadyExists { .. } => Self::AlreadyExists(error.to_string()),
            SessionStoreError::CorruptData { .. } => Self::CorruptData(error),
            SessionStoreError::Io { .. } | SessionStoreError::JsonSerialize { .. } => {
                Self::Store(error)
            }
        }
    }
}

impl From<ProviderInitError> for AppError {
    fn from(error: ProviderInitError) -> Self {
        match error {
            ProviderInitError::InvalidArgument(_) => Self::InvalidArgument(error.to_string()),
            ProviderInitError::Setup(message) => {
                Self::io("initializing completion provider", io::Error::other(message))
            }
        }
    }
}

impl From<dialoguer::Error> for AppError {
    fn from(error: dialoguer::Error) -> Self {
        match error {
            dialoguer::Error::IO(source) => Self::io("terminal prompt failed", source),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use completion_provider::ProviderInitError;
    use session_store::SessionStoreError;

    use super::AppError;

    #[test]
    fn store_errors_keep_their_kind() {
        assert!(matches!(
            AppError::from(SessionStoreError::not_found("a_0a1b2c3d")),
            AppError::NotFound(ref message) if message == "session 'a_0a1b2c3d' not found"
        ));
        assert!(matches!(
            AppError::from(SessionStoreError::already_exists("a_0a1b2c3d")),
            AppError::AlreadyExists(_)
        ));
        assert!(matches!(
            AppError::from(SessionStoreError::InvalidArgument("empty".into())),
            AppError::InvalidArgument(ref message) if message == "empty"
        ));
        assert!(matches!(
            AppError::from(SessionStoreError::corrupt("/tmp/x.json", "bad")),
            AppError::CorruptData(_)
        ));
        assert!(matches!(
            AppError::from(SessionStoreError::io(
                "reading session file",
                "/tmp/x.json",
                io::Error::from(io::ErrorKind::PermissionDenied),
            )),
            AppError::Store(_)
        ));
    }

    #[test]
    fn provider_argument_errors_are_invalid_arguments() {
        let error = AppError::from(ProviderInitError::invalid_argument("model must not be empty"));
        assert_eq!(
            error.to_string(),
            "invalid provider argument: model must not be empty"
        );
    }
}
