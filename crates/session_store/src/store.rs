use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use completion_provider::{ChatMessage, Role};
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::SessionStoreError;
use crate::id;
use crate::paths::{full_id_from_path, is_valid_full_id, session_file_name};

/// One listed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub display_name: String,
    pub full_id: String,
}

/// Result of a successful [`SessionStore::rename`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The record now lives at `new_id`.
    Moved {
        new_id: String,
        /// True when the old id had no suffix and a fresh one was drawn.
        suffix_regenerated: bool,
    },
    /// The requested name resolves to the current id; nothing was touched.
    Unchanged,
}

/// Directory of one-file-per-session message logs.
///
/// The store does no locking: one process is expected to touch a given id at
/// a time.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    /// Opens the store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SessionStoreError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|source| SessionStoreError::io("creating session directory", &root, source))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file path for `full_id`, rejecting ids that are not plain file stems.
    pub fn path_for(&self, full_id: &str) -> Result<PathBuf, SessionStoreError> {
        if !is_valid_full_id(full_id) {
            return Err(SessionStoreError::InvalidArgument(format!(
                "invalid session id '{full_id}'"
            )));
        }
        Ok(self.root.join(session_file_name(full_id)))
    }

    #[must_use]
    pub fn exists(&self, full_id: &str) -> bool {
        self.path_for(full_id)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Creates an empty record. Fails if one is already present.
    pub fn create(&self, full_id: &str) -> Result<(), SessionStoreError> {
        let path = self.path_for(full_id)?;
        let staged = self.stage(&path, &[])?;
        staged.persist_noclobber(&path).map_err(|error| {
            if error.error.kind() == ErrorKind::AlreadyExists {
                SessionStoreError::already_exists(full_id)
            } else {
                SessionStoreError::io("creating session file", &path, error.error)
            }
        })?;
        tracing::debug!(session = full_id, "created session");
        Ok(())
    }

    /// Generates a fresh full id for `display_name` and creates its empty record.
    pub fn create_named(&self, display_name: &str) -> Result<String, SessionStoreError> {
        let full_id = id::generate(display_name, |candidate| self.exists(candidate));
        self.create(&full_id)?;
        Ok(full_id)
    }

    pub fn load(&self, full_id: &str) -> Result<Vec<ChatMessage>, SessionStoreError> {
        let path = self.path_for(full_id)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                return Err(SessionStoreError::not_found(full_id));
            }
            Err(source) => {
                return Err(SessionStoreError::io("reading session file", &path, source));
            }
        };

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|source| SessionStoreError::corrupt(&path, source.to_string()))?;
        if !value.is_array() {
            return Err(SessionStoreError::corrupt(
                &path,
                "expected a JSON array of messages",
            ));
        }

        serde_json::from_value(value)
            .map_err(|source| SessionStoreError::corrupt(&path, source.to_string()))
    }

    /// Replaces the whole record with `messages`.
    ///
    /// The new content is written to a temporary file in the same directory
    /// and moved over the old one, so readers see either version in full.
    pub fn save(&self, full_id: &str, messages: &[ChatMessage]) -> Result<(), SessionStoreError> {
        let path = self.path_for(full_id)?;
        let staged = self.stage(&path, messages)?;
        staged
            .persist(&path)
            .map_err(|error| SessionStoreError::io("replacing session file", &path, error.error))?;
        tracing::debug!(session = full_id, messages = messages.len(), "saved session");
        Ok(())
    }

    pub fn append(
        &self,
        full_id: &str,
        role: Role,
        content: impl Into<String>,
    ) -> Result<(), SessionStoreError> {
        let mut messages = self.load(full_id)?;
        messages.push(ChatMessage::new(role, content));
        self.save(full_id, &messages)
    }

    /// Moves a record to a new display name, keeping its suffix.
    ///
    /// When `old_id` carries no suffix a wholly new id is generated instead.
    pub fn rename(
        &self,
        old_id: &str,
        new_display_name: &str,
    ) -> Result<RenameOutcome, SessionStoreError> {
        let old_path = self.path_for(old_id)?;
        if !old_path.is_file() {
            return Err(SessionStoreError::not_found(old_id));
        }

        if new_display_name.trim().is_empty() {
            return Err(SessionStoreError::InvalidArgument(format!(
                "session name '{new_display_name}' is empty"
            )));
        }
        let sanitized = id::normalize(new_display_name);
        if sanitized.is_empty() {
            return Err(SessionStoreError::InvalidArgument(format!(
                "session name '{new_display_name}' is empty after sanitization"
            )));
        }

        let (_, suffix) = id::split(old_id);
        let (new_id, suffix_regenerated) = match suffix {
            Some(suffix) => (id::join(&sanitized, suffix), false),
            None => {
                tracing::warn!(
                    session = old_id,
                    "session id has no suffix; generating a new id"
                );
                (
                    id::generate(&sanitized, |candidate| self.exists(candidate)),
                    true,
                )
            }
        };

        if new_id == old_id {
            return Ok(RenameOutcome::Unchanged);
        }

        let new_path = self.path_for(&new_id)?;
        if new_path.exists() {
            return Err(SessionStoreError::already_exists(new_id));
        }

        fs::rename(&old_path, &new_path)
            .map_err(|source| SessionStoreError::io("renaming session file", &old_path, source))?;
        tracing::debug!(from = old_id, to = %new_id, "renamed session");

        Ok(RenameOutcome::Moved {
            new_id,
            suffix_regenerated,
        })
    }

    pub fn delete(&self, full_id: &str) -> Result<(), SessionStoreError> {
        let path = self.path_for(full_id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(session = full_id, "deleted session");
                Ok(())
            }
            Err(source) if source.kind() == ErrorKind::NotFound => {
                Err(SessionStoreError::not_found(full_id))
            }
            Err(source) => Err(SessionStoreError::io("deleting session file", &path, source)),
        }
    }

    /// Lists every stored session sorted by display name, then full id.
    pub fn list(&self) -> Result<Vec<SessionSummary>, SessionStoreError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|source| SessionStoreError::io("listing sessions", &self.root, source))?;

        let mut sessions = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|source| SessionStoreError::io("listing sessions", &self.root, source))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(full_id) = full_id_from_path(&path) else {
                continue;
            };

            sessions.push(SessionSummary {
                display_name: id::display_name(full_id).to_string(),
                full_id: full_id.to_string(),
            });
        }

        sessions.sort_by(|left, right| {
            left.display_name
                .cmp(&right.display_name)
                .then_with(|| left.full_id.cmp(&right.full_id))
        });
        Ok(sessions)
    }

    fn stage(
        &self,
        path: &Path,
        messages: &[ChatMessage],
    ) -> Result<NamedTempFile, SessionStoreError> {
        let encoded = serde_json::to_vec_pretty(messages)
            .map_err(|source| SessionStoreError::json_serialize(path, source))?;

        let mut staged = NamedTempFile::new_in(&self.root)
            .map_err(|source| SessionStoreError::io("staging session file", &self.root, source))?;
        staged
            .write_all(&encoded)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|source| {
                SessionStoreError::io("writing staged session file", staged.path(), source)
            })?;
        Ok(staged)
    }
}
