//! File-backed chat session persistence.
//!
//! One JSON file per session lives under a single directory, named
//! `<full_id>.json`. A full id is a sanitized display name joined to an
//! 8-character hex suffix (see [`id`]).

pub mod id;
mod error;
mod paths;
mod store;

pub use error::SessionStoreError;
pub use paths::{session_file_name, SESSION_FILE_EXTENSION};
pub use store::{RenameOutcome, SessionStore, SessionSummary};
