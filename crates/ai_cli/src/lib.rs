//! `ai-cli`: a terminal chat client with named, resumable sessions.
//!
//! ## Layout on disk
//!
//! Everything lives under one data directory (`--home`, `AI_CLI_HOME`, or
//! `~/.ai-cli`):
//!
//! - `config/config.json` holds the API key and model:
//!
//! ```json
//! {
//!   "openai_api_key": "sk-...",
//!   "model": "gpt-4o",
//!   "base_url": "https://api.openai.com/v1",
//!   "timeout_sec": 120
//! }
//! ```
//!
//!   `base_url` and `timeout_sec` are optional; unknown fields are rejected.
//! - `chat_sessions/<name>_<suffix>.json` holds one session each.
//!
//! ## Provider selection
//!
//! `AI_CLI_PROVIDER=openai` (default) uses the stored configuration.
//! `AI_CLI_PROVIDER=mock` answers locally without network access.

pub mod attachments;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod external;
pub mod naming;
pub mod outcome;
pub mod paths;
pub mod prompt;
pub mod prompter;
pub mod providers;
pub mod repl;
pub mod session_cmd;
pub mod setup;

pub use error::AppError;
pub use outcome::Outcome;
