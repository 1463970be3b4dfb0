//! Transport-only client for the OpenAI chat completions endpoint.
//!
//! This crate owns request building, header assembly, and response/error
//! parsing for a single non-streaming completion call. It contains no
//! configuration-file handling and no terminal coupling. Failed calls are
//! never retried here.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod url;

pub use client::OpenAiApiClient;
pub use config::OpenAiApiConfig;
pub use error::OpenAiApiError;
pub use payload::{ChatCompletionMessage, ChatCompletionRequest, ChatCompletionResponse};
pub use url::normalize_chat_completions_url;
