//! Title generation for unnamed sessions.

use completion_provider::{ChatMessage, CompletionProvider};
use session_store::id;

use crate::error::AppError;

pub const NAMING_TEMPERATURE: f32 = 0.3;
pub const FALLBACK_NAME: &str = "chat";
const MAX_TITLE_WORDS: usize = 4;

pub fn naming_request(first_message: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "Based on the following user message, generate a concise, 2-4 word title \
         suitable for a filename (use lowercase words, separated by hyphens). \
         Example: 'analyze-stock-data'. Do not include any explanation, just the title.\
         \n\nUser Message: \"{first_message}\""
    ))]
}

/// Turns a model reply into a session name of at most four words.
pub fn slug_from_reply(reply: &str) -> String {
    let unquoted = reply
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '`'))
        .trim();
    let normalized = id::normalize(unquoted);
    let slug = normalized
        .split('-')
        .filter(|word| !word.is_empty())
        .take(MAX_TITLE_WORDS)
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        slug
    }
}

/// Asks the provider for a title for a session opened with `first_message`.
pub fn suggest_name(
    provider: &dyn CompletionProvider,
    first_message: &str,
) -> Result<String, AppError> {
    let reply = provider.complete(&naming_request(first_message), Some(NAMING_TEMPERATURE))?;
    let slug = slug_from_reply(&reply);
    tracing::debug!(slug = %slug, "generated session name");
    Ok(slug)
}
