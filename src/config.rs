//! Environment configuration.

use std::env;

pub const NO_COLOR_ENV_VAR: &str = "NO_COLOR";
pub const PLAIN_ENV_VAR: &str = "AI_CLI_PLAIN";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Any non-empty `NO_COLOR` disables styling.
    pub no_color: bool,
    /// `AI_CLI_PLAIN=1` prints replies verbatim instead of rendering Markdown.
    pub plain_replies: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            no_color: env_string_opt(NO_COLOR_ENV_VAR).is_some(),
            plain_replies: env_flag(PLAIN_ENV_VAR),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
