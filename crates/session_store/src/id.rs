//! Session identifier codec.
//!
//! A full session id is `<display_name>_<suffix>` where the suffix is eight
//! lowercase hex characters taken from a random v4 UUID. Ids without such a
//! trailing suffix are still accepted and treated as a bare display name.

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

/// Length of the random disambiguating suffix.
pub const SUFFIX_LEN: usize = 8;

/// Fallback display name used when a name sanitizes to nothing.
pub const DEFAULT_SESSION_NAME: &str = "session";

fn suffix_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"_([0-9a-f]{8})$").expect("suffix regex must compile"))
}

fn whitespace_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex must compile"))
}

fn disallowed_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"[^\w\-]+").expect("filter regex must compile"))
}

/// Lowercases, joins whitespace runs with `-`, and strips everything except
/// word characters and hyphens. May return an empty string.
#[must_use]
pub fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let hyphenated = whitespace_regex().replace_all(&lowered, "-");
    disallowed_regex().replace_all(&hyphenated, "").into_owned()
}

/// Normalizes `name`, falling back to `fallback` when nothing survives.
#[must_use]
pub fn sanitize_or(name: &str, fallback: &str) -> String {
    let normalized = normalize(name);
    if normalized.is_empty() {
        fallback.to_string()
    } else {
        normalized
    }
}

/// Normalizes `name` into a non-empty storage key component.
#[must_use]
pub fn sanitize(name: &str) -> String {
    sanitize_or(name, DEFAULT_SESSION_NAME)
}

/// Splits a full id into its display name and suffix.
///
/// Returns `(full_id, None)` when no trailing `_` + 8 hex suffix is present.
#[must_use]
pub fn split(full_id: &str) -> (&str, Option<&str>) {
    match suffix_regex().captures(full_id) {
        Some(captures) => {
            let whole = captures.get(0).map_or(full_id.len(), |m| m.start());
            let suffix = captures.get(1).map(|m| m.as_str());
            (&full_id[..whole], suffix)
        }
        None => (full_id, None),
    }
}

/// Returns the display name portion of a full id.
#[must_use]
pub fn display_name(full_id: &str) -> &str {
    split(full_id).0
}

/// Joins an already sanitized display name and suffix.
#[must_use]
pub fn join(display_name: &str, suffix: &str) -> String {
    format!("{display_name}_{suffix}")
}

/// Draws a fresh random suffix.
#[must_use]
pub fn random_suffix() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(SUFFIX_LEN);
    token
}

/// Builds a full id for `display_name` that `exists` reports as unused.
///
/// Draws new suffixes until the predicate returns false for the candidate.
pub fn generate(display_name: &str, mut exists: impl FnMut(&str) -> bool) -> String {
    let sanitized = sanitize(display_name);
    loop {
        let candidate = join(&sanitized, &random_suffix());
        if !exists(&candidate) {
            return candidate;
        }
        tracing::debug!(candidate = %candidate, "session id collision; drawing a new suffix");
    }
}

#[cfg(test)]
mod tests {
    use super::{
        display_name, generate, join, normalize, random_suffix, sanitize, sanitize_or, split,
        SUFFIX_LEN,
    };

    #[test]
    fn sanitize_lowercases_and_hyphenates_whitespace() {
        assert_eq!(sanitize("Stock Analysis"), "stock-analysis");
        assert_eq!(sanitize("  Rust \t async\n notes "), "-rust-async-notes-");
        assert_eq!(sanitize("what's up?"), "whats-up");
        assert_eq!(sanitize("keep_under-score"), "keep_under-score");
    }

    #[test]
    fn sanitize_falls_back_when_nothing_survives() {
        assert_eq!(sanitize(""), "session");
        assert_eq!(sanitize("?!.*"), "session");
        assert_eq!(sanitize_or("///", "chat"), "chat");
        assert_eq!(normalize("///"), "");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for input in [
            "Stock Analysis",
            "  spaced   out  ",
            "ÜBER Größe",
            "tabs\tand\nnewlines",
            "mixed_CASE-name 42",
            "",
            "!!!",
        ] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn split_recovers_trailing_suffix() {
        assert_eq!(
            split("stock-analysis_0a1b2c3d"),
            ("stock-analysis", Some("0a1b2c3d"))
        );
        assert_eq!(split("a_b_c_deadbeef"), ("a_b_c", Some("deadbeef")));
    }

    #[test]
    fn split_treats_unsuffixed_ids_as_bare_names() {
        assert_eq!(split("legacy"), ("legacy", None));
        assert_eq!(split("upper_DEADBEEF"), ("upper_DEADBEEF", None));
        assert_eq!(split("short_abc123"), ("short_abc123", None));
        assert_eq!(split("no-underscore0a1b2c3d"), ("no-underscore0a1b2c3d", None));
        assert_eq!(split(""), ("", None));
    }

    #[test]
    fn split_requires_exactly_eight_hex_chars_after_separator() {
        assert_eq!(split("name_0a1b2c3d4"), ("name_0a1b2c3d4", None));
        assert_eq!(split("name_x_0a1b2c3d"), ("name_x", Some("0a1b2c3d")));
    }

    #[test]
    fn display_name_drops_suffix() {
        assert_eq!(display_name("notes_ffffffff"), "notes");
        assert_eq!(display_name("notes"), "notes");
    }

    #[test]
    fn random_suffix_is_lowercase_hex() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn generate_round_trips_through_split() {
        for name in ["Stock Analysis", "", "Résumé draft", "already-clean"] {
            let full_id = generate(name, |_| false);
            let (display, suffix) = split(&full_id);
            assert_eq!(display, sanitize(name));
            assert_eq!(suffix.map(str::len), Some(SUFFIX_LEN));
        }
    }

    #[test]
    fn generate_retries_until_predicate_reports_unused() {
        let mut rejected = Vec::new();
        let full_id = generate("notes", |candidate| {
            if rejected.len() < 3 {
                rejected.push(candidate.to_string());
                true
            } else {
                false
            }
        });

        assert_eq!(rejected.len(), 3);
        assert!(!rejected.contains(&full_id));
        assert!(full_id.starts_with("notes_"));
    }

    #[test]
    fn join_inserts_separator() {
        assert_eq!(join("notes", "0a1b2c3d"), "notes_0a1b2c3d");
    }
}
