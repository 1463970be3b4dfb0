use std::path::Path;

pub const SESSION_FILE_EXTENSION: &str = "json";

#[must_use]
pub fn session_file_name(full_id: &str) -> String {
    format!("{full_id}.{SESSION_FILE_EXTENSION}")
}

/// Returns the full id encoded in a session file name, if `path` names one.
pub(crate) fn full_id_from_path(path: &Path) -> Option<&str> {
    let extension = path.extension()?.to_str()?;
    if extension != SESSION_FILE_EXTENSION {
        return None;
    }

    path.file_stem()?.to_str().filter(|stem| !stem.is_empty())
}

/// Rejects ids that would escape the session directory or name no file.
pub(crate) fn is_valid_full_id(full_id: &str) -> bool {
    !full_id.is_empty()
        && full_id != "."
        && full_id != ".."
        && !full_id.contains(['/', '\\', '\0'])
}
