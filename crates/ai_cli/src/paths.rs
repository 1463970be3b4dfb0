//! On-disk layout, resolved once at startup.

use std::path::{Path, PathBuf};

use crate::error::AppError;

pub const HOME_ENV_VAR: &str = "AI_CLI_HOME";
pub const DEFAULT_DIR_NAME: &str = ".ai-cli";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub session_dir: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_file: root.join("config").join("config.json"),
            session_dir: root.join("chat_sessions"),
            root,
        }
    }

    /// Uses `home_override` when given, else `~/.ai-cli`.
    pub fn resolve(home_override: Option<&Path>) -> Result<Self, AppError> {
        if let Some(root) = home_override {
            return Ok(Self::from_root(root));
        }
        dirs::home_dir()
            .map(|home| Self::from_root(home.join(DEFAULT_DIR_NAME)))
            .ok_or_else(|| {
                AppError::invalid_argument(format!(
                    "could not determine the home directory; pass --home or set {HOME_ENV_VAR}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::AppPaths;

    #[test]
    fn layout_hangs_off_root() {
        let paths = AppPaths::from_root("/data/ai");
        assert_eq!(paths.root, PathBuf::from("/data/ai"));
        assert_eq!(
            paths.config_file,
            PathBuf::from("/data/ai/config/config.json")
        );
        assert_eq!(paths.session_dir, PathBuf::from("/data/ai/chat_sessions"));
    }

    #[test]
    fn override_wins_over_home_directory() {
        let paths = AppPaths::resolve(Some(Path::new("/srv/chat"))).expect("override resolves");
        assert_eq!(paths.root, PathBuf::from("/srv/chat"));
    }
}
