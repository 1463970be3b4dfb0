//! Files staged for the next chat message.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 16] = [
    ".txt", ".md", ".py", ".json", ".csv", ".html", ".css", ".js", ".yaml", ".yml", ".sh", ".xml",
    ".log", ".ini", ".cfg", ".toml",
];
pub const MAX_FILENAMES_IN_PROMPT: usize = 3;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("File '{name}' is already staged for the next prompt.")]
    Duplicate { name: String },

    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Path is not a regular file: {}", .path.display())]
    NotAFile { path: PathBuf },

    #[error("Invalid file type '{ext}'. Allowed: {}", ALLOWED_EXTENSIONS.join(", "))]
    InvalidExtension { ext: String },

    #[error("File is too large ({:.1} KB). Max: {} KB.", kilobytes(.bytes), MAX_UPLOAD_BYTES / 1024)]
    TooLarge { bytes: u64 },

    #[error("Could not read file as UTF-8 text: {name}. Might be binary?")]
    NotUtf8 { name: String },

    #[error("error reading file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn kilobytes(bytes: &u64) -> f64 {
    *bytes as f64 / 1024.0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub path: PathBuf,
    pub content: String,
}

impl StagedFile {
    pub fn size_kb(&self) -> f64 {
        self.content.len() as f64 / 1024.0
    }
}

/// Expands a leading `~` to the home directory.
pub fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Tilde-expanded absolute path. Falls back to the expanded path when it
/// cannot be canonicalized, so existence checks report the typed path.
pub fn resolve_path(raw: &str) -> PathBuf {
    let expanded = expand_tilde(raw.trim());
    fs::canonicalize(&expanded).unwrap_or(expanded)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reads a text file after checking type, extension, and size limits.
pub fn read_text_file(path: &Path) -> Result<StagedFile, AttachmentError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            return Err(AttachmentError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(AttachmentError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if !metadata.is_file() {
        return Err(AttachmentError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AttachmentError::InvalidExtension { ext });
    }
    if metadata.len() > MAX_UPLOAD_BYTES {
        return Err(AttachmentError::TooLarge {
            bytes: metadata.len(),
        });
    }

    let name = file_name(path);
    let bytes = fs::read(path).map_err(|source| AttachmentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8(bytes).map_err(|_| AttachmentError::NotUtf8 {
        name: name.clone(),
    })?;

    Ok(StagedFile {
        name,
        path: path.to_path_buf(),
        content,
    })
}

#[derive(Debug, Default)]
pub struct Attachments {
    files: Vec<StagedFile>,
}

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stages `raw_path`. The returned file may be empty.
    pub fn stage(&mut self, raw_path: &str) -> Result<&StagedFile, AttachmentError> {
        let path = resolve_path(raw_path);
        if self.files.iter().any(|file| file.path == path) {
            return Err(AttachmentError::Duplicate {
                name: file_name(&path),
            });
        }

        let staged = read_text_file(&path)?;
        tracing::debug!(file = %staged.path.display(), bytes = staged.content.len(), "staged file");
        self.files.push(staged);
        Ok(&self.files[self.files.len() - 1])
    }

    /// Drops every staged file and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.files.len();
        self.files.clear();
        count
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_kb(&self) -> f64 {
        self.files.iter().map(StagedFile::size_kb).sum()
    }

    /// Context block that precedes the next message. Leaves the stage intact.
    pub fn context(&self) -> String {
        let mut context = String::new();
        for (index, file) in self.files.iter().enumerate() {
            let name = &file.name;
            context.push_str(&format!(
                "[User uploaded file {}: '{name}']\n--- File Content Start ({name}) ---\n{}\n--- File Content End ({name}) ---\n\n",
                index + 1,
                file.content
            ));
        }
        context
    }

    /// Short list of staged names for the prompt label, if any.
    pub fn prompt_summary(&self) -> Option<String> {
        if self.files.is_empty() {
            return None;
        }
        let names: Vec<&str> = self
            .files
            .iter()
            .take(MAX_FILENAMES_IN_PROMPT)
            .map(|file| file.name.as_str())
            .collect();
        let mut summary = names.join(", ");
        if self.files.len() > MAX_FILENAMES_IN_PROMPT {
            summary.push_str(&format!(", ... ({} total)", self.files.len()));
        }
        Some(summary)
    }
}
