//! One-shot `ai-cli prompt`.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chat_term::{Output, Tone};
use clap::ValueEnum;
use completion_provider::{ChatMessage, CompletionProvider};
use regex::Regex;

use crate::attachments::{self, StagedFile};
use crate::error::AppError;
use crate::outcome::Outcome;

pub const MAX_STDIN_BYTES: u64 = 50 * 1024;

const JSON_INSTRUCTIONS: &str = "\n\nRESPONSE FORMATTING INSTRUCTIONS: Your entire response MUST be ONLY a single, valid JSON object or array...";
const RAW_INSTRUCTIONS: &str =
    "\n\nRESPONSE FORMATTING INSTRUCTIONS: Your entire response MUST be ONLY the requested raw text...";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Raw,
    Json,
}

impl OutputFormat {
    fn instructions(self) -> &'static str {
        match self {
            Self::Markdown => "",
            Self::Raw => RAW_INSTRUCTIONS,
            Self::Json => JSON_INSTRUCTIONS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptRequest {
    pub text: String,
    pub file: Option<PathBuf>,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Reads piped input, refusing more than [`MAX_STDIN_BYTES`].
pub fn read_stdin_limited(reader: impl Read) -> Result<String, AppError> {
    let mut bytes = Vec::new();
    reader
        .take(MAX_STDIN_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|error| AppError::io("reading standard input", error))?;
    if bytes.len() as u64 > MAX_STDIN_BYTES {
        return Err(AppError::invalid_argument(format!(
            "Standard input is too large. Max: {} KB.",
            MAX_STDIN_BYTES / 1024
        )));
    }
    String::from_utf8(bytes)
        .map_err(|_| AppError::invalid_argument("Standard input is not valid UTF-8 text."))
}

/// Assembles the single user message sent for a one-shot prompt.
pub fn build_prompt(
    text: &str,
    stdin: Option<&str>,
    file: Option<&StagedFile>,
    format: OutputFormat,
) -> String {
    let prefix = match (stdin, file) {
        (Some(data), _) => format!(
            "[Data from standard input]\n\n--- Input Data Start ---\n{data}\n--- Input Data End ---\n\n"
        ),
        (None, Some(file)) => {
            let name = &file.name;
            format!(
                "[User uploaded file: '{name}']\n\n--- File Content Start ({name}) ---\n{}\n--- File Content End ({name}) ---\n\n",
                file.content
            )
        }
        (None, None) => String::new(),
    };
    format!("{prefix}{text}{}", format.instructions())
}

fn code_fence_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?si)^\s*```(?:\w*\s*)?\n?(.*?)\n?```\s*$").expect("code fence regex must compile")
    })
}

/// Removes one fence wrapping the whole reply, if present.
pub fn strip_code_fence(reply: &str) -> String {
    let trimmed = reply.trim();
    match code_fence_regex().captures(trimmed).and_then(|captures| captures.get(1)) {
        Some(inner) => inner.as_str().trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Final text for a reply, plus a warning when JSON output was not valid JSON.
pub fn format_reply(reply: &str, format: OutputFormat) -> (String, Option<&'static str>) {
    match format {
        OutputFormat::Markdown => (reply.to_string(), None),
        OutputFormat::Raw => (strip_code_fence(reply), None),
        OutputFormat::Json => {
            let stripped = strip_code_fence(reply);
            match serde_json::from_str::<serde_json::Value>(&stripped)
                .and_then(|value| serde_json::to_string_pretty(&value))
            {
                Ok(pretty) => (pretty, None),
                Err(_) => (stripped, Some("Not valid JSON. Raw output:")),
            }
        }
    }
}

pub fn run_prompt(
    provider: &dyn CompletionProvider,
    output: &Output,
    request: &PromptRequest,
    stdin: Option<String>,
) -> Outcome<()> {
    Outcome::flatten(prompt_once(provider, output, request, stdin))
}

fn prompt_once(
    provider: &dyn CompletionProvider,
    output: &Output,
    request: &PromptRequest,
    stdin: Option<String>,
) -> Result<Outcome<()>, AppError> {
    if stdin.as_deref().is_some_and(str::is_empty) {
        output.notice(Tone::Warning, "Empty stdin data.");
    }
    let stdin = stdin.filter(|data| !data.is_empty());
    let file = match (&stdin, &request.file) {
        (Some(data), Some(path)) => {
            output.notice(
                Tone::Muted,
                &format!("Read {:.1} KB from stdin.", data.len() as f64 / 1024.0),
            );
            output.notice(
                Tone::Warning,
                &format!("Ignoring --file ('{}') due to stdin data.", path.display()),
            );
            None
        }
        (Some(data), None) => {
            output.notice(
                Tone::Muted,
                &format!("Read {:.1} KB from stdin.", data.len() as f64 / 1024.0),
            );
            None
        }
        (None, Some(path)) => Some(load_file(output, path)?),
        (None, None) => None,
    };

    let content = build_prompt(&request.text, stdin.as_deref(), file.as_ref(), request.format);
    tracing::debug!(format = ?request.format, bytes = content.len(), "sending one-shot prompt");
    let reply = provider.complete(&[ChatMessage::user(content)], None)?;
    if reply.trim().is_empty() {
        output.notice(Tone::Warning, "(Empty response received)");
        return Ok(Outcome::Ok(()));
    }

    let (text, warning) = format_reply(&reply, request.format);
    if let Some(warning) = warning {
        output.notice(Tone::Warning, warning);
    }

    match &request.output_file {
        Some(path) => {
            write_output_file(path, &text)?;
            output.notice(
                Tone::Success,
                &format!("Output saved to: {}", path.display()),
            );
        }
        None if request.format == OutputFormat::Markdown => output.reply(&text),
        None => println!("{text}"),
    }
    Ok(Outcome::Ok(()))
}

fn load_file(output: &Output, path: &Path) -> Result<StagedFile, AppError> {
    let resolved = attachments::resolve_path(&path.to_string_lossy());
    let file = attachments::read_text_file(&resolved)
        .map_err(|error| AppError::invalid_argument(error.to_string()))?;
    if file.content.is_empty() {
        output.notice(Tone::Warning, &format!("File '{}' is empty.", file.name));
    }
    output.notice(
        Tone::Muted,
        &format!("Including file: {} ({:.1} KB)", file.name, file.size_kb()),
    );
    Ok(file)
}

fn write_output_file(path: &Path, text: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|error| AppError::io(format!("creating {}", parent.display()), error))?;
    }
    fs::write(path, text)
        .map_err(|error| AppError::io(format!("writing {}", path.display()), error))
}
