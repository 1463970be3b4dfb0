/// In-chat command entered with a leading `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Exit,
    History,
    Clear,
    Rename(Option<String>),
    Upload(Option<String>),
    Edit,
    Status,
    ClearFiles,
    Unknown(String),
}

impl SlashCommand {
    /// Commands that need a stored session to act on.
    pub fn requires_session(&self) -> bool {
        matches!(self, Self::History | Self::Clear | Self::Rename(_))
    }
}

/// Parses `input` as a slash command. The command word is case-insensitive;
/// the argument keeps its case.
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (command, argument) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, Some(rest.trim())),
        None => (trimmed, None),
    };
    let argument = argument
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let parsed = match command.to_lowercase().as_str() {
        "/help" => SlashCommand::Help,
        "/exit" | "/quit" => SlashCommand::Exit,
        "/history" => SlashCommand::History,
        "/clear" => SlashCommand::Clear,
        "/rename" => SlashCommand::Rename(argument),
        "/upload" => SlashCommand::Upload(argument),
        "/edit" => SlashCommand::Edit,
        "/status" => SlashCommand::Status,
        "/clearfiles" => SlashCommand::ClearFiles,
        _ => SlashCommand::Unknown(command.to_string()),
    };

    Some(parsed)
}

pub const HELP_LINES: &[(&str, &str)] = &[
    ("/rename <new_name>", "Rename the current session"),
    ("/history", "Show the conversation history"),
    ("/clear", "Clear the conversation history"),
    ("/upload [file_path]", "Stage a text file for the next message (fzf picker without a path)"),
    ("/edit", "Compose the next message in $EDITOR"),
    ("/status", "List files staged for the next message"),
    ("/clearfiles", "Discard staged files"),
    ("/help", "Show this help"),
    ("/exit | /quit", "End the session"),
];
