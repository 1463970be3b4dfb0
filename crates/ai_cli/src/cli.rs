use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::paths::HOME_ENV_VAR;
use crate::prompt::OutputFormat;

/// Chat with an OpenAI model from the terminal, with named, resumable sessions.
#[derive(Debug, Parser)]
#[command(name = "ai-cli", version, about)]
pub struct Cli {
    /// Data directory holding configuration and sessions [default: ~/.ai-cli]
    #[arg(long, global = true, env = HOME_ENV_VAR, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the API key and default model
    #[command(subcommand)]
    Setup(SetupCommand),

    /// Start, resume, list, or delete chat sessions
    #[command(subcommand)]
    Session(SessionCommand),

    /// Send a single prompt and print the reply
    Prompt(PromptArgs),
}

#[derive(Debug, Subcommand)]
pub enum SetupCommand {
    /// Set the API key and default model
    Configure {
        /// OpenAI API key
        #[arg(short = 'k', long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Default model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Show the current configuration
    View,
}

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Start a new chat session
    New {
        /// Session name; without one the session is named after the first message
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Resume a saved session
    Resume {
        /// Full session id; omit to choose interactively
        session_id: Option<String>,
    },

    /// List saved sessions
    List,

    /// Delete saved sessions
    Delete {
        /// Full session ids; omit to choose interactively
        session_ids: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct PromptArgs {
    /// Prompt text
    pub text: String,

    /// Text file to include as context (ignored when stdin is piped)
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// How to print the reply
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub output_format: OutputFormat,

    /// Write the reply to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Command, SessionCommand};
    use crate::prompt::OutputFormat;

    #[test]
    fn command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_session_delete_with_ids() {
        let cli = Cli::try_parse_from(["ai-cli", "session", "delete", "a_0a1b2c3d", "b", "--yes"])
            .expect("delete should parse");
        match cli.command {
            Command::Session(SessionCommand::Delete { session_ids, yes }) => {
                assert_eq!(session_ids, vec!["a_0a1b2c3d".to_string(), "b".to_string()]);
                assert!(yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_prompt_options() {
        let cli = Cli::try_parse_from([
            "ai-cli",
            "-vv",
            "prompt",
            "List the planets",
            "--output-format",
            "json",
            "-o",
            "out/planets.json",
        ])
        .expect("prompt should parse");
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Prompt(args) => {
                assert_eq!(args.text, "List the planets");
                assert_eq!(args.output_format, OutputFormat::Json);
                assert_eq!(
                    args.output_file.as_deref(),
                    Some(std::path::Path::new("out/planets.json"))
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_output_format() {
        assert!(Cli::try_parse_from(["ai-cli", "prompt", "hi", "--output-format", "xml"]).is_err());
    }
}
