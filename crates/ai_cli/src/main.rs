use std::io::{self, IsTerminal};
use std::process::ExitCode;

use ai_cli::cli::{Cli, Command, SessionCommand, SetupCommand};
use ai_cli::config::ConfigStore;
use ai_cli::paths::AppPaths;
use ai_cli::prompt::{read_stdin_limited, PromptRequest};
use ai_cli::prompter::DialoguerPrompter;
use ai_cli::repl::TerminalHost;
use ai_cli::{prompt, providers, session_cmd, setup, AppError, Outcome};
use chat_term::logging::init_logging;
use chat_term::{EnvConfig, Output, Tone};
use clap::Parser;
use session_store::SessionStore;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose) {
        eprintln!("failed to initialize logging: {error}");
    }

    let output = Output::from_env(&EnvConfig::from_env());
    let outcome = Outcome::flatten(run(cli, &output));
    if let Outcome::Failed(error) = &outcome {
        tracing::debug!(error = ?error, "command failed");
        output.notice(Tone::Error, &format!("Error: {error}"));
    }
    ExitCode::from(outcome.exit_code())
}

fn run(cli: Cli, output: &Output) -> Result<Outcome<()>, AppError> {
    let paths = AppPaths::resolve(cli.home.as_deref())?;
    tracing::debug!(root = %paths.root.display(), "resolved data directory");
    let config = ConfigStore::new(&paths.config_file);
    let mut prompter = DialoguerPrompter;

    let outcome = match cli.command {
        Command::Setup(SetupCommand::Configure { api_key, model }) => {
            setup::run_configure(&config, &mut prompter, output, api_key, model)
        }
        Command::Setup(SetupCommand::View) => setup::run_view(&config, output),
        Command::Session(command) => {
            let store = SessionStore::open(&paths.session_dir)?;
            match command {
                SessionCommand::New { name } => {
                    let provider = providers::provider_from_env(&config)?;
                    let mut host = terminal_host(output)?;
                    session_cmd::run_new(&store, &*provider, &mut host, name.as_deref())
                }
                SessionCommand::Resume { session_id } => {
                    let provider = providers::provider_from_env(&config)?;
                    let mut host = terminal_host(output)?;
                    session_cmd::run_resume(
                        &store,
                        &*provider,
                        &mut host,
                        &mut prompter,
                        output,
                        session_id.as_deref(),
                    )
                }
                SessionCommand::List => session_cmd::run_list(&store, output),
                SessionCommand::Delete { session_ids, yes } => {
                    session_cmd::run_delete(&store, &mut prompter, output, &session_ids, yes)
                }
            }
        }
        Command::Prompt(args) => {
            let provider = providers::provider_from_env(&config)?;
            let stdin = if io::stdin().is_terminal() {
                None
            } else {
                output.notice(Tone::Muted, "Reading data from stdin...");
                Some(read_stdin_limited(io::stdin().lock())?)
            };
            let request = PromptRequest {
                text: args.text,
                file: args.file,
                format: args.output_format,
                output_file: args.output_file,
            };
            prompt::run_prompt(&*provider, output, &request, stdin)
        }
    };
    Ok(outcome)
}

fn terminal_host(output: &Output) -> Result<TerminalHost, AppError> {
    TerminalHost::new(output.clone())
        .map_err(|error| AppError::io("initializing line editor", error))
}
