//! `ai-cli setup configure|view`.

use chat_term::{Output, Tone};

use crate::config::{is_known_model, mask_key, ConfigStore, StoredConfig, MODEL_CHOICES};
use crate::error::AppError;
use crate::outcome::Outcome;
use crate::prompter::Prompter;

const NOT_SET: &str = "<not set>";

pub fn run_configure(
    store: &ConfigStore,
    prompter: &mut dyn Prompter,
    output: &Output,
    api_key: Option<String>,
    model: Option<String>,
) -> Outcome<()> {
    Outcome::flatten(configure(store, prompter, output, api_key, model))
}

fn configure(
    store: &ConfigStore,
    prompter: &mut dyn Prompter,
    output: &Output,
    api_key: Option<String>,
    model: Option<String>,
) -> Result<Outcome<()>, AppError> {
    let mut stored = store.load()?;

    let offered = api_key
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty());
    let api_key = match offered {
        Some(key) if prompter.confirm(&format!("Use API key {}?", mask_key(&key)), true)? => key,
        _ => ask_for_key(prompter, &stored)?,
    };

    let model = match model.map(|model| model.trim().to_string()) {
        Some(model) if is_known_model(&model) => model,
        Some(model) => {
            return Err(AppError::invalid_argument(format!(
                "Invalid model '{model}'. Choose one of: {}",
                MODEL_CHOICES.join(", ")
            )))
        }
        None => {
            let items: Vec<String> = MODEL_CHOICES.iter().map(|model| model.to_string()).collect();
            let default = stored
                .model
                .as_deref()
                .and_then(|current| MODEL_CHOICES.iter().position(|model| *model == current))
                .unwrap_or(0);
            match prompter.select("Select the default model", &items, default)? {
                Some(index) => items[index].clone(),
                None => {
                    output.line(Tone::Info, "Configuration cancelled.");
                    return Ok(Outcome::Cancelled);
                }
            }
        }
    };

    stored.openai_api_key = Some(api_key);
    stored.model = Some(model);
    store.save(&stored)?;

    output.line(
        Tone::Success,
        &format!("Configuration saved to {}", store.path().display()),
    );
    print_summary(output, &stored);
    Ok(Outcome::Ok(()))
}

fn ask_for_key(prompter: &mut dyn Prompter, stored: &StoredConfig) -> Result<String, AppError> {
    let existing = stored
        .openai_api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty());
    let prompt = match existing {
        Some(key) => format!("OpenAI API key (Enter to keep {})", mask_key(key)),
        None => "OpenAI API key".to_string(),
    };

    let entered = prompter.secret(&prompt)?;
    match (entered.trim(), existing) {
        ("", Some(key)) => Ok(key.to_string()),
        ("", None) => Err(AppError::invalid_argument("API key cannot be empty.")),
        (key, _) => Ok(key.to_string()),
    }
}

pub fn run_view(store: &ConfigStore, output: &Output) -> Outcome<()> {
    if !store.exists() {
        output.line(
            Tone::Warning,
            "No configuration found. Run 'ai-cli setup configure' to create one.",
        );
        return Outcome::Ok(());
    }

    let stored = match store.load() {
        Ok(stored) => stored,
        Err(error) => return Outcome::failed(error),
    };
    output.line(Tone::Heading, "Current configuration");
    print_summary(output, &stored);
    if let Some(base_url) = &stored.base_url {
        output.line(Tone::Plain, &format!("  Base URL: {base_url}"));
    }
    if let Some(timeout) = stored.timeout_sec {
        output.line(Tone::Plain, &format!("  Timeout: {timeout}s"));
    }
    output.line(
        Tone::Muted,
        &format!("  Config file: {}", store.path().display()),
    );
    Outcome::Ok(())
}

fn print_summary(output: &Output, stored: &StoredConfig) {
    let key = stored
        .openai_api_key
        .as_deref()
        .map_or_else(|| NOT_SET.to_string(), mask_key);
    output.line(Tone::Plain, &format!("  API key: {key}"));
    output.line(
        Tone::Plain,
        &format!("  Model: {}", stored.model.as_deref().unwrap_or(NOT_SET)),
    );
}
