//! Interactive terminal prompts used by the CLI commands.

use dialoguer::{Confirm, MultiSelect, Password, Select};

use crate::error::AppError;

/// Prompt surface for `setup` and `session`, swappable in tests.
pub trait Prompter {
    /// Single choice. `None` when the user backs out.
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> Result<Option<usize>, AppError>;

    /// Any number of choices. `None` when the user backs out.
    fn multi_select(&mut self, prompt: &str, items: &[String])
        -> Result<Option<Vec<usize>>, AppError>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, AppError>;

    /// Hidden input. May return an empty string.
    fn secret(&mut self, prompt: &str) -> Result<String, AppError>;
}

#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> Result<Option<usize>, AppError> {
        Ok(Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact_opt()?)
    }

    fn multi_select(
        &mut self,
        prompt: &str,
        items: &[String],
    ) -> Result<Option<Vec<usize>>, AppError> {
        Ok(MultiSelect::new()
            .with_prompt(prompt)
            .items(items)
            .interact_opt()?)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, AppError> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    fn secret(&mut self, prompt: &str) -> Result<String, AppError> {
        Ok(Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?)
    }
}
