use completion_provider::CompletionProvider;
use completion_provider_mock::{MockProvider, MOCK_PROVIDER_ID};
use completion_provider_openai::{OpenAiProvider, OpenAiProviderConfig, OPENAI_PROVIDER_ID};

use crate::config::ConfigStore;
use crate::error::AppError;

pub const DEFAULT_PROVIDER_ID: &str = OPENAI_PROVIDER_ID;
pub const PROVIDER_ENV_VAR: &str = "AI_CLI_PROVIDER";

pub fn provider_from_env(config: &ConfigStore) -> Result<Box<dyn CompletionProvider>, AppError> {
    let provider_id = std::env::var(PROVIDER_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    provider_for_id(
        provider_id.as_deref().unwrap_or(DEFAULT_PROVIDER_ID),
        config,
    )
}

/// Builds the named provider. Only `openai` reads the stored configuration.
pub fn provider_for_id(
    provider_id: &str,
    config: &ConfigStore,
) -> Result<Box<dyn CompletionProvider>, AppError> {
    match provider_id {
        OPENAI_PROVIDER_ID => {
            let settings = config.load()?.required()?;
            let mut provider_config = OpenAiProviderConfig::new(settings.api_key, settings.model)
                .with_timeout(settings.timeout);
            if let Some(base_url) = settings.base_url {
                provider_config = provider_config.with_base_url(base_url);
            }
            let provider = OpenAiProvider::new(provider_config)?;
            tracing::debug!(provider = OPENAI_PROVIDER_ID, "completion provider ready");
            Ok(Box::new(provider))
        }
        MOCK_PROVIDER_ID => Ok(Box::new(MockProvider::new())),
        unknown => Err(AppError::invalid_argument(format!(
            "Unsupported provider '{unknown}'. Available providers: {OPENAI_PROVIDER_ID}, {MOCK_PROVIDER_ID}"
        ))),
    }
}
