//! OpenAI-backed implementation of the shared `completion_provider` contract.
//!
//! This adapter translates `ChatMessage` histories into `openai_api` requests
//! and blocks on each call from the caller's thread.

use std::sync::Arc;
use std::time::Duration;

use completion_provider::{
    ChatMessage, CompletionError, CompletionProvider, ProviderInitError, ProviderProfile,
};
use openai_api::{
    ChatCompletionMessage, ChatCompletionRequest, OpenAiApiClient, OpenAiApiConfig,
    OpenAiApiError,
};

/// Stable provider identifier used by `ai_cli` startup selection.
pub const OPENAI_PROVIDER_ID: &str = "openai";

/// Sampling temperature used when the caller does not pass one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Runtime configuration for the OpenAI provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiProviderConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl OpenAiProviderConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn validate(&self) -> Result<(), ProviderInitError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderInitError::invalid_argument(
                "API key must not be empty",
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ProviderInitError::invalid_argument("model must not be empty"));
        }
        Ok(())
    }

    fn to_openai_api_config(&self) -> OpenAiApiConfig {
        let mut config = OpenAiApiConfig::new(self.api_key.trim());

        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        config
    }
}

trait CompletionClient: Send + Sync {
    fn complete(&self, request: &ChatCompletionRequest) -> Result<String, CompletionError>;
}

#[derive(Debug)]
struct DefaultCompletionClient {
    client: OpenAiApiClient,
}

impl CompletionClient for DefaultCompletionClient {
    fn complete(&self, request: &ChatCompletionRequest) -> Result<String, CompletionError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                CompletionError::with_source("failed to initialize tokio runtime", error)
            })?;

        runtime
            .block_on(self.client.complete_text(request))
            .map_err(map_request_error)
    }
}

/// `CompletionProvider` adapter backed by `openai_api` transport primitives.
pub struct OpenAiProvider {
    model: String,
    client: Arc<dyn CompletionClient>,
}

impl OpenAiProvider {
    /// Creates a provider using real OpenAI transport.
    ///
    /// Fails with [`ProviderInitError::InvalidArgument`] when the key or model is blank.
    pub fn new(config: OpenAiProviderConfig) -> Result<Self, ProviderInitError> {
        config.validate()?;
        let client = Arc::new(DefaultCompletionClient {
            client: OpenAiApiClient::new(config.to_openai_api_config())
                .map_err(map_init_error)?,
        });

        Ok(Self {
            model: config.model.trim().to_string(),
            client,
        })
    }

    #[cfg(test)]
    fn with_client_for_tests(model: &str, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            model: model.to_string(),
            client,
        }
    }

    fn build_request(&self, messages: &[ChatMessage], temperature: f32) -> ChatCompletionRequest {
        let messages = messages
            .iter()
            .map(|message| ChatCompletionMessage::new(message.role.as_str(), &message.content))
            .collect();
        ChatCompletionRequest::new(&self.model, messages).with_temperature(temperature)
    }
}

impl CompletionProvider for OpenAiProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: OPENAI_PROVIDER_ID.to_string(),
            model_id: self.model.clone(),
        }
    }

    fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: Option<f32>,
    ) -> Result<String, CompletionError> {
        if messages.is_empty() {
            return Ok(String::new());
        }

        let request = self.build_request(messages, temperature.unwrap_or(DEFAULT_TEMPERATURE));
        tracing::debug!(model = %self.model, messages = messages.len(), "requesting completion");
        self.client.complete(&request)
    }
}

fn map_init_error(error: OpenAiApiError) -> ProviderInitError {
    ProviderInitError::setup(format!("Failed to initialize openai provider: {error}"))
}

fn map_request_error(error: OpenAiApiError) -> CompletionError {
    let message = format!("OpenAI request failed: {error}");
    CompletionError::with_source(message, error)
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};

    use super::*;

    fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    enum FakeOutcome {
        Text(String),
        Error(OpenAiApiError),
    }

    struct FakeCompletionClient {
        calls: AtomicUsize,
        observed: Mutex<Option<ChatCompletionRequest>>,
        outcome: Mutex<Option<FakeOutcome>>,
    }

    impl FakeCompletionClient {
        fn new(outcome: FakeOutcome) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                observed: Mutex::new(None),
                outcome: Mutex::new(Some(outcome)),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn observed(&self) -> Option<ChatCompletionRequest> {
            lock_unpoisoned(&self.observed).clone()
        }
    }

    impl CompletionClient for FakeCompletionClient {
        fn complete(&self, request: &ChatCompletionRequest) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *lock_unpoisoned(&self.observed) = Some(request.clone());

            match lock_unpoisoned(&self.outcome).take() {
                Some(FakeOutcome::Text(text)) => Ok(text),
                Some(FakeOutcome::Error(error)) => Err(map_request_error(error)),
                None => panic!("fake outcome should be consumed exactly once"),
            }
        }
    }

    #[test]
    fn empty_history_returns_empty_text_without_remote_call() {
        let client = FakeCompletionClient::new(FakeOutcome::Text("unused".to_string()));
        let provider = OpenAiProvider::with_client_for_tests("gpt-4o", client.clone());

        let reply = provider
            .complete(&[], None)
            .expect("empty history should short-circuit");

        assert_eq!(reply, "");
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn complete_maps_history_and_default_temperature() {
        let client = FakeCompletionClient::new(FakeOutcome::Text("pong".to_string()));
        let provider = OpenAiProvider::with_client_for_tests("gpt-4o", client.clone());

        let reply = provider
            .complete(
                &[ChatMessage::user("ping"), ChatMessage::assistant("ack")],
                None,
            )
            .expect("completion should succeed");

        assert_eq!(reply, "pong");
        assert_eq!(client.calls(), 1);
        let request = client.observed().expect("request should be observed");
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.temperature, Some(DEFAULT_TEMPERATURE));
        assert_eq!(
            request.messages,
            vec![
                ChatCompletionMessage::new("user", "ping"),
                ChatCompletionMessage::new("assistant", "ack"),
            ]
        );
    }

    #[test]
    fn complete_passes_explicit_temperature() {
        let client = FakeCompletionClient::new(FakeOutcome::Text("title".to_string()));
        let provider = OpenAiProvider::with_client_for_tests("gpt-4o", client.clone());

        provider
            .complete(&[ChatMessage::user("name this")], Some(0.3))
            .expect("completion should succeed");

        let request = client.observed().expect("request should be observed");
        assert_eq!(request.temperature, Some(0.3));
    }

    #[test]
    fn transport_failure_becomes_completion_error_with_cause() {
        let client = FakeCompletionClient::new(FakeOutcome::Error(OpenAiApiError::MissingModel));
        let provider = OpenAiProvider::with_client_for_tests("gpt-4o", client);

        let error = provider
            .complete(&[ChatMessage::user("ping")], None)
            .expect_err("transport failure should surface");

        assert_eq!(error.message(), "OpenAI request failed: model is required");
        assert!(error.source().is_some());
    }

    #[test]
    fn construction_rejects_blank_key_or_model() {
        let missing_key = OpenAiProvider::new(OpenAiProviderConfig::new(" ", "gpt-4o"))
            .err()
            .expect("blank key must fail");
        assert!(matches!(missing_key, ProviderInitError::InvalidArgument(_)));

        let missing_model = OpenAiProvider::new(OpenAiProviderConfig::new("sk-test", ""))
            .err()
            .expect("blank model must fail");
        assert!(matches!(missing_model, ProviderInitError::InvalidArgument(_)));
    }

    #[test]
    fn profile_reports_provider_and_trimmed_model() {
        let provider = OpenAiProvider::new(
            OpenAiProviderConfig::new("sk-test", " gpt-4o ")
                .with_base_url("http://127.0.0.1:9/v1")
                .with_timeout(Duration::from_secs(1)),
        )
        .expect("provider should build");

        assert_eq!(
            provider.profile(),
            ProviderProfile {
                provider_id: OPENAI_PROVIDER_ID.to_string(),
                model_id: "gpt-4o".to_string(),
            }
        );
    }
}
