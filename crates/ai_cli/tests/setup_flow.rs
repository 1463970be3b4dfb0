mod support;

use ai_cli::config::{ConfigStore, StoredConfig};
use ai_cli::setup;
use ai_cli::{AppError, Outcome};
use chat_term::Output;
use pretty_assertions::assert_eq;

use support::ScriptedPrompter;

fn quiet() -> Output {
    Output::new(false, false)
}

fn config_in(dir: &tempfile::TempDir) -> ConfigStore {
    ConfigStore::new(dir.path().join("config").join("config.json"))
}

#[test]
fn configure_with_flags_saves_after_confirming_key() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = config_in(&dir);
    let mut prompter = ScriptedPrompter::default();
    prompter.confirmations.push_back(true);

    let outcome = setup::run_configure(
        &store,
        &mut prompter,
        &quiet(),
        Some("sk-flag-key-abcdef".to_string()),
        Some("gpt-4".to_string()),
    );

    assert!(outcome.is_ok());
    assert_eq!(prompter.asked, vec!["Use API key sk-f...cdef?".to_string()]);
    let saved = store.load().expect("config should load");
    assert_eq!(saved.openai_api_key.as_deref(), Some("sk-flag-key-abcdef"));
    assert_eq!(saved.model.as_deref(), Some("gpt-4"));
}

#[test]
fn configure_interactively_prompts_for_key_and_model() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = config_in(&dir);
    let mut prompter = ScriptedPrompter::default();
    prompter.secrets.push_back("  sk-entered-key-0001 ".to_string());
    prompter.selections.push_back(Some(3));

    let outcome = setup::run_configure(&store, &mut prompter, &quiet(), None, None);

    assert!(outcome.is_ok());
    assert_eq!(
        store.load().expect("config should load"),
        StoredConfig {
            openai_api_key: Some("sk-entered-key-0001".to_string()),
            model: Some("gpt-4o".to_string()),
            base_url: None,
            timeout_sec: None,
        }
    );
}

#[test]
fn declined_key_falls_back_to_prompt_and_blank_keeps_existing() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = config_in(&dir);
    store
        .save(&StoredConfig {
            openai_api_key: Some("sk-existing-key-9999".to_string()),
            model: Some("gpt-4".to_string()),
            base_url: Some("http://localhost:9000/v1".to_string()),
            timeout_sec: None,
        })
        .expect("config should save");
    let mut prompter = ScriptedPrompter::default();
    prompter.confirmations.push_back(false);
    prompter.secrets.push_back(String::new());

    let outcome = setup::run_configure(
        &store,
        &mut prompter,
        &quiet(),
        Some("sk-env-key-1234567".to_string()),
        Some("gpt-4-turbo".to_string()),
    );

    assert!(outcome.is_ok());
    assert_eq!(
        prompter.asked[1],
        "OpenAI API key (Enter to keep sk-e...9999)"
    );
    let saved = store.load().expect("config should load");
    assert_eq!(saved.openai_api_key.as_deref(), Some("sk-existing-key-9999"));
    assert_eq!(saved.model.as_deref(), Some("gpt-4-turbo"));
    assert_eq!(saved.base_url.as_deref(), Some("http://localhost:9000/v1"));
}

#[test]
fn empty_key_without_existing_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = config_in(&dir);
    let mut prompter = ScriptedPrompter::default();
    prompter.secrets.push_back("   ".to_string());

    let outcome = setup::run_configure(&store, &mut prompter, &quiet(), None, None);

    assert!(matches!(outcome, Outcome::Failed(AppError::InvalidArgument(_))));
    assert!(!store.exists());
}

#[test]
fn unknown_model_is_rejected_without_saving() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = config_in(&dir);
    let mut prompter = ScriptedPrompter::default();
    prompter.confirmations.push_back(true);

    let outcome = setup::run_configure(
        &store,
        &mut prompter,
        &quiet(),
        Some("sk-flag-key-abcdef".to_string()),
        Some("gpt-2".to_string()),
    );

    match outcome {
        Outcome::Failed(AppError::InvalidArgument(message)) => {
            assert!(message.starts_with("Invalid model 'gpt-2'"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!store.exists());
}

#[test]
fn cancelled_model_selection_saves_nothing() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = config_in(&dir);
    let mut prompter = ScriptedPrompter::default();
    prompter.secrets.push_back("sk-entered-key-0001".to_string());
    prompter.selections.push_back(None);

    let outcome = setup::run_configure(&store, &mut prompter, &quiet(), None, None);

    assert!(outcome.is_cancelled());
    assert!(!store.exists());
}

#[test]
fn view_without_config_is_not_an_error() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    assert!(setup::run_view(&config_in(&dir), &quiet()).is_ok());
}
