use openai_api::headers::{
    build_headers, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, HEADER_USER_AGENT,
};
use openai_api::{OpenAiApiConfig, OpenAiApiError};

#[test]
fn headers_carry_bearer_token_and_json_content_type() {
    let headers = build_headers(&OpenAiApiConfig::new("  sk-test  ")).expect("headers");

    assert_eq!(headers[HEADER_AUTHORIZATION], "Bearer sk-test");
    assert_eq!(headers[HEADER_CONTENT_TYPE], "application/json");
    assert!(headers[HEADER_USER_AGENT].starts_with("ai-cli/"));
}

#[test]
fn headers_reject_blank_api_key() {
    let error = build_headers(&OpenAiApiConfig::new("   ")).expect_err("blank key must fail");
    assert!(matches!(error, OpenAiApiError::MissingApiKey));
}

#[test]
fn headers_apply_user_agent_override_and_extra_headers() {
    let config = OpenAiApiConfig::new("sk-test")
        .with_user_agent("custom-agent/1.0")
        .insert_header("OpenAI-Organization", " org-123 ");

    let headers = build_headers(&config).expect("headers");

    assert_eq!(headers[HEADER_USER_AGENT], "custom-agent/1.0");
    assert_eq!(headers["openai-organization"], "org-123");
}
