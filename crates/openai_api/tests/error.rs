use reqwest::StatusCode;

use openai_api::error::parse_error_message;
use openai_api::OpenAiApiError;

#[test]
fn parse_error_message_uses_api_message_and_code() {
    let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#;

    let message = parse_error_message(StatusCode::UNAUTHORIZED, body);
    assert_eq!(message, "Incorrect API key provided (invalid_api_key)");
}

#[test]
fn parse_error_message_falls_back_to_type_when_code_missing() {
    let body = r#"{"error":{"message":"The model does not exist","type":"invalid_request_error"}}"#;

    let message = parse_error_message(StatusCode::NOT_FOUND, body);
    assert_eq!(message, "The model does not exist (invalid_request_error)");
}

#[test]
fn parse_error_message_falls_back_to_raw_body() {
    let body = "upstream connect error";
    let message = parse_error_message(StatusCode::BAD_GATEWAY, body);
    assert_eq!(message, "upstream connect error");
}

#[test]
fn parse_error_message_uses_status_reason_for_empty_body() {
    let message = parse_error_message(StatusCode::SERVICE_UNAVAILABLE, "");
    assert_eq!(message, "Service Unavailable");
}

#[test]
fn status_error_display_includes_status_and_message() {
    let error = OpenAiApiError::Status(StatusCode::TOO_MANY_REQUESTS, "slow down".to_string());
    assert_eq!(error.to_string(), "HTTP 429 Too Many Requests slow down");
    assert!(!error.is_timeout());
}
