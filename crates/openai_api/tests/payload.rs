use openai_api::{ChatCompletionMessage, ChatCompletionRequest, ChatCompletionResponse};
use serde_json::json;

#[test]
fn request_serializes_messages_and_temperature() {
    let request = ChatCompletionRequest::new(
        "gpt-4o",
        vec![
            ChatCompletionMessage::new("user", "hi"),
            ChatCompletionMessage::new("assistant", "hello"),
        ],
    )
    .with_temperature(0.5);

    let value = serde_json::to_value(&request).expect("serialize request");
    assert_eq!(
        value,
        json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"}
            ],
            "temperature": 0.5
        })
    );
}

#[test]
fn request_omits_absent_temperature() {
    let request = ChatCompletionRequest::new("gpt-4o", Vec::new());
    let value = serde_json::to_value(&request).expect("serialize request");
    assert!(value.get("temperature").is_none());
}

#[test]
fn response_first_text_reads_first_choice() {
    let response: ChatCompletionResponse = serde_json::from_value(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "first"}, "finish_reason": "stop"},
            {"index": 1, "message": {"role": "assistant", "content": "second"}, "finish_reason": "stop"}
        ],
        "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
    }))
    .expect("decode response");

    assert_eq!(response.first_text(), "first");
}

#[test]
fn response_first_text_is_empty_for_missing_content() {
    let null_content: ChatCompletionResponse = serde_json::from_value(json!({
        "choices": [{"message": {"role": "assistant", "content": null}}]
    }))
    .expect("decode response");
    let no_choices: ChatCompletionResponse =
        serde_json::from_value(json!({"choices": []})).expect("decode response");
    let bare: ChatCompletionResponse = serde_json::from_value(json!({})).expect("decode response");

    assert_eq!(null_content.first_text(), "");
    assert_eq!(no_choices.first_text(), "");
    assert_eq!(bare.first_text(), "");
}
