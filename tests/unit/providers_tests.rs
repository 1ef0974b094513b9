/*!
 * Tests for provider implementations
 */

use serde_json::json;

use dialogai::app_config::{TranslationConfig, TranslationProvider};
use dialogai::errors::{AppError, ProviderError};
use dialogai::providers::anthropic::{Anthropic, AnthropicResponse};
use dialogai::providers::mock::MockProvider;
use dialogai::providers::ollama::Ollama;
use dialogai::providers::openai::{ChatCompletionResponse, OpenAICompatible};
use dialogai::providers::{CompletionRequest, Pricing, Provider, ResponseFormat, create_provider};

fn config_for(provider: TranslationProvider) -> TranslationConfig {
    let mut config = TranslationConfig::default();
    config.provider = provider;
    config.active_provider_config_mut().model = "test-model".to_string();
    config
}

#[test]
fn test_createProvider_withEachProvider_shouldUseDisplayName() {
    let cases = [
        (TranslationProvider::OpenRouter, "OpenRouter"),
        (TranslationProvider::OpenAI, "OpenAI"),
        (TranslationProvider::LMStudio, "LM Studio"),
        (TranslationProvider::Anthropic, "Anthropic"),
        (TranslationProvider::Ollama, "Ollama"),
    ];

    for (provider, name) in cases {
        let created = create_provider(&config_for(provider)).unwrap();
        assert_eq!(created.name(), name);
        assert_eq!(created.model(), "test-model");
    }
}

#[test]
fn test_createProvider_withRelativeEndpoint_shouldFailAsConfiguration() {
    let mut config = config_for(TranslationProvider::LMStudio);
    config.active_provider_config_mut().endpoint = "localhost-without-scheme".to_string();

    let result = create_provider(&config);

    assert!(matches!(result, Err(AppError::Configuration(_))));
}

#[test]
fn test_openAiRequest_withJsonFormat_shouldAskForJsonObject() {
    let client = OpenAICompatible::new("OpenRouter", "https://openrouter.ai/api/v1/", "sk", "m", None)
        .with_temperature(Some(0.2));

    let body = serde_json::to_value(client.build_request(&CompletionRequest::json("Translate"))).unwrap();

    assert_eq!(client.completions_url(), "https://openrouter.ai/api/v1/chat/completions");
    assert_eq!(body["model"], json!("m"));
    assert_eq!(body["messages"], json!([{"role": "user", "content": "Translate"}]));
    assert_eq!(body["response_format"], json!({"type": "json_object"}));
    assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);

    let text_body = serde_json::to_value(client.build_request(&CompletionRequest::text("Hi"))).unwrap();
    assert!(text_body.get("response_format").is_none());
    assert!(
        serde_json::to_value(
            OpenAICompatible::new("OpenAI", "http://x", "", "m", None).build_request(&CompletionRequest::text("Hi"))
        )
        .unwrap()
        .get("temperature")
        .is_none()
    );
}

#[test]
fn test_openAiResponse_withReportedCost_shouldPreferIt() {
    let response: ChatCompletionResponse = serde_json::from_value(json!({
        "choices": [{"message": {"role": "assistant", "content": "[[\"Salve.\"]]"}}],
        "usage": {"prompt_tokens": 1000, "completion_tokens": 10, "cost": 0.0042}
    }))
    .unwrap();

    let completion = OpenAICompatible::into_completion(response, &Pricing::new(1.0, 2.0)).unwrap();

    assert_eq!(completion.text, "[[\"Salve.\"]]");
    assert_eq!(completion.cost, 0.0042);
    assert_eq!(completion.prompt_tokens, Some(1000));
}

#[test]
fn test_openAiResponse_withoutReportedCost_shouldUsePricing() {
    let response: ChatCompletionResponse = serde_json::from_value(json!({
        "choices": [{"message": {"role": "assistant", "content": "ok"}}],
        "usage": {"prompt_tokens": 1000000, "completion_tokens": 500000}
    }))
    .unwrap();

    let completion = OpenAICompatible::into_completion(response, &Pricing::new(1.0, 2.0)).unwrap();

    assert!((completion.cost - 2.0).abs() < 1e-9);
}

#[test]
fn test_openAiResponse_withoutContent_shouldBeEmptyResponse() {
    let response: ChatCompletionResponse = serde_json::from_value(json!({"choices": []})).unwrap();

    let result = OpenAICompatible::into_completion(response, &Pricing::default());

    assert!(matches!(result, Err(ProviderError::EmptyResponse(_))));
}

#[test]
fn test_anthropicRequest_withJsonFormat_shouldAppendJsonInstruction() {
    let client = Anthropic::new("key", "https://api.anthropic.com", "claude-test", None);

    let body = serde_json::to_value(client.build_request(&CompletionRequest::json("Translate"))).unwrap();

    assert_eq!(body["model"], json!("claude-test"));
    assert_eq!(body["max_tokens"], json!(8192));
    let content = body["messages"][0]["content"].as_str().unwrap();
    assert!(content.starts_with("Translate"));
    assert!(content.contains("single JSON value"));
}

#[test]
fn test_anthropicResponse_shouldJoinTextBlocks() {
    let response: AnthropicResponse = serde_json::from_value(json!({
        "content": [{"type": "text", "text": "[[\"Sal"}, {"type": "text", "text": "ve.\"]]"}],
        "usage": {"input_tokens": 10, "output_tokens": 5}
    }))
    .unwrap();

    assert_eq!(Anthropic::extract_text_from_response(&response), "[[\"Salve.\"]]");
}

#[test]
fn test_ollamaRequest_withJsonFormat_shouldSetFormatAndDisableStreaming() {
    let client = Ollama::new("http://localhost:11434/", "gemma3:4b", None).with_temperature(Some(0.5));

    let body = serde_json::to_value(client.build_request(&CompletionRequest::json("Translate"))).unwrap();

    assert_eq!(body["model"], json!("gemma3:4b"));
    assert_eq!(body["format"], json!("json"));
    assert_eq!(body["stream"], json!(false));
    assert_eq!(body["options"]["temperature"], json!(0.5));
    assert_eq!(body["messages"][0]["content"], json!("Translate"));
}

#[tokio::test]
async fn test_mockProvider_scripted_shouldReplayInOrderAndRecord() {
    let mock = MockProvider::scripted(["one"]).then_fail("refused").with_cost(0.01);

    let first = mock.complete(CompletionRequest::json("a")).await.unwrap();
    let second = mock.complete(CompletionRequest::text("b")).await;
    let third = mock.complete(CompletionRequest::json("c")).await;

    assert_eq!(first.text, "one");
    assert_eq!(first.cost, 0.01);
    assert!(matches!(second, Err(ProviderError::ConnectionError(_))));
    assert!(third.is_err());
    assert_eq!(mock.request_count(), 3);
    assert_eq!(mock.prompts(), vec!["a", "b", "c"]);
    assert_eq!(mock.requests()[1].format, ResponseFormat::Text);
}
