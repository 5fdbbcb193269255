//! HTTP-level tests for the OpenAI client against a mock server

#[cfg(test)]
mod http_tests {
    use crate::{
        ChatMessage, Embedder, Error, LLMProvider, OpenAIClient, OpenAIConfig, RetryConfig,
        ToolDefinition,
    };
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAIClient {
        let config = OpenAIConfig::new("sk-test".to_string())
            .with_api_base(server.uri())
            .with_retry(RetryConfig {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
            });
        OpenAIClient::new(config).unwrap()
    }

    fn completion(message: serde_json::Value, finish_reason: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": message, "finish_reason": finish_reason}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })
    }

    #[tokio::test]
    async fn test_generate_returns_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4-turbo",
                "messages": [{"role": "user", "content": "Tell me about knee pain"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                json!({"role": "assistant", "content": "Knee pain is common."}),
                "stop",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.generate("Tell me about knee pain").await.unwrap();

        assert_eq!(result.text, "Knee pain is common.");
        assert_eq!(result.model_id, "gpt-4-turbo");
        assert_eq!(result.tokens_used, Some(15));
    }

    #[tokio::test]
    async fn test_chat_binds_tools_and_parses_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "tools": [{"type": "function", "function": {"name": "vector_search"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                json!({
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "vector_search", "arguments": "{\"query\":\"knee pain\"}"}
                    }]
                }),
                "tool_calls",
            )))
            .mount(&server)
            .await;

        let tools = vec![ToolDefinition {
            name: "vector_search".to_string(),
            description: "Search case reports".to_string(),
            parameters: json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        }];

        let client = client_for(&server);
        let response = client
            .chat(&[ChatMessage::user("find knee pain cases")], &tools)
            .await
            .unwrap();

        assert_eq!(response.finish_reason.as_deref(), Some("tool_calls"));
        assert_eq!(response.message.tool_calls.len(), 1);
        assert_eq!(response.message.tool_calls[0].id, "call_abc");
        assert_eq!(response.message.tool_calls[0].name, "vector_search");
        assert_eq!(response.message.tool_calls[0].arguments, json!({"query": "knee pain"}));
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                json!({"role": "assistant", "content": "recovered"}),
                "stop",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.generate("hello").await.unwrap();
        assert_eq!(result.text, "recovered");
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, Error::Provider(ref msg) if msg.contains("invalid api key")));
    }

    #[tokio::test]
    async fn test_embed_requests_fixed_dimension() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_partial_json(json!({
                "model": "text-embedding-3-small",
                "input": "knee pain",
                "dimensions": 384
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"index": 0, "embedding": vec![0.05f32; 384]}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let embedding = client.embed("knee pain").await.unwrap();
        assert_eq!(embedding.len(), 384);
        assert_eq!(client.dimension(), 384);
    }

    #[tokio::test]
    async fn test_embed_rejects_wrong_dimension() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"index": 0, "embedding": [0.1, 0.2]}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.embed("knee pain").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[test]
    fn test_config_snapshot() {
        let config = OpenAIConfig::new("sk-redacted".to_string());

        insta::assert_yaml_snapshot!(config, {
            ".temperature" => "[temperature]",
            ".timeout" => "[timeout]",
            ".retry.base_delay" => "[delay]",
        }, @r#"
        api_key: sk-redacted
        api_base: "https://api.openai.com/v1"
        chat_model: gpt-4-turbo
        embedding_model: text-embedding-3-small
        embedding_dimension: 384
        temperature: "[temperature]"
        timeout: "[timeout]"
        retry:
          max_attempts: 3
          base_delay: "[delay]"
        "#);
    }
}
