//! Integration tests for the agent and its tools

#[cfg(test)]
mod agent_tests {
    use crate::{
        AgentConfig, AgentStep, ChatMessage, SendEmailTool, Tool, ToolCall, ToolRouter,
        default_registry,
    };
    use casebot_core::testing::{ScriptedLLM, StaticStore};
    use insta::assert_yaml_snapshot;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn email_tool(server: &MockServer) -> SendEmailTool {
        SendEmailTool::new(Some(format!("{}/send", server.uri())), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_email_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(body_json(json!({
                "to": "dr.lee@example.com",
                "subject": "Knee pain findings",
                "message": "Three relevant cases.",
                "html": ""
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let output = email_tool(&server)
            .execute(json!({
                "to": "dr.lee@example.com",
                "subject": "Knee pain findings",
                "message": "Three relevant cases."
            }))
            .await;

        assert_eq!(
            output,
            "Email sent successfully to dr.lee@example.com with subject: 'Knee pain findings'"
        );
    }

    #[tokio::test]
    async fn test_email_non_200_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let output = email_tool(&server)
            .execute(json!({"to": "a@b.org", "message": "hi"}))
            .await;

        assert_eq!(output, "Failed to send email. Status code: 202");
    }

    #[tokio::test]
    async fn test_email_without_recipient_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tool = email_tool(&server);
        for args in [
            json!({"message": "no recipient"}),
            json!({"to": "   ", "message": "blank recipient"}),
            json!("just some text"),
        ] {
            assert_eq!(
                tool.execute(args).await,
                "Error sending email: recipient is required"
            );
        }
    }

    #[tokio::test]
    async fn test_email_transport_error_is_text() {
        let tool = SendEmailTool::new(
            Some("http://127.0.0.1:9/unreachable".to_string()),
            Duration::from_secs(2),
        )
        .unwrap();

        let output = tool.execute(json!({"to": "a@b.org", "message": "hi"})).await;
        assert!(output.starts_with("Error sending email: "));
    }

    #[tokio::test]
    async fn test_search_then_email_run() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(StaticStore::with_documents(vec![(
            "Runner with anterior knee pain",
            0.91,
        )]));
        let config = AgentConfig::default().with_email_api_url(format!("{}/send", server.uri()));
        let registry = Arc::new(default_registry(store, &config).unwrap());

        let llm = Arc::new(
            ScriptedLLM::new()
                .then_call_tools(vec![ToolCall::new(
                    "call_1",
                    "vector_search",
                    json!({"query": "knee pain"}),
                )])
                .then_call_tools(vec![ToolCall::new(
                    "call_2",
                    "send_email",
                    json!({"to": "dr.lee@example.com", "message": "One runner with knee pain."}),
                )])
                .then_reply("I found one case and emailed dr.lee@example.com."),
        );
        let router = ToolRouter::new(llm.clone(), registry, config);

        let run = router
            .run(&[ChatMessage::user("Find knee pain cases and email dr.lee@example.com")])
            .await
            .unwrap();

        assert_eq!(run.model_calls, 3);
        assert_eq!(
            run.steps,
            vec![
                AgentStep::ToolCall {
                    name: "vector_search".to_string(),
                    arguments: json!({"query": "knee pain"}),
                },
                AgentStep::ToolResult {
                    name: "vector_search".to_string(),
                    output: "Document 1 (relevance score: 0.910):\nRunner with anterior knee pain\n"
                        .to_string(),
                },
                AgentStep::ToolCall {
                    name: "send_email".to_string(),
                    arguments: json!({"to": "dr.lee@example.com", "message": "One runner with knee pain."}),
                },
                AgentStep::ToolResult {
                    name: "send_email".to_string(),
                    output: "Email sent successfully to dr.lee@example.com with subject: \
                             'Message from Vector Search App'"
                        .to_string(),
                },
                AgentStep::ModelResponse {
                    content: "I found one case and emailed dr.lee@example.com.".to_string(),
                },
            ]
        );
        assert!(matches!(run.steps.last(), Some(AgentStep::ModelResponse { .. })));
    }

    #[test]
    fn test_tool_definitions_snapshot() {
        let registry = default_registry(Arc::new(StaticStore::empty()), &AgentConfig::default()).unwrap();
        let names: Vec<String> = registry
            .get_tool_definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();

        assert_yaml_snapshot!(names, @r"
        - send_email
        - vector_search
        ");
    }
}
