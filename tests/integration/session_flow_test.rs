use cimr_core::{
    ChatSession, CimrConfig, HttpBackend, ModuleMapping, QueryBackend, Registry, Route, Sender,
    SessionState, FALLBACK_REPLY,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn open_session() -> ChatSession {
    ChatSession::new(Registry::builtin(), ModuleMapping::default()).unwrap()
}

mod submission_tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_backend_yields_one_fallback_message() {
        let backend = HttpBackend::new("http://127.0.0.1:1");
        let mut session = open_session();

        let reply = session.submit(&backend, "Hello").await.unwrap();
        assert_eq!(reply.content, FALLBACK_REPLY);
        assert!(reply.images.is_none());

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].sender, Sender::User);
        assert_eq!(messages[1].content, "Hello");
        assert_eq!(messages[2].sender, Sender::Agent);
        assert_eq!(
            messages[2].agent_name.as_deref(),
            Some("Financial Data Agent")
        );
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_successful_reply_with_chart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_partial_json(json!({
                "module": "company_valuation",
                "agent": "financial_data_agent"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "response": "## Valuation\nFair value: 42\n\nplot_IFRS Capital (central)_20240101_120000.png",
                "module": "company_valuation",
                "agent": "financial_data_agent"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let mut session = open_session();
        let reply = session
            .submit(&backend, "What is Acme worth?")
            .await
            .unwrap();

        assert!(reply.content.starts_with("## Valuation"));
        assert_eq!(
            reply.images.as_deref(),
            Some(&["plot_IFRS Capital (central)_20240101_120000.png".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_backend_reported_failure_becomes_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "response": "",
                "error": "module crashed"
            })))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let mut session = open_session();
        let reply = session.submit(&backend, "Hello").await.unwrap();
        assert_eq!(reply.content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_server_error_becomes_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let mut session = open_session();
        let reply = session.submit(&backend, "Hello").await.unwrap();
        assert_eq!(reply.content, FALLBACK_REPLY);
        assert_eq!(session.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_timeout_becomes_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut config = CimrConfig::default();
        config.backend.url = server.uri();
        config.backend.request_timeout_secs = Some(1);
        let backend = HttpBackend::from_config(&config.backend).unwrap();

        let mut session = open_session();
        let reply = session.submit(&backend, "Hello").await.unwrap();
        assert_eq!(reply.content, FALLBACK_REPLY);
    }
}

mod agent_switch_tests {
    use super::*;

    #[tokio::test]
    async fn test_switching_agent_resets_conversation() {
        let backend = HttpBackend::new("http://127.0.0.1:1");
        let mut session = open_session();
        session.submit(&backend, "Hello").await.unwrap();
        assert_eq!(session.messages().len(), 3);

        session.select_agent_by_id("income_statement_analyst").unwrap();
        assert_eq!(session.messages().len(), 1);
        assert!(session.messages()[0]
            .content
            .contains("I specialize in: Revenue Growth Rates"));
    }

    #[tokio::test]
    async fn test_switched_agent_is_addressed_in_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_partial_json(json!({
                "module": "company_valuation_v2",
                "agent": "chief_financial_analyst"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "response": "Buy"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let mut session = open_session();
        session.select_agent_by_id("chief_financial_analyst").unwrap();
        let reply = session.submit(&backend, "Recommendation?").await.unwrap();
        assert_eq!(reply.content, "Buy");
    }
}

mod route_tests {
    use super::*;

    #[test]
    fn test_chat_route_opens_on_sub_team_agent() {
        let registry = Registry::builtin();
        let route = Route::parse("/team/company_valuation_v2/subteam/financial-analysis/chat");
        let agent = route.initial_agent(&registry).unwrap();

        let session = ChatSession::with_agent(registry, ModuleMapping::default(), agent);
        assert_eq!(session.selected().id(), "income_statement_analyst");
        assert_eq!(
            session.messages()[0].content,
            "Hello! I'm Income Statement Analyst. How can I help you today?"
        );
    }

    #[tokio::test]
    async fn test_backend_trait_object() {
        let backend: Box<dyn QueryBackend> = Box::new(HttpBackend::new("http://127.0.0.1:1"));
        let mut session = open_session();
        let reply = session.submit(backend.as_ref(), "Hi").await.unwrap();
        assert_eq!(reply.content, FALLBACK_REPLY);
    }
}
