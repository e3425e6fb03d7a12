use mockito::Matcher;
use sqlchat_agent::{AgentGateway, AgentRequest, Attachment, GatewayError, HttpAgentGateway};

fn gateway_for(server: &mockito::ServerGuard) -> HttpAgentGateway {
    HttpAgentGateway::builder()
        .endpoint(format!("{}/query", server.url()))
        .build()
        .unwrap()
}

#[test]
fn test_builder_missing_endpoint() {
    let result = HttpAgentGateway::builder().build();

    assert!(result.is_err());
    let err_msg = result.err().unwrap().to_string();
    assert!(err_msg.contains("Endpoint"));
}

#[test]
fn test_builder_blank_endpoint() {
    let result = HttpAgentGateway::builder().endpoint("   ").build();
    assert!(matches!(result, Err(GatewayError::Config(_))));
}

#[tokio::test]
async fn test_ask_returns_response_field() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/query")
        .match_header("content-type", Matcher::Regex("multipart/form-data".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="query""#.into()),
            Matcher::Regex("How many tracks are there\\?".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response":"There are 3503 tracks."}"#)
        .create_async()
        .await;

    let reply = gateway_for(&server)
        .ask(AgentRequest::new("How many tracks are there?"))
        .await
        .unwrap();

    assert_eq!(reply.text, "There are 3503 tracks.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ask_sends_database_part() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/query")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="database"; filename="chinook.db""#.into()),
            Matcher::Regex("SQLite format 3".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"response":"ok"}"#)
        .create_async()
        .await;

    let request = AgentRequest::new("List tables").with_attachment(Attachment::new(
        "chinook.db",
        b"SQLite format 3\0".to_vec(),
    ));
    let reply = gateway_for(&server).ask(request).await.unwrap();

    assert_eq!(reply.text, "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/query")
        .with_status(500)
        .with_body("agent crashed")
        .create_async()
        .await;

    let err = gateway_for(&server)
        .ask(AgentRequest::new("anything"))
        .await
        .unwrap_err();

    match err {
        GatewayError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "agent crashed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_response_field_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/query")
        .with_status(200)
        .with_body(r#"{"answer":"wrong key"}"#)
        .create_async()
        .await;

    let err = gateway_for(&server)
        .ask(AgentRequest::new("anything"))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_agent_is_transport_error() {
    let gateway = HttpAgentGateway::builder()
        .endpoint("http://127.0.0.1:1/query")
        .build()
        .unwrap();

    let err = gateway.ask(AgentRequest::new("anything")).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[test]
fn test_attachment_debug_hides_bytes() {
    let attachment = Attachment::new("big.db", vec![7u8; 1024]);
    let debug = format!("{:?}", attachment);

    assert!(debug.contains("big.db"));
    assert!(debug.contains("1024"));
    assert!(!debug.contains("7, 7"));
}
