use anyhow::Result;

use super::WorkflowClient;
use crate::domain::models::WorkflowReply;
use crate::domain::models::PLACEHOLDER_WORKFLOW_URL;

impl WorkflowClient {
    fn with_url(url: String) -> WorkflowClient {
        return WorkflowClient {
            client: reqwest::Client::new(),
            url,
        };
    }
}

#[tokio::test]
async fn it_posts_chat_input() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/webhook/abc")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "chatInput": "show 1crn",
            "sessionId": "session-1",
        })))
        .with_status(200)
        .with_body(r#"{"message": "ok"}"#)
        .create_async()
        .await;

    let client = WorkflowClient::with_url(format!("{}/webhook/abc", server.url()));
    let res = client.send("show 1crn", "session-1").await?;

    mock.assert_async().await;
    assert_eq!(
        res,
        WorkflowReply::Generic {
            text: "ok".to_string(),
            cmd: None
        }
    );

    return Ok(());
}

#[tokio::test]
async fn it_fails_on_bad_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/webhook/abc")
        .with_status(502)
        .create_async()
        .await;

    let client = WorkflowClient::with_url(format!("{}/webhook/abc", server.url()));
    let res = client.send("hi", "session-1").await;

    mock.assert_async().await;
    assert_eq!(res.unwrap_err().to_string(), "HTTP error! status: 502");
}

#[tokio::test]
async fn it_rejects_missing_and_placeholder_urls() {
    let client = WorkflowClient::with_url("".to_string());
    assert!(client.check_configured().is_err());
    assert!(client.send("hi", "session-1").await.is_err());

    let client = WorkflowClient::with_url(PLACEHOLDER_WORKFLOW_URL.to_string());
    let err = client.send("hi", "session-1").await.unwrap_err();
    assert!(err.to_string().contains("placeholder"));
}
