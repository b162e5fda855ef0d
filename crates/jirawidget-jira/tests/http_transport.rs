//! End-to-end checks of the reqwest transport against a local mock server.

use httpmock::prelude::*;
use jirawidget_jira::{Error, JiraClient, Session, SessionCookie};
use std::time::Duration;

const ISSUE_BODY: &str = r#"{
    "key": "PC-12",
    "fields": {
        "summary": "Transport test",
        "issuelinks": [
            {"type": {"name": "Activities"}, "outwardIssue": {"fields": {"status": {"name": "Done"}}}},
            {"type": {"name": "Activities"}, "outwardIssue": {"fields": {"status": {"name": "Done"}}}},
            {"type": {"name": "Activities"}, "outwardIssue": {"fields": {"status": {"name": "Open"}}}}
        ]
    }
}"#;

fn bearer_client(server: &MockServer) -> JiraClient {
    let session = Session::bearer(&server.base_url(), "  secret-pat  ").unwrap();
    JiraClient::connect(session, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_validate_sends_bearer_and_accept_headers() {
    let server = MockServer::start_async().await;
    let myself = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/api/3/myself")
                .header("authorization", "Bearer secret-pat")
                .header("accept", "application/json");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"name":"me"}"#);
        })
        .await;

    bearer_client(&server).validate().await.unwrap();
    myself.assert_async().await;
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.path("/login.jsp");
            then.status(200).body("<html>login</html>");
        })
        .await;
    let myself = server
        .mock_async(|when, then| {
            when.path("/rest/api/3/myself");
            then.status(302).header("location", server.url("/login.jsp"));
        })
        .await;

    let err = bearer_client(&server).validate().await.unwrap_err();

    assert!(err.is_redirect());
    myself.assert_async().await;
    login.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_fetch_issue_falls_back_to_v2() {
    let server = MockServer::start_async().await;
    let v3 = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/api/3/issue/PC-12")
                .query_param("fields", "summary,status,issuelinks");
            then.status(404)
                .header("content-type", "application/json")
                .body(r#"{"errorMessages":["Not on v3"],"errors":{}}"#);
        })
        .await;
    let v2 = server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/api/2/issue/PC-12");
            then.status(200)
                .header("content-type", "application/json")
                .body(ISSUE_BODY);
        })
        .await;

    let issue = bearer_client(&server).fetch_issue("PC-12").await.unwrap();

    assert_eq!(issue.key, "PC-12");
    assert_eq!(jirawidget_core::progress::calculate(&issue), 66);
    v3.assert_async().await;
    v2.assert_async().await;
}

#[tokio::test]
async fn test_html_success_on_both_versions_is_non_json() {
    let server = MockServer::start_async().await;
    let pages = server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/issue/PC-5");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<html>\n<body>Sign in with Okta</body>\n</html>");
        })
        .await;

    let err = bearer_client(&server).fetch_issue("PC-5").await.unwrap_err();

    assert!(matches!(err, Error::NonJson { status: 200, .. }));
    pages.assert_hits_async(2).await;
}

#[tokio::test]
async fn test_cookie_session_sends_cookie_header() {
    let server = MockServer::start_async().await;
    let myself = server
        .mock_async(|when, then| {
            when.path("/rest/api/3/myself")
                .header("cookie", "JSESSIONID=abc123");
            then.status(200).header("content-type", "application/json").body("{}");
        })
        .await;

    let session = Session::cookies(
        &server.base_url(),
        vec![
            SessionCookie::new("JSESSIONID", "abc123", "127.0.0.1"),
            SessionCookie::new("other", "nope", "sso.example.com"),
        ],
    )
    .unwrap();
    let client = JiraClient::connect(session, Duration::from_secs(5)).unwrap();

    client.validate().await.unwrap();
    myself.assert_async().await;
}

#[tokio::test]
async fn test_slow_server_hits_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.path("/rest/api/3/myself");
            then.status(200).delay(Duration::from_secs(2)).body("{}");
        })
        .await;

    let session = Session::bearer(&server.base_url(), "pat").unwrap();
    let client = JiraClient::connect(session, Duration::from_millis(200)).unwrap();

    let err = client.validate().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.to_string().starts_with("exception: "));
}
