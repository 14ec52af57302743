//! Client round trips against the in-memory fake webservice.

#![allow(clippy::unwrap_used, clippy::panic)]

use a11y_dashboard_core::{IssueType, Standard, TaskDraft, TaskEdit};
use a11y_webservice_client::testing::{
    FakeWebservice, sample_issue, sample_result, sample_task, unused_local_url,
};
use a11y_webservice_client::{WebserviceClient, WebserviceError};
use axum::http::StatusCode;

async fn setup() -> (FakeWebservice, WebserviceClient) {
    let fake = FakeWebservice::new();
    fake.insert_task(sample_task("t1", "Home", "https://example.com/"));
    fake.insert_result(sample_result(
        "r1",
        "t1",
        "2024-03-01T10:00:00Z",
        vec![sample_issue("WCAG2AA.H37", IssueType::Error, "Missing alt")],
    ));
    fake.insert_result(sample_result("r2", "t1", "2024-03-02T10:00:00Z", Vec::new()));
    let url = fake.spawn().await.unwrap();
    let client = WebserviceClient::new(&url).unwrap();
    (fake, client)
}

#[test]
fn rejects_non_http_urls() {
    assert!(matches!(
        WebserviceClient::new("ftp://example.com/"),
        Err(WebserviceError::InvalidUrl(_))
    ));
    assert!(matches!(
        WebserviceClient::new("not a url"),
        Err(WebserviceError::InvalidUrl(_))
    ));
}

#[tokio::test]
async fn lists_tasks_with_last_result() {
    let (_fake, client) = setup().await;

    let tasks = client.tasks(true).await.unwrap();
    assert_eq!(tasks.len(), 1);
    let last = tasks[0].last_result.as_ref().unwrap();
    assert_eq!(last.id, "r2");
    assert!(last.results.is_none());

    let bare = client.tasks(false).await.unwrap();
    assert!(bare[0].last_result.is_none());
}

#[tokio::test]
async fn creates_and_edits_a_task() {
    let (fake, client) = setup().await;

    let draft = TaskDraft {
        name: "Contact".to_string(),
        url: "https://example.com/contact".to_string(),
        standard: Standard::Wcag2AAA,
        ..TaskDraft::default()
    };
    let created = client.create_task(&draft).await.unwrap();
    assert_eq!(created.name, "Contact");
    assert_eq!(created.id.len(), 24);

    client
        .edit_task(&created.id, &TaskEdit::ignore(vec!["rule-a".to_string()]))
        .await
        .unwrap();
    let stored = fake.task(&created.id).unwrap();
    assert_eq!(stored.ignore, vec!["rule-a"]);
    assert_eq!(stored.standard, Standard::Wcag2AAA);
}

#[tokio::test]
async fn create_rejection_carries_message() {
    let (_fake, client) = setup().await;

    let draft = TaskDraft {
        url: "https://example.com".to_string(),
        ..TaskDraft::default()
    };
    match client.create_task(&draft).await {
        Err(WebserviceError::Invalid(message)) => assert!(message.contains("name")),
        other => panic!("expected Invalid, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_task_is_not_found() {
    let (_fake, client) = setup().await;

    assert_eq!(
        client.task("nope", false).await.unwrap_err(),
        WebserviceError::NotFound
    );
    assert_eq!(
        client.result("t1", "nope").await.unwrap_err(),
        WebserviceError::NotFound
    );
}

#[tokio::test]
async fn results_are_newest_first_and_full_on_request() {
    let (_fake, client) = setup().await;

    let summaries = client.results("t1").await.unwrap();
    let ids: Vec<&str> = summaries.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r2", "r1"]);
    assert!(summaries.iter().all(|r| r.results.is_none()));

    let full = client.result("t1", "r1").await.unwrap();
    assert_eq!(full.results.unwrap().len(), 1);
}

#[tokio::test]
async fn run_and_delete() {
    let (fake, client) = setup().await;

    client.run_task("t1").await.unwrap();
    assert_eq!(fake.runs(), vec!["t1"]);

    client.delete_task("t1").await.unwrap();
    assert!(fake.tasks().is_empty());
    assert_eq!(
        client.delete_task("t1").await.unwrap_err(),
        WebserviceError::NotFound
    );
}

#[tokio::test]
async fn server_failure_maps_to_status() {
    let (fake, client) = setup().await;
    fake.fail_with(Some(StatusCode::INTERNAL_SERVER_ERROR));

    match client.tasks(true).await {
        Err(WebserviceError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Injected failure");
        }
        other => panic!("expected Status, got {:?}", other),
    }
}

#[tokio::test]
async fn refused_connection_is_classified() {
    let url = unused_local_url().unwrap();
    let client = WebserviceClient::new(&url).unwrap();

    let err = client.tasks(true).await.unwrap_err();
    assert!(matches!(err, WebserviceError::ConnectionRefused(_)), "{:?}", err);
    assert!(err.is_unreachable());
}
