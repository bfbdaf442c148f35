use std::sync::Arc;

use chrono::NaiveDate;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use taskflow_auth::StaticToken;
use taskflow_core::{Category, Priority};
use taskflow_extract::ExtractMode;

use crate::client::TaskApi;
use crate::types::Engine;

fn api_for(server: &ServerGuard) -> TaskApi {
    TaskApi::new(server.url(), Arc::new(StaticToken("id.jwt".to_string())))
}

fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 11).unwrap()
}

#[tokio::test]
async fn test_extract_remote_posts_text_and_mode() {
    let mut server = Server::new_async().await;
    let extract = server
        .mock("POST", "/ai/extract")
        .match_header("authorization", "Bearer id.jwt")
        .match_body(Matcher::Json(json!({
            "text": "Please review the slides before Thursday",
            "mode": "email"
        })))
        .with_status(200)
        .with_body(
            json!({
                "todos": [{
                    "id": "x1",
                    "title": "Review the slides",
                    "category": "work",
                    "priority": "high",
                    "dueDate": "2025-06-12",
                    "completed": false,
                    "createdAt": "2025-06-11T10:00:00Z",
                    "source": "extracted"
                }]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let extraction = api_for(&server)
        .extract_todos(
            "Please review the slides before Thursday",
            ExtractMode::Email,
            wednesday(),
        )
        .await;

    extract.assert_async().await;
    assert_eq!(extraction.engine, Engine::Remote);
    assert_eq!(extraction.tasks.len(), 1);
    assert_eq!(extraction.tasks[0].title, "Review the slides");
    assert_eq!(
        extraction.tasks[0].due_date,
        Some(NaiveDate::from_ymd_opt(2025, 6, 12).unwrap())
    );
}

#[tokio::test]
async fn test_extraction_falls_back_to_keyword_engine() {
    let mut server = Server::new_async().await;
    let extract = server
        .mock("POST", "/ai/extract")
        .with_status(500)
        .with_body(r#"{"error":"Internal server error"}"#)
        .expect(3)
        .create_async()
        .await;

    let extraction = api_for(&server)
        .extract_todos("- gym session friday", ExtractMode::General, wednesday())
        .await;

    extract.assert_async().await;
    assert_eq!(extraction.engine, Engine::Local);
    assert_eq!(extraction.tasks.len(), 1);
    assert_eq!(extraction.tasks[0].title, "gym session friday");
    assert_eq!(extraction.tasks[0].category, Category::Health);
    assert_eq!(extraction.tasks[0].priority, Priority::Medium);
    assert_eq!(
        extraction.tasks[0].due_date,
        Some(NaiveDate::from_ymd_opt(2025, 6, 13).unwrap())
    );
}

#[tokio::test]
async fn test_extract_remote_alone_surfaces_errors() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/ai/extract")
        .with_status(400)
        .with_body(r#"{"error":"Text is required"}"#)
        .create_async()
        .await;

    let err = api_for(&server)
        .extract_remote("", ExtractMode::General)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::BAD_REQUEST));
}
