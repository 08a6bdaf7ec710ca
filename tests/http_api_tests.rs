#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode, header},
};
use chrono::{FixedOffset, TimeZone};
use physio_tracker::{
    Exercise, ManualClock, MemoryStore, ProgressEntry, Tracker, http_api, quote::QuoteSource,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

const FALLBACK: &str = "Keep going!";

fn new_router() -> axum::Router {
    let now = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2025, 6, 4, 9, 30, 0)
        .unwrap();
    let clock = Arc::new(ManualClock::new(now));
    let tracker = Tracker::open(Box::new(MemoryStore::new()), clock, true).unwrap();
    // Nothing listens on the discard port.
    let quotes = QuoteSource::new(
        "http://127.0.0.1:9/quotes",
        FALLBACK,
        Duration::from_millis(500),
    );
    http_api::router(http_api::AppState::new(tracker, quotes))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn exercise_lifecycle_via_http_api() {
    let app = new_router();

    let response = app.clone().oneshot(empty_request("GET", "/exercises")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed: Vec<Exercise> = read_json(response).await;
    assert_eq!(listed.len(), 3);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/exercises",
            json!({
                "name": "Wall Angel",
                "description": "Slide arms up the wall",
                "durationMinutes": 5,
                "category": "Shoulder",
                "difficulty": "Medium",
                "scheduleTime": "08:00"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Exercise = read_json(response).await;
    assert_eq!(created.name, "Wall Angel");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/exercises/{}", created.id),
            json!({ "difficulty": "Hard" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Exercise = read_json(response).await;
    assert_eq!(updated.name, "Wall Angel");
    assert_eq!(updated.difficulty, Some(physio_tracker::Difficulty::Hard));

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/exercises/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert_eq!(body["success"], true);

    let response = app
        .oneshot(empty_request("GET", &format!("/exercises/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn incomplete_exercise_is_rejected() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/exercises",
            json!({ "name": "Wall Angel", "description": "", "duration": "5" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "invalid_request");

    let response = app.oneshot(empty_request("GET", "/exercises")).await.unwrap();
    let listed: Vec<Exercise> = read_json(response).await;
    assert_eq!(listed.len(), 3);
}

#[tokio::test]
async fn deleting_unknown_records_is_not_found() {
    let app = new_router();
    for uri in ["/exercises/404", "/progress/404", "/schedule/404"] {
        let response = app.clone().oneshot(empty_request("DELETE", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn exercise_listing_filters() {
    let app = new_router();
    for (name, category) in [("Chin Tuck", "Neck"), ("Squat", "Legs")] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/exercises",
                json!({
                    "name": name,
                    "description": "Ten reps",
                    "durationMinutes": 2,
                    "category": category,
                    "difficulty": "Easy"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/exercises?category=Legs&difficulty=All"))
        .await
        .unwrap();
    let listed: Vec<Exercise> = read_json(response).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Squat");

    let response = app
        .oneshot(empty_request("GET", "/exercises?category=Arms"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn progress_feeds_the_summary() {
    let app = new_router();
    for body in [
        json!({ "exerciseId": 1, "date": "2025-06-03" }),
        json!({ "exerciseId": 2 }),
        json!({ "exerciseId": 3 }),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/progress", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.clone().oneshot(empty_request("GET", "/progress")).await.unwrap();
    let progress: Vec<ProgressEntry> = read_json(response).await;
    assert_eq!(progress.len(), 3);
    assert_eq!(progress[1].date.to_string(), "2025-06-04");

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/progress/summary"))
        .await
        .unwrap();
    let summary: Value = read_json(response).await;
    assert_eq!(summary["streak"], 2);
    assert_eq!(summary["totalThisWeek"], 3);
    assert_eq!(summary["week"][0]["date"], "2025-06-02");
    assert_eq!(summary["week"][2]["sessions"], 2);

    let response = app
        .oneshot(empty_request("GET", "/progress/history"))
        .await
        .unwrap();
    let history: Value = read_json(response).await;
    assert_eq!(history, json!([
        { "date": "2025-06-03", "completed": 1 },
        { "date": "2025-06-04", "completed": 2 }
    ]));
}

async fn assert_invalid_request(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "invalid_request");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn malformed_progress_date_is_rejected() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/progress",
            json!({ "exerciseId": 1, "date": "2025-6-4" }),
        ))
        .await
        .unwrap();
    assert_invalid_request(response).await;

    let response = app
        .oneshot(json_request("POST", "/progress", json!({ "exerciseId": "one" })))
        .await
        .unwrap();
    assert_invalid_request(response).await;
}

#[tokio::test]
async fn unknown_category_or_difficulty_is_rejected() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/exercises",
            json!({
                "name": "Bicep Curl",
                "description": "Slow reps",
                "durationMinutes": 3,
                "category": "Arms"
            }),
        ))
        .await
        .unwrap();
    assert_invalid_request(response).await;

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/exercises/1", json!({ "difficulty": "Extreme" })))
        .await
        .unwrap();
    assert_invalid_request(response).await;

    let response = app.oneshot(empty_request("GET", "/exercises/1")).await.unwrap();
    let unchanged: Exercise = read_json(response).await;
    assert_eq!(unchanged.difficulty, None);
}

#[tokio::test]
async fn non_numeric_id_is_rejected() {
    let app = new_router();
    for (method, uri) in [
        ("DELETE", "/exercises/abc"),
        ("GET", "/exercises/1.5"),
        ("DELETE", "/progress/abc"),
    ] {
        let response = app.clone().oneshot(empty_request(method, uri)).await.unwrap();
        assert_invalid_request(response).await;
    }
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = new_router();
    let request = Request::builder()
        .method("POST")
        .uri("/exercises")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_invalid_request(response).await;
}

#[tokio::test]
async fn schedule_entries_crud() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/schedule",
            json!({ "exerciseId": 1, "scheduleTime": "2025-06-05T07:00" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = read_json(response).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/schedule/{id}"),
            json!({ "scheduleTime": "07:15" }),
        ))
        .await
        .unwrap();
    let updated: Value = read_json(response).await;
    assert_eq!(updated["scheduleTime"], "07:15");
    assert_eq!(updated["exerciseId"], 1);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/schedule",
            json!({ "exerciseId": 1, "scheduleTime": "soon" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/schedule/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(empty_request("GET", "/schedule")).await.unwrap();
    let listed: Vec<Value> = read_json(response).await;
    assert!(listed.is_empty());
}

#[tokio::test]
async fn progress_export_is_csv() {
    let app = new_router();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/progress",
            json!({ "exerciseId": 2, "date": "2025-06-01" }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(empty_request("GET", "/progress/export"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("id,exerciseId,date\n"));
    assert!(text.trim_end().ends_with(",2,2025-06-01"));
}

#[tokio::test]
async fn quote_falls_back_when_service_is_unreachable() {
    let app = new_router();
    let response = app.oneshot(empty_request("GET", "/quote")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let quote: Value = read_json(response).await;
    assert_eq!(quote["text"], FALLBACK);
}
