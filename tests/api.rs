//! HTTP-level tests driving the router with `tower::ServiceExt::oneshot`.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use raffle_engine::api::{OPENAPI_PATH, build_router};
use raffle_engine::app_state::AppState;

async fn app() -> Router {
    build_router().with_state(AppState::new(common::service().await))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-actor", "ops@example.org");
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let Ok(request) = builder.body(body) else {
        panic!("request build failed");
    };
    let Ok(response) = app.clone().oneshot(request).await else {
        panic!("router is infallible");
    };
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body read failed");
    };
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(_) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        }
    };
    (status, value)
}

async fn create_raffle(app: &Router, winner_count: u32) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/raffles",
        Some(json!({ "name": "Launch raffle", "winner_count": winner_count })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let Some(id) = body["id"].as_str() else {
        panic!("raffle id missing: {body}");
    };
    id.to_string()
}

async fn register(app: &Router, raffle_id: &str, name: &str, phone: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        &format!("/api/v1/raffles/{raffle_id}/participants"),
        Some(json!({ "name": name, "phone": phone })),
    )
    .await
}

#[tokio::test]
async fn health_reports_database_up() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "up");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, OPENAPI_PATH, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/raffles/{id}/draws"].is_object());
}

#[tokio::test]
async fn full_draw_lifecycle() {
    let app = app().await;
    let raffle_id = create_raffle(&app, 2).await;

    for (name, phone) in [
        ("Ana Lopez", "1155550001"),
        ("Bruno Diaz", "1155550002"),
        ("Carla Ruiz", "1155550003"),
    ] {
        let (status, body) = register(&app, &raffle_id, name, phone).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert!(body["participant_id"].is_string());
    }

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/raffles/{raffle_id}/draws"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["winners"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["event"]["drawn_by"], "ops@example.org");
    let Some(event_id) = body["event"]["id"].as_str() else {
        panic!("event id missing: {body}");
    };
    let event_id = event_id.to_string();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/raffles/{raffle_id}/eligible"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/raffles/{raffle_id}/integrity?event_id={event_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    let reverse_uri = format!("/api/v1/raffles/{raffle_id}/draws/{event_id}/reverse");
    let (status, body) = send(
        &app,
        Method::POST,
        &reverse_uri,
        Some(json!({ "confirmation": "yes" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1003);

    let (status, body) = send(
        &app,
        Method::POST,
        &reverse_uri,
        Some(json!({ "confirmation": "REVERSE-DRAW" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["released"].as_array().map(Vec::len), Some(2));

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/raffles/{raffle_id}/eligible"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app().await;
    let raffle_id = create_raffle(&app, 1).await;

    let (status, _) = register(&app, &raffle_id, "Ana Lopez", "1155550001").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = register(&app, &raffle_id, "ANA LOPEZ", "115-555-0001").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 2101);
}

#[tokio::test]
async fn invalid_registration_names_the_field() {
    let app = app().await;
    let raffle_id = create_raffle(&app, 1).await;

    let (status, body) = register(&app, &raffle_id, "Ana Lopez", "12").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001);
    assert_eq!(body["error"]["details"], "phone");
}

#[tokio::test]
async fn draw_on_empty_raffle_is_unprocessable() {
    let app = app().await;
    let raffle_id = create_raffle(&app, 1).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/raffles/{raffle_id}/draws"),
        Some(json!({ "count": 1, "notes": "first round" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], 4001);
}

#[tokio::test]
async fn mutations_require_actor_header() {
    let app = app().await;
    let Ok(request) = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/raffles")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": "x", "winner_count": 1 }).to_string()))
    else {
        panic!("request build failed");
    };
    let Ok(response) = app.oneshot(request).await else {
        panic!("router is infallible");
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_raffle_returns_not_found() {
    let app = app().await;
    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(&app, Method::GET, &format!("/api/v1/raffles/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2001);
}

#[tokio::test]
async fn finished_raffle_cannot_be_reopened() {
    let app = app().await;
    let raffle_id = create_raffle(&app, 1).await;
    let uri = format!("/api/v1/raffles/{raffle_id}/status");

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "status": "finished" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "finished");

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "status": "active" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn participants_are_paginated() {
    let app = app().await;
    let raffle_id = create_raffle(&app, 1).await;
    for i in 0..5 {
        let name = format!("Person {i}");
        let (status, _) = register(&app, &raffle_id, &name, &format!("11555500{i:02}")).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/raffles/{raffle_id}/participants?page=2&per_page=2"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["total_pages"], 3);
}
