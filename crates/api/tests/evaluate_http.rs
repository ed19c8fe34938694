//! End-to-end HTTP tests against a scripted stub Judge (§8 S1, S6-adjacent).

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ceval_api::{create_router, AppState};
use ceval_core::{
    Anchor, CoreResult, Judge, OrdinalSchema, OrdinalStrategy, OutputRange, Schema, SchemaKind,
    SchemeId, ValueType,
};
use ceval_engine::{Evaluator, SchemaRegistry};
use ceval_judge::{JudgeCallConfig, LlmCaller, RetryConfig};
use http_body_util::BodyExt;
use tower::ServiceExt;

struct StubJudge;

#[async_trait::async_trait]
impl Judge for StubJudge {
    async fn judge(&self, _system: &str, _user: &str, _temperature: f32, _max_tokens: u32) -> CoreResult<String> {
        Ok(r#"{"value": 4, "reasoning": "clear", "confidence": 0.88}"#.to_string())
    }
}

fn ordinal_schema() -> Schema {
    Schema {
        id: SchemeId::new("neutrality"),
        name: "Neutrality".into(),
        dimension: "neutrality".into(),
        output_range: OutputRange::Numeric { min: 1.0, max: 5.0, value_type: ValueType::Float },
        labels: None,
        default: None,
        dependencies: vec![],
        kind: SchemaKind::Ordinal(OrdinalSchema {
            anchors: vec![Anchor { value: 4.0, label: "Mostly neutral".into(), criteria_text: "x".into() }],
            strategy: OrdinalStrategy::FirstMatch,
        }),
    }
}

fn test_state() -> AppState {
    let registry = Arc::new(SchemaRegistry::build(vec![ordinal_schema()]).unwrap());
    let caller = Arc::new(LlmCaller::new(Arc::new(StubJudge), 4, RetryConfig::default(), Duration::from_secs(5)));
    let evaluator = Arc::new(Evaluator::new(registry.clone(), caller, JudgeCallConfig::new("stub")));
    AppState::new(registry, evaluator, "stub")
}

#[tokio::test]
async fn health_reports_loaded_schema_count() {
    let app = create_router(test_state(), Duration::from_secs(5));
    let response =
        app.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["schemas_loaded"], 1);
}

#[tokio::test]
async fn evaluate_returns_ordinal_result() {
    let app = create_router(test_state(), Duration::from_secs(5));
    let body = serde_json::json!({"text": "some content", "schemes": ["neutrality"]}).to_string();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/evaluate")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["results"][0]["value"], 4);
    assert_eq!(json["gates_passed"], true);
}

#[tokio::test]
async fn evaluate_rejects_unknown_scheme() {
    let app = create_router(test_state(), Duration::from_secs(5));
    let body = serde_json::json!({"text": "x", "schemes": ["does_not_exist"]}).to_string();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/evaluate")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn evaluate_rejects_empty_text() {
    let app = create_router(test_state(), Duration::from_secs(5));
    let body = serde_json::json!({"text": "  ", "schemes": ["neutrality"]}).to_string();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/evaluate")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
