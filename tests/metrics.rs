// tests/metrics.rs
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use research_agent_api::config::AppConfig;

// Full app as the binary builds it, with the metrics route on and history in a temp dir.
fn build_app(dir: &tempfile::TempDir) -> Router {
    let cfg = AppConfig {
        history_path: dir.path().join("history.json"),
        default_depth: 2,
        metrics_route: true,
    };
    research_agent_api::create_router(&cfg).expect("create_router should build in tests")
}

async fn body_text(resp: axum::response::Response) -> String {
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn metrics_endpoint_exposes_research_series() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(&dir);

    // depth 0 short-circuits before any fetch, so no network is touched
    let resp = app
        .clone()
        .oneshot(
            Request::get("/api/research?topic=sri%20lanka&depth=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let text = body_text(resp).await;
    for needle in ["research_runs_total", "history_appends_total"] {
        assert!(text.contains(needle), "missing series {needle} in:\n{text}");
    }

    // history mirrored to disk
    let raw = std::fs::read_to_string(dir.path().join("history.json")).unwrap();
    assert!(raw.contains("\"topic\":\"sri lanka\""));
}
