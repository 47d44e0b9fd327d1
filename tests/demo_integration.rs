mod common;

use axum::http::{header, StatusCode};
use tower::ServiceExt;

use common::{body_text, build_app, config_with, get};

#[tokio::test]
async fn successful_requests_are_counted() {
    let app = build_app(config_with(0.0));

    for _ in 0..3 {
        let response = app.clone().oneshot(get("/")).await.expect("request should complete");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get("/metrics")).await.expect("scrape should complete");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; version=0.0.4; charset=utf-8"
    );

    let body = body_text(response).await;
    assert!(body.contains("# TYPE request_count counter\n"), "{}", body);
    assert!(body.contains("request_count{origin=\"itest\"} 3\n"), "{}", body);
    assert!(body.contains("response_latency{origin=\"itest\"} "), "{}", body);
    assert!(!body.contains("error_count{"), "{}", body);
}

#[tokio::test]
async fn simulated_failures_return_500_and_bump_error_count() {
    let app = build_app(config_with(1.0));

    let response = app.clone().oneshot(get("/")).await.expect("request should complete");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let error: serde_json::Value =
        serde_json::from_str(&body_text(response).await).expect("error body should be JSON");
    assert_eq!(error["error"], "Simulated failure");

    let body = body_text(app.oneshot(get("/metrics")).await.unwrap()).await;
    assert!(body.contains("request_count{origin=\"itest\"} 1\n"), "{}", body);
    assert!(body.contains("error_count{origin=\"itest\"} 1\n"), "{}", body);
}

#[tokio::test]
async fn scrape_before_traffic_lists_headers_only() {
    let app = build_app(config_with(0.0));

    let body = body_text(app.oneshot(get("/metrics")).await.unwrap()).await;
    assert_eq!(
        body,
        "# HELP request_count Total number of requests served\n\
         # TYPE request_count counter\n\
         # HELP error_count Total number of requests that failed\n\
         # TYPE error_count counter\n\
         # HELP response_latency Latency of the most recent response in milliseconds\n\
         # TYPE response_latency gauge\n"
    );
}

#[tokio::test]
async fn apps_do_not_share_metrics() {
    let first = build_app(config_with(0.0));
    let second = build_app(config_with(0.0));

    first.clone().oneshot(get("/")).await.unwrap();

    let body = body_text(second.oneshot(get("/metrics")).await.unwrap()).await;
    assert!(!body.contains("request_count{"), "{}", body);
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let app = build_app(config_with(0.0));

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");

    let response = app.oneshot(get("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
