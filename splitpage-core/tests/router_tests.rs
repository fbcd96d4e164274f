// End-to-end tests for the request orchestrator against mock catalog and variant servers

use reqwest::StatusCode;
use splitpage_core::rewrite::{DEFAULT_LINK_HREF, DEFAULT_LINK_TEXT};
use splitpage_core::{
    CoreError, INTERNAL_ERROR_BODY, RewriteOptions, RewriteRules, VariantResponse, VariantRouter,
};
use splitpage_fetch::Fetcher;
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const VARIANT_PAGE: &str = concat!(
    "<html><head><title>Old</title></head><body>",
    r#"<h1 id="title">Variant 1</h1>"#,
    r#"<p id="description">This is option one</p>"#,
    r#"<a id="url" href="https://old.example">Old link</a>"#,
    "</body></html>",
);

fn router_for(catalog_server: &MockServer) -> VariantRouter {
    let fetcher = Fetcher::new(&format!("{}/api/variants", catalog_server.uri())).unwrap();
    let rules = RewriteRules::new(RewriteOptions::default()).unwrap();
    VariantRouter::new(fetcher, Arc::new(rules))
}

async fn mount_catalog(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/variants"))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.as_bytes(), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn catalog_json(variants: &[String]) -> String {
    serde_json::json!({ "variants": variants }).to_string()
}

async fn assert_internal_error(response: VariantResponse) {
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.header_str("content-type"), Some("text/plain"));
    assert!(response.header_str("set-cookie").is_none());
    assert_eq!(response.into_body_string().await.unwrap(), INTERNAL_ERROR_BODY);
}

// ============================================================================
// Success Path
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_single_variant_is_fetched_rewritten_and_pinned() {
    let mock_server = MockServer::start().await;
    let p1 = format!("{}/p1", mock_server.uri());
    mount_catalog(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(catalog_json(&[p1.clone()])),
    )
    .await;
    mount_page(&mock_server, "/p1", VARIANT_PAGE).await;

    let response = router_for(&mock_server).handle(None).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header_str("set-cookie"), Some(format!("variant={}", p1).as_str()));
    assert_eq!(
        response.header_str("content-type"),
        Some("text/html; charset=utf-8")
    );

    let html = response.into_body_string().await.unwrap();
    assert!(html.contains("<title>Your Variant!</title>"));
    assert!(html.contains(r#"<h1 id="title">Variant #1</h1>"#));
    assert!(html.contains(r#"<p id="description">This is option number one</p>"#));
    assert!(html.contains(&format!(
        r#"<a id="url" href="{}">{}</a>"#,
        DEFAULT_LINK_HREF, DEFAULT_LINK_TEXT
    )));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_known_cookie_pins_variant() {
    let mock_server = MockServer::start().await;
    let p1 = format!("{}/p1", mock_server.uri());
    let p2 = format!("{}/p2", mock_server.uri());
    mount_catalog(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(catalog_json(&[p1.clone(), p2.clone()])),
    )
    .await;
    mount_page(&mock_server, "/p1", r#"<h1 id="title">Variant 1</h1>"#).await;
    mount_page(&mock_server, "/p2", r#"<h1 id="title">Variant 2</h1>"#).await;

    let router = router_for(&mock_server);
    let cookie = format!("theme=dark; variant={}", p2);

    for _ in 0..10 {
        let response = router.handle(Some(&cookie)).await.unwrap();
        assert_eq!(response.header_str("set-cookie"), Some(format!("variant={}", p2).as_str()));
        let html = response.into_body_string().await.unwrap();
        assert_eq!(html, r#"<h1 id="title">Variant #2</h1>"#);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_cookie_is_never_fetched() {
    let mock_server = MockServer::start().await;
    let evil_server = MockServer::start().await;
    let p1 = format!("{}/p1", mock_server.uri());
    let phish = format!("{}/phish", evil_server.uri());

    mount_catalog(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(catalog_json(&[p1.clone()])),
    )
    .await;
    mount_page(&mock_server, "/p1", VARIANT_PAGE).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("phished"))
        .expect(0)
        .mount(&evil_server)
        .await;

    let response = router_for(&mock_server)
        .handle(Some(&format!("variant={}", phish)))
        .await
        .unwrap();

    assert_eq!(response.header_str("set-cookie"), Some(format!("variant={}", p1).as_str()));
    let html = response.into_body_string().await.unwrap();
    assert!(!html.contains("phished"));
    assert!(html.contains("Variant #1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_variant_page_status_passes_through() {
    let mock_server = MockServer::start().await;
    let p1 = format!("{}/p1", mock_server.uri());
    mount_catalog(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(catalog_json(&[p1.clone()])),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<title>Gone</title>"))
        .mount(&mock_server)
        .await;

    let response = router_for(&mock_server).handle(None).await.unwrap();

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.header_str("set-cookie"), Some(format!("variant={}", p1).as_str()));
    assert_eq!(
        response.into_body_string().await.unwrap(),
        "<title>Your Variant!</title>"
    );
}

// ============================================================================
// Catalog Failures
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_catalog_unavailable() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, ResponseTemplate::new(503)).await;

    let response = router_for(&mock_server).handle(None).await.unwrap();

    assert_internal_error(response).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_catalog_empty() {
    let mock_server = MockServer::start().await;
    mount_catalog(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(r#"{"variants":[]}"#),
    )
    .await;

    let response = router_for(&mock_server)
        .handle(Some("variant=https://a.example/p1"))
        .await
        .unwrap();

    assert_internal_error(response).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_catalog_malformed() {
    let mock_server = MockServer::start().await;
    mount_catalog(
        &mock_server,
        ResponseTemplate::new(200).set_body_string("not json"),
    )
    .await;

    let response = router_for(&mock_server).handle(None).await.unwrap();

    assert_internal_error(response).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_catalog_unreachable() {
    let fetcher = Fetcher::new("http://127.0.0.1:1/api/variants").unwrap();
    let rules = RewriteRules::new(RewriteOptions::default()).unwrap();
    let router = VariantRouter::new(fetcher, Arc::new(rules));

    let response = router.handle(None).await.unwrap();

    assert_internal_error(response).await;
}

// ============================================================================
// Variant Page Failures
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_variant_fetch_failure_propagates() {
    let mock_server = MockServer::start().await;
    let unreachable = "http://127.0.0.1:1/p1".to_string();

    mount_catalog(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(catalog_json(&[unreachable])),
    )
    .await;

    let result = router_for(&mock_server).handle(None).await;

    assert!(matches!(result, Err(CoreError::Fetch(_))));
}
