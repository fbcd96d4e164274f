use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CONNECTION, COOKIE, TRANSFER_ENCODING};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use splitpage_core::{RewriteOptions, RewriteRules, VariantResponse, VariantRouter};
use splitpage_fetch::Fetcher;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

const KEEP_ALIVE: &str = "keep-alive";

/// Everything `serve` needs, gathered from the command line.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub listen: SocketAddr,
    pub catalog_url: String,
    pub timeout_secs: Option<u64>,
    pub rewrite: RewriteOptions,
}

/// Build the shared orchestrator: one pooled fetcher, one immutable rule set.
pub fn build_variant_router(
    catalog_url: &str,
    timeout_secs: Option<u64>,
    rewrite: RewriteOptions,
) -> Result<Arc<VariantRouter>> {
    let fetcher = Fetcher::with_timeout(catalog_url, timeout_secs)
        .with_context(|| format!("Failed to build HTTP client for {}", catalog_url))?;
    let rules = RewriteRules::new(rewrite).context("Failed to compile rewrite rules")?;
    Ok(Arc::new(VariantRouter::new(fetcher, Arc::new(rules))))
}

/// Every path and method lands on the variant handler.
pub fn build_app(router: Arc<VariantRouter>) -> Router {
    Router::new().fallback(variant_handler).with_state(router)
}

async fn variant_handler(
    State(router): State<Arc<VariantRouter>>,
    headers: HeaderMap,
) -> Response {
    let cookies = cookie_header(&headers);

    match router.handle(cookies.as_deref()).await {
        Ok(response) => into_http_response(response),
        Err(e) => {
            // No structured reply for this path, just a bare gateway fault.
            error!("Variant request failed: {}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Join every `Cookie` header line into one string (HTTP/2 may split them).
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

pub fn into_http_response(variant: VariantResponse) -> Response {
    let VariantResponse {
        status,
        mut headers,
        body,
    } = variant;

    // Upstream framing headers; hyper frames our body itself.
    headers.remove(CONNECTION);
    headers.remove(TRANSFER_ENCODING);
    headers.remove(KEEP_ALIVE);

    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

pub async fn serve(options: ServeOptions) -> Result<()> {
    let router = build_variant_router(&options.catalog_url, options.timeout_secs, options.rewrite)?;
    let app = build_app(router);

    let listener = tokio::net::TcpListener::bind(options.listen)
        .await
        .with_context(|| format!("Failed to bind {}", options.listen))?;
    info!(
        "Serving variants from {} on {}",
        options.catalog_url,
        listener.local_addr()?
    );

    axum::serve(listener, app).await.context("HTTP server failed")
}

/// Fetch the catalog once and render it as pretty JSON.
pub async fn fetch_catalog_json(catalog_url: &str, timeout_secs: Option<u64>) -> Result<String> {
    let fetcher = Fetcher::with_timeout(catalog_url, timeout_secs)?;
    let catalog = fetcher
        .fetch_catalog()
        .await
        .with_context(|| format!("Catalog at {} is unusable", catalog_url))?;
    Ok(serde_json::to_string_pretty(&catalog)?)
}

/// Run the rewrite rules over a local HTML file.
pub fn preview_file(path: &Path, rewrite: RewriteOptions) -> Result<String> {
    let html = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let rules = RewriteRules::new(rewrite)?;
    Ok(rules.rewrite_str(&html)?)
}
