use crate::cookie::{VARIANT_COOKIE, attach_variant_cookie, parse_cookies};
use crate::error::Result;
use crate::response::VariantResponse;
use crate::rewrite::RewriteRules;
use crate::select::resolve_variant;
use splitpage_fetch::Fetcher;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request orchestrator: cookie, catalog, resolve, fetch, set cookie, rewrite.
///
/// Holds only shared, read-only pieces (the pooled fetcher and the rewrite
/// rules), so one instance serves every request concurrently.
#[derive(Debug, Clone)]
pub struct VariantRouter {
    fetcher: Fetcher,
    rules: Arc<RewriteRules>,
}

impl VariantRouter {
    pub fn new(fetcher: Fetcher, rules: Arc<RewriteRules>) -> Self {
        Self { fetcher, rules }
    }

    /// Serve one request given its raw `Cookie` header.
    ///
    /// Any catalog failure yields the fixed 500 response. A failure to fetch the
    /// chosen variant page is returned as `Err` for the host to deal with.
    pub async fn handle(&self, cookie_header: Option<&str>) -> Result<VariantResponse> {
        let cookies = parse_cookies(cookie_header);
        let cookie_variant = cookies.get(VARIANT_COOKIE).map(String::as_str);

        let catalog = match self.fetcher.fetch_catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("Catalog {} unusable: {}", self.fetcher.catalog_url(), e);
                return Ok(VariantResponse::internal_error());
            }
        };

        let Some(variant_url) = resolve_variant(cookie_variant, catalog.variants()) else {
            return Ok(VariantResponse::internal_error());
        };

        match cookie_variant {
            Some(wanted) if wanted == variant_url => debug!("Honouring variant cookie {}", wanted),
            Some(wanted) => info!("Ignoring variant cookie not in catalog: {}", wanted),
            None => debug!("No variant cookie, chose {}", variant_url),
        }

        let page = self.fetcher.fetch_page(variant_url).await?;
        let response = attach_variant_cookie(VariantResponse::from_upstream(page), variant_url)?;

        Ok(response.transform(Arc::clone(&self.rules)))
    }
}
