use crate::catalog::VariantCatalog;
use crate::error::{FetchError, Result};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_CATALOG_URL: &str = "https://cfw-takehome.developers.workers.dev/api/variants";

const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Outbound HTTP for one process: the catalog endpoint and the variant pages it lists.
///
/// The underlying client is pooled and cheap to clone, so a single `Fetcher` is
/// shared by every request. It keeps no cookie store.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
    catalog_url: Url,
}

impl Fetcher {
    pub fn new(catalog_url: &str) -> Result<Self> {
        Self::with_timeout(catalog_url, None)
    }

    /// `timeout_secs` bounds each whole request; `None` leaves requests without a deadline.
    pub fn with_timeout(catalog_url: &str, timeout_secs: Option<u64>) -> Result<Self> {
        let catalog_url = Url::parse(catalog_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", catalog_url, e)))?;

        let mut builder = Client::builder()
            .user_agent(concat!("Splitpage/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .pool_max_idle_per_host(50) // Connection pooling
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5));

        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            catalog_url,
        })
    }

    pub fn catalog_url(&self) -> &Url {
        &self.catalog_url
    }

    /// Fetch and validate the catalog.
    ///
    /// Any non-2xx status, undecodable body, or missing/empty `variants` list is an error.
    pub async fn fetch_catalog(&self) -> Result<VariantCatalog> {
        debug!("Fetching catalog {}", self.catalog_url);

        let start = Instant::now();
        let response = self.client.get(self.catalog_url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let catalog: VariantCatalog = serde_json::from_slice(&body)
            .map_err(|e| FetchError::ParseError(format!("catalog body: {}", e)))?;
        let catalog = catalog.validate()?;

        info!(
            "Catalog fetched with {} variants in {:?}",
            catalog.variants().len(),
            start.elapsed()
        );
        Ok(catalog)
    }

    /// Fetch a variant page. The page's own status is returned untouched; only
    /// transport failures are errors.
    pub async fn fetch_page(&self, url: &str) -> Result<Response> {
        let parsed =
            Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

        debug!("Fetching variant page {}", parsed);
        let response = self.client.get(parsed).send().await?;
        debug!("Variant page {} answered {}", url, response.status());
        Ok(response)
    }
}
