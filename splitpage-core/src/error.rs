use splitpage_fetch::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Variant fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid rewrite rule: {0}")]
    InvalidRule(String),
}

/// Failures while streaming a response body. These surface after the status
/// line has gone out, so they end the body instead of replacing the response.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Upstream body failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("HTML rewriting failed: {0}")]
    Rewrite(#[from] lol_html::errors::RewritingError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
