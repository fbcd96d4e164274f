use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Catalog returned status {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Catalog has no variants")]
    EmptyCatalog,
}

pub type Result<T> = std::result::Result<T, FetchError>;
