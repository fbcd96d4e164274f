pub mod catalog;
pub mod client;
pub mod error;

pub use catalog::VariantCatalog;
pub use client::{DEFAULT_CATALOG_URL, Fetcher};
pub use error::{FetchError, Result};
