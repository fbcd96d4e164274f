use crate::error::{FetchError, Result};
use serde::{Deserialize, Serialize};

/// The authoritative list of variant URLs, as served by the catalog endpoint.
///
/// A missing `variants` field deserializes to an empty list so that it is
/// rejected by [`VariantCatalog::validate`] instead of failing as a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantCatalog {
    #[serde(default)]
    pub variants: Vec<String>,
}

impl VariantCatalog {
    pub fn new(variants: Vec<String>) -> Self {
        Self { variants }
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Exact string membership, no URL normalization.
    pub fn contains(&self, url: &str) -> bool {
        self.variants.iter().any(|v| v == url)
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn validate(self) -> Result<Self> {
        if self.is_empty() {
            return Err(FetchError::EmptyCatalog);
        }
        Ok(self)
    }
}
