use crate::error::TransformError;
use crate::rewrite::RewriteRules;
use crate::stream::transform_body;
use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt, stream};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

pub const INTERNAL_ERROR_BODY: &str = "An internal error occurred";

pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransformError>> + Send>>;

/// An outgoing response whose body is still a stream.
pub struct VariantResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: BodyStream,
}

impl VariantResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: BodyStream) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Wrap a fetched page, keeping its status, headers and body stream.
    pub fn from_upstream(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes_stream().map_err(TransformError::from);
        Self::new(status, headers, Box::pin(body))
    }

    pub fn from_bytes(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        let body = stream::once(async move { Ok::<_, TransformError>(body) });
        Self::new(status, headers, Box::pin(body))
    }

    /// The fixed reply for an unusable catalog.
    pub fn internal_error() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        Self::from_bytes(
            StatusCode::INTERNAL_SERVER_ERROR,
            headers,
            Bytes::from_static(INTERNAL_ERROR_BODY.as_bytes()),
        )
    }

    /// Route the body through the rewrite rules. The length header is dropped
    /// since rewriting changes the body size.
    pub fn transform(mut self, rules: Arc<RewriteRules>) -> Self {
        self.headers.remove(CONTENT_LENGTH);
        let body = transform_body(rules, self.body);
        Self::new(self.status, self.headers, body)
    }

    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Drain the body into memory.
    pub async fn into_body_bytes(mut self) -> Result<Vec<u8>, TransformError> {
        let mut collected = Vec::new();
        while let Some(chunk) = self.body.next().await {
            collected.extend_from_slice(&chunk?);
        }
        Ok(collected)
    }

    pub async fn into_body_string(self) -> Result<String, TransformError> {
        let bytes = self.into_body_bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl fmt::Debug for VariantResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
