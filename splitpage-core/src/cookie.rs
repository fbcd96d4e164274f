use crate::error::Result;
use crate::response::VariantResponse;
use reqwest::header::{HeaderValue, SET_COOKIE};
use std::collections::HashMap;

/// Name of the cookie that pins a visitor to a variant.
pub const VARIANT_COOKIE: &str = "variant";

/// Parse a raw `Cookie` header into name/value pairs.
///
/// Pairs split on `;`, then on the first `=` only, so values may contain `=`.
/// Names and values are trimmed. A segment without `=` maps to an empty value
/// and blank segments are skipped; this never fails. Later duplicates win.
pub fn parse_cookies(header: Option<&str>) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    let Some(header) = header else {
        return cookies;
    };

    for pair in header.split(';') {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        cookies.insert(name.to_string(), value.trim().to_string());
    }

    cookies
}

/// Return `response` with `Set-Cookie: variant=<variant_url>` set. Status,
/// body stream and every other header are carried over unchanged.
pub fn attach_variant_cookie(
    mut response: VariantResponse,
    variant_url: &str,
) -> Result<VariantResponse> {
    let value = HeaderValue::from_str(&format!("{}={}", VARIANT_COOKIE, variant_url))?;
    response.headers.insert(SET_COOKIE, value);
    Ok(response)
}
