use rand::{Rng, rng};

/// Pick a uniformly random element, or `None` for an empty slice.
pub fn choose_random<T>(items: &[T]) -> Option<&T> {
    if items.is_empty() {
        return None;
    }

    // Thread-local generator; no seeding or reproducibility is needed here.
    let idx = rng().random_range(0..items.len());
    Some(&items[idx])
}

/// Decide which variant URL to serve.
///
/// A cookie value is honoured only when it exactly matches a catalog entry;
/// anything else falls back to a random catalog entry. The returned string
/// always borrows from `variants`, never from the cookie.
pub fn resolve_variant<'a>(cookie_value: Option<&str>, variants: &'a [String]) -> Option<&'a str> {
    if let Some(wanted) = cookie_value
        && let Some(known) = variants.iter().find(|v| v.as_str() == wanted)
    {
        return Some(known.as_str());
    }

    choose_random(variants).map(String::as_str)
}
