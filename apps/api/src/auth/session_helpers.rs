use axum::http::HeaderMap;

/// Best-effort client address for rate limiting, taken from the first
/// `x-forwarded-for` hop set by the reverse proxy.
pub(crate) fn client_address(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}
