//! Mapping of HTTP-level failures into the shared provider error taxonomy.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use summary_core::ProviderError;

/// Longest error detail carried into a [`ProviderError`].
const MAX_DETAIL_LEN: usize = 300;

/// Map a transport failure from reqwest.
///
/// Timeouts, connection failures and body decoding problems are all treated
/// as transient. The URL is stripped so query parameters never reach logs.
pub fn map_transport_error(error: reqwest::Error) -> ProviderError {
    let kind = if error.is_timeout() {
        "request timed out"
    } else if error.is_connect() {
        "connection failed"
    } else if error.is_decode() {
        "failed to decode response"
    } else {
        "request failed"
    };

    ProviderError::Transient(format!("{}: {}", kind, error.without_url()))
}

/// Classify a non-success HTTP status shared by all providers.
///
/// Provider modules handle their own special cases (for example bodies that
/// signal bad credentials on a 400) before falling back to this.
pub fn classify_status(
    status: StatusCode,
    retry_after: Option<Duration>,
    detail: &str,
) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::InvalidCredentials,
        // Unknown model or endpoint: the deployment is misconfigured.
        404 => ProviderError::InvalidCredentials,
        429 => ProviderError::RateLimited { retry_after },
        408 => ProviderError::Transient(format!("request timeout: {}", truncate(detail))),
        500..=599 => ProviderError::Transient(format!(
            "server error ({}): {}",
            status.as_u16(),
            truncate(detail)
        )),
        code => ProviderError::ContentRejected(format!("API error ({}): {}", code, truncate(detail))),
    }
}

/// Read a `Retry-After` header given in delta-seconds.
///
/// HTTP-date values are ignored; the caller's backoff applies instead.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Error for a successful response that carried no usable text.
pub fn empty_response() -> ProviderError {
    ProviderError::Transient("provider returned an empty response".to_string())
}

/// Shorten a response body for inclusion in an error.
pub fn truncate(detail: &str) -> String {
    let detail = detail.trim();
    if detail.chars().count() <= MAX_DETAIL_LEN {
        detail.to_string()
    } else {
        let cut: String = detail.chars().take(MAX_DETAIL_LEN).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_classify_status() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED, None, ""),
            ProviderError::InvalidCredentials
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN, None, ""),
            ProviderError::InvalidCredentials
        );
        assert_eq!(
            classify_status(
                StatusCode::TOO_MANY_REQUESTS,
                Some(Duration::from_secs(3)),
                ""
            ),
            ProviderError::RateLimited {
                retry_after: Some(Duration::from_secs(3))
            }
        );
        assert!(classify_status(StatusCode::BAD_GATEWAY, None, "upstream").is_retriable());
        assert!(classify_status(StatusCode::REQUEST_TIMEOUT, None, "").is_retriable());
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, None, "bad"),
            ProviderError::ContentRejected(_)
        ));
    }

    #[test]
    fn test_unknown_model_is_configuration_failure() {
        let err = classify_status(StatusCode::NOT_FOUND, None, "model gpt-9 not found");
        assert_eq!(err, ProviderError::InvalidCredentials);
        assert!(!err.is_retriable());
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(7)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_truncate_long_detail() {
        let long = "x".repeat(1000);
        let short = truncate(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.len(), MAX_DETAIL_LEN + 3);
        assert_eq!(truncate("  fine  "), "fine");
    }
}
