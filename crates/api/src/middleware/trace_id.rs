//! Request tracing middleware.
//!
//! Every request runs inside a span carrying its request ID, so log lines
//! emitted by the aggregator and the login flow can be correlated.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Longest caller-supplied request ID that is propagated as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Middleware that extracts or generates a request ID.
///
/// A usable `X-Request-ID` header is reused; otherwise a UUID v4 is
/// generated. The ID is stored in request extensions and echoed in the
/// response headers.
pub async fn trace_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = incoming_request_id(&req).unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let start = std::time::Instant::now();
        let mut response = next.run(req).await;

        tracing::info!(
            status = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );

        if let Ok(header_value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(HeaderName::from_static("x-request-id"), header_value);
        }

        response
    }
    .instrument(span)
    .await
}

fn incoming_request_id(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_header(value: &str) -> Request<Body> {
        Request::builder()
            .uri("/api/health")
            .header(REQUEST_ID_HEADER, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_incoming_request_id_is_reused() {
        let req = request_with_header("req-123_abc.xyz");
        assert_eq!(incoming_request_id(&req).as_deref(), Some("req-123_abc.xyz"));
    }

    #[test]
    fn test_blank_request_id_is_ignored() {
        let req = request_with_header("   ");
        assert_eq!(incoming_request_id(&req), None);
    }

    #[test]
    fn test_oversized_request_id_is_ignored() {
        let req = request_with_header(&"x".repeat(MAX_REQUEST_ID_LEN + 1));
        assert_eq!(incoming_request_id(&req), None);
    }

    #[test]
    fn test_missing_request_id() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(incoming_request_id(&req), None);
    }

    #[test]
    fn test_request_id_header_constant() {
        assert_eq!(REQUEST_ID_HEADER, "X-Request-ID");
    }
}
