//! CORS configuration for browser front-ends.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::AppConfig;

/// Configure CORS from `CORS_ALLOWED_ORIGINS`.
///
/// `*` or an empty value allows any origin. Otherwise the value is a
/// comma-separated list of origins; entries that are not valid header values
/// are skipped, and if none is left any origin is allowed.
pub fn setup_cors(config: &AppConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allow_origin(&config.cors_allowed_origins))
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
}

fn allow_origin(raw: &str) -> AllowOrigin {
    let raw = raw.trim();
    if raw.is_empty() || raw == "*" {
        return AllowOrigin::any();
    }

    let origins: Vec<HeaderValue> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    }
}
