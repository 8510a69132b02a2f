// ABOUTME: CORS middleware configuration for the HTTP API
// ABOUTME: Restricts cross-origin access to the configured front-end origins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

use http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::config::ServerConfig;

/// Configure CORS from `ALLOWED_ORIGINS`
///
/// `*` allows any origin. Otherwise only the listed origins are allowed;
/// entries that are not valid header values are skipped with a warning. If
/// nothing valid remains, no cross-origin request is allowed.
///
/// ```bash
/// export ALLOWED_ORIGINS="https://app.example.com,http://localhost:5173"
/// ```
pub fn setup_cors(config: &ServerConfig) -> CorsLayer {
    let origins = config.allowed_origins();

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|e| warn!("Ignoring invalid CORS origin {origin:?}: {e}"))
                    .ok()
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
}
