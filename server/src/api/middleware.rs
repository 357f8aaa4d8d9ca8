//! HTTP middleware (CORS, 404 handler)

use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{HeaderValue, Method, header};
use axum::response::IntoResponse;
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::types::ApiError;
use crate::core::config::is_all_interfaces;

/// Allowed origins configuration
#[derive(Debug, Clone)]
pub struct AllowedOrigins {
    origins: Vec<String>,
}

impl AllowedOrigins {
    /// Origins for the bound host and port plus any configured extras
    pub fn new(host: &str, port: u16, extra: &[String]) -> Self {
        // When binding to all interfaces or localhost, allow both localhost
        // and 127.0.0.1; otherwise use the configured host directly.
        let base_hosts: Vec<&str> =
            if is_all_interfaces(host) || host == "127.0.0.1" || host == "localhost" {
                vec!["localhost", "127.0.0.1"]
            } else {
                vec![host]
            };

        let mut origins = Vec::new();
        for h in &base_hosts {
            origins.push(format!("http://{}:{}", h, port));
            origins.push(format!("http://{}", h));
        }
        for origin in extra {
            let origin = origin.trim_end_matches('/').to_string();
            if !origins.contains(&origin) {
                origins.push(origin);
            }
        }

        Self { origins }
    }

    /// Check if an origin is allowed
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    /// Get origins as HeaderValues for CORS
    fn as_header_values(&self) -> Vec<HeaderValue> {
        self.origins.iter().filter_map(|o| o.parse().ok()).collect()
    }
}

/// Create CORS layer
pub fn cors(allowed: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed.as_header_values()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
}

const MAX_404_BODY_LOG: usize = 64 * 1024; // 64KB limit for logging

/// Handle 404 Not Found with logging
pub async fn handle_404(req: Request) -> impl IntoResponse {
    let not_found = || ApiError::not_found("NOT_FOUND", "Not Found");

    if !tracing::enabled!(tracing::Level::DEBUG) {
        return not_found();
    }

    let method = req.method().clone();
    let uri = req.uri().clone();

    match to_bytes(req.into_body(), MAX_404_BODY_LOG).await {
        Ok(body) if body.is_empty() => tracing::debug!("[404] {} {}", method, uri),
        Ok(body) => tracing::debug!(
            "[404] {} {}\n{}",
            method,
            uri,
            String::from_utf8_lossy(&body)
        ),
        Err(_) => tracing::debug!("[404] {} {} (failed to read body)", method, uri),
    }

    not_found()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_hosts_allowed() {
        let allowed = AllowedOrigins::new("127.0.0.1", 8000, &[]);
        assert!(allowed.is_allowed("http://localhost:8000"));
        assert!(allowed.is_allowed("http://127.0.0.1:8000"));
        assert!(!allowed.is_allowed("http://example.com"));
    }

    #[test]
    fn test_specific_host_only() {
        let allowed = AllowedOrigins::new("10.0.0.5", 9000, &[]);
        assert!(allowed.is_allowed("http://10.0.0.5:9000"));
        assert!(!allowed.is_allowed("http://localhost:9000"));
    }

    #[test]
    fn test_extra_origins_trailing_slash() {
        let extra = vec!["https://shop.example.com/".to_string()];
        let allowed = AllowedOrigins::new("0.0.0.0", 8000, &extra);
        assert!(allowed.is_allowed("https://shop.example.com"));
        assert!(allowed.is_allowed("http://localhost:8000"));
    }
}
