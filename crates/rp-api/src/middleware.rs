//! rusty-press/crates/rp-api/src/middleware.rs
//!
//! Shared middleware for logging and response headers.

use actix_web::middleware::{DefaultHeaders, Logger};

// Returns the standard request logger:
// remote-ip "request-line" status-code response-size "referrer" "user-agent"
pub fn standard_middleware() -> Logger {
    Logger::default()
}

// Baseline security headers for every rendered page.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
}
