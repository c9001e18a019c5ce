//! # rp-api
//!
//! The web routing and orchestration layer for Rusty-Press.

pub mod auth;
pub mod handlers;
pub mod middleware;

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use rp_core::error::AppError;

/// Configures the routes for the blog.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the pages under a different prefix if ever needed.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            // Feeds
            .route("/", web::get().to(handlers::index))
            .route("/group/{slug}/", web::get().to(handlers::group_posts))
            .route("/profile/{username}/", web::get().to(handlers::profile))
            .route("/follow/", web::get().to(handlers::follow_index))
            // Posts
            .route("/posts/{id}/", web::get().to(handlers::post_detail))
            .route("/create/", web::get().to(handlers::post_create_form))
            .route("/create/", web::post().to(handlers::post_create))
            .route("/posts/{id}/edit/", web::get().to(handlers::post_edit_form))
            .route("/posts/{id}/edit/", web::post().to(handlers::post_edit))
            .route("/posts/{id}/comment/", web::post().to(handlers::add_comment))
            // Follows (plain links navigate here too, so GET is routed alongside POST)
            .route("/profile/{username}/follow/", web::get().to(handlers::profile_follow))
            .route("/profile/{username}/follow/", web::post().to(handlers::profile_follow))
            .route("/profile/{username}/unfollow/", web::get().to(handlers::profile_unfollow))
            .route("/profile/{username}/unfollow/", web::post().to(handlers::profile_unfollow))
            // Auth flow
            .route("/auth/signup/", web::get().to(auth::signup_form))
            .route("/auth/signup/", web::post().to(auth::signup))
            .route("/auth/login/", web::get().to(auth::login_form))
            .route("/auth/login/", web::post().to(auth::login))
            .route("/auth/logout/", web::get().to(auth::logout)),
    );
}

/// Adapter that lets handlers bubble `AppError` (and anything `anyhow`)
/// through `?` while actix turns it into an HTML status page.
#[derive(Debug)]
pub struct PageError(pub AppError);

/// Handler result shorthand used across this crate.
pub type PageResult = Result<HttpResponse, PageError>;

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for PageError {
    fn from(err: anyhow::Error) -> Self {
        Self(AppError::Internal(err))
    }
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(err) = &self.0 {
            log::error!("unhandled server fault: {err:#}");
        }
        let status = self.status_code();
        HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(format!(
                "<html><body><h1>{} {}</h1></body></html>",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Error"),
            ))
    }
}

/// 404 as a `PageError`, for unresolvable slugs/usernames/ids.
pub(crate) fn not_found(what: &'static str, key: impl Into<String>) -> PageError {
    PageError(AppError::NotFound(what, key.into()))
}
