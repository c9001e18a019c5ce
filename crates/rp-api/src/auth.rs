//! # Auth Flow
//!
//! Login, logout, and signup pages. Sessions travel as an HMAC-signed
//! cookie minted by the `AuthProvider` plugin; the handlers here only
//! move tokens between the provider and the `Set-Cookie` header.

use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use rp_core::models::User;
use rp_ui::{LoginTemplate, SignupTemplate};

use crate::handlers::{principal, render, see_other, AppState};
use crate::{PageError, PageResult};

/// Session cookie name; shared with the integration tests.
pub const SESSION_COOKIE: &str = "rp_session";

const BAD_CREDENTIALS: &str = "Unknown username or wrong password.";

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginFormData {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupFormData {
    pub username: String,
    pub password: String,
}

/// Only same-site paths may be used as a post-login return target.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .finish()
}

pub async fn login_form(query: web::Query<NextQuery>) -> PageResult {
    render(&LoginTemplate {
        error: None,
        next: safe_next(query.next.as_deref()),
        viewer: None,
    })
}

pub async fn login(state: web::Data<AppState>, body: web::Form<LoginFormData>) -> PageResult {
    let form = body.into_inner();
    let next = safe_next(form.next.as_deref()).to_string();

    let user = state.repo.get_user_by_username(&form.username).await?;
    let verified = user
        .as_ref()
        .filter(|u| state.auth.verify_password(&form.password, &u.password_hash));

    match verified {
        Some(user) => {
            let token = state.auth.issue_session(user.id);
            let mut response = see_other(&next);
            response
                .add_cookie(&session_cookie(token))
                .map_err(|e| PageError::from(anyhow::anyhow!("set-cookie: {e}")))?;
            Ok(response)
        }
        None => render(&LoginTemplate {
            error: Some(BAD_CREDENTIALS),
            next: &next,
            viewer: None,
        }),
    }
}

pub async fn signup_form(state: web::Data<AppState>, req: HttpRequest) -> PageResult {
    // Already signed in: nothing to do here.
    if principal(&state, &req).await?.is_some() {
        return Ok(see_other("/"));
    }
    render(&SignupTemplate {
        error: None,
        viewer: None,
    })
}

pub async fn signup(state: web::Data<AppState>, body: web::Form<SignupFormData>) -> PageResult {
    let form = body.into_inner();
    let username = form.username.trim().to_string();

    let error = if username.is_empty() || form.password.is_empty() {
        Some("Username and password are both required.")
    } else if state
        .repo
        .get_user_by_username(&username)
        .await?
        .is_some()
    {
        Some("That username is taken.")
    } else {
        None
    };
    if let Some(error) = error {
        return render(&SignupTemplate {
            error: Some(error),
            viewer: None,
        });
    }

    let user = User {
        id: Uuid::now_v7(),
        username,
        password_hash: state.auth.hash_password(&form.password)?,
        created_at: Utc::now(),
    };
    let token = state.auth.issue_session(user.id);
    state.repo.create_user(user).await?;

    let mut response = see_other("/");
    response
        .add_cookie(&session_cookie(token))
        .map_err(|e| PageError::from(anyhow::anyhow!("set-cookie: {e}")))?;
    Ok(response)
}

pub async fn logout() -> PageResult {
    let mut response = see_other("/");
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    response
        .add_removal_cookie(&cookie)
        .map_err(|e| PageError::from(anyhow::anyhow!("set-cookie: {e}")))?;
    Ok(response)
}
