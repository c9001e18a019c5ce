//! # rp-api Handlers
//!
//! This module coordinates the flow between HTTP requests and Core traits:
//! load entities, apply the rules in `rp_core::rules`, paginate, render.

use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use askama::Template;
use chrono::Utc;
use futures_util::StreamExt as _;
use serde::Deserialize;
use uuid::Uuid;

use rp_core::feed::{Page, Paginator};
use rp_core::forms::{CommentForm, FormErrors, ImageUpload, PostForm};
use rp_core::models::{Comment, Follow, Post, User};
use rp_core::rules::{self, paths, Decision, FollowDecision};
use rp_core::traits::{AuthProvider, BlogRepo, FeedScope, MediaStore, PageCache};
use rp_ui::{
    FeedItem, FollowTemplate, GroupTemplate, IndexTemplate, PostDetailTemplate, PostFormTemplate,
    ProfileTemplate,
};

use crate::{auth, not_found, PageError, PageResult};

/// State shared across all actix workers.
pub struct AppState {
    pub repo: Arc<dyn BlogRepo>,
    pub store: Arc<dyn MediaStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub cache: Arc<dyn PageCache>,
}

/// `?page=` as the paginator wants it: raw, clamped later.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

pub(crate) fn html_ok(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

pub(crate) fn render<T: Template>(template: &T) -> PageResult {
    let html = template
        .render()
        .map_err(|e| PageError::from(anyhow::Error::new(e)))?;
    Ok(html_ok(html))
}

/// Resolves the acting principal from the session cookie, if any.
pub(crate) async fn principal(
    state: &AppState,
    req: &HttpRequest,
) -> Result<Option<User>, PageError> {
    let Some(cookie) = req.cookie(auth::SESSION_COOKIE) else {
        return Ok(None);
    };
    let Some(user_id) = state.auth.verify_session(cookie.value()) else {
        return Ok(None);
    };
    Ok(state.repo.get_user(user_id).await?)
}

fn viewer_name(viewer: &Option<User>) -> Option<&str> {
    viewer.as_ref().map(|u| u.username.as_str())
}

/// Count, clamp, slice: the shared path behind all four feed views.
async fn feed_page(
    state: &AppState,
    scope: FeedScope,
    raw_page: Option<&str>,
) -> Result<Page<FeedItem>, PageError> {
    let total = state.repo.count_feed(scope).await?;
    let request = Paginator::default().resolve(raw_page, total);
    let views = state
        .repo
        .list_feed(scope, request.limit, request.offset)
        .await?;
    let items = views
        .into_iter()
        .map(|view| FeedItem::new(view, state.store.as_ref()))
        .collect();
    Ok(request.into_page(items))
}

/// Global feed. The only cached page: the full rendered body is stored per
/// URL (query string included) and served verbatim until the TTL lapses,
/// regardless of writes in between. The key also carries the session token,
/// since the rendered navigation is personalized and must never cross
/// sessions.
pub async fn index(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> PageResult {
    let session = req
        .cookie(auth::SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap_or_default();
    let cache_key = format!("{}#{}", req.uri(), session);
    if let Some(body) = state.cache.get(&cache_key) {
        return Ok(html_ok(body));
    }

    let viewer = principal(&state, &req).await?;
    let page = feed_page(&state, FeedScope::Global, query.page.as_deref()).await?;
    let html = IndexTemplate {
        page: &page,
        viewer: viewer_name(&viewer),
    }
    .render()
    .map_err(|e| PageError::from(anyhow::Error::new(e)))?;

    state.cache.put(cache_key, html.clone());
    Ok(html_ok(html))
}

pub async fn group_posts(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> PageResult {
    let slug = path.into_inner();
    let group = state
        .repo
        .get_group(&slug)
        .await?
        .ok_or_else(|| not_found("group", &slug))?;

    let viewer = principal(&state, &req).await?;
    let page = feed_page(&state, FeedScope::Group(group.id), query.page.as_deref()).await?;
    render(&GroupTemplate {
        group: &group,
        page: &page,
        viewer: viewer_name(&viewer),
    })
}

pub async fn profile(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> PageResult {
    let username = path.into_inner();
    let author = state
        .repo
        .get_user_by_username(&username)
        .await?
        .ok_or_else(|| not_found("user", &username))?;

    let viewer = principal(&state, &req).await?;
    let following = match &viewer {
        Some(user) => state.repo.follow_exists(user.id, author.id).await?,
        None => false,
    };
    let can_follow = viewer.as_ref().map(|u| u.id != author.id).unwrap_or(false);

    let post_count = state.repo.count_posts_by_author(author.id).await?;
    let page = feed_page(&state, FeedScope::Author(author.id), query.page.as_deref()).await?;
    render(&ProfileTemplate {
        author: &author.username,
        post_count,
        following,
        can_follow,
        page: &page,
        viewer: viewer_name(&viewer),
    })
}

pub async fn post_detail(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> PageResult {
    let post_id = path.into_inner();
    let view = state
        .repo
        .get_post_view(post_id)
        .await?
        .ok_or_else(|| not_found("post", post_id.to_string()))?;

    let viewer = principal(&state, &req).await?;
    let comments = state.repo.list_comments(post_id).await?;
    let count = state.repo.count_posts_by_author(view.post.author_id).await?;
    let is_owner = rules::is_owner(viewer.as_ref(), &view.post);
    let item = FeedItem::new(view, state.store.as_ref());

    render(&PostDetailTemplate {
        item: &item,
        comments: &comments,
        count,
        is_owner,
        viewer: viewer_name(&viewer),
    })
}

/// Hard ceiling on the bytes buffered from one post submission.
pub const MAX_FORM_BYTES: usize = 5 * 1024 * 1024;

const FORM_TOO_LARGE: &str = "Attached file is too large.";

/// Pulls text/group/image fields out of a multipart submission.
///
/// Accumulation stops at `MAX_FORM_BYTES`; an oversized submission comes
/// back as a field error alongside whatever fields were already read.
async fn parse_post_form(
    mut payload: Multipart,
) -> Result<(PostForm, Option<&'static str>), PageError> {
    let mut form = PostForm::default();
    let mut total = 0usize;
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| PageError::from(anyhow::anyhow!("multipart field: {e}")))?;
        let name = field.name().to_string();
        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string);
        let content_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| PageError::from(anyhow::anyhow!("multipart chunk: {e}")))?;
            total += chunk.len();
            if total > MAX_FORM_BYTES {
                return Ok((form, Some(FORM_TOO_LARGE)));
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "text" => form.text = String::from_utf8_lossy(&data).into_owned(),
            "group" => {
                form.group_id = Uuid::parse_str(String::from_utf8_lossy(&data).trim()).ok();
            }
            "image" => {
                // Browsers submit an empty part when no file was chosen.
                let filename = filename.unwrap_or_default();
                if !filename.is_empty() && !data.is_empty() {
                    form.image = Some(ImageUpload {
                        filename,
                        content_type,
                        data,
                    });
                }
            }
            _ => {}
        }
    }
    Ok((form, None))
}

async fn render_post_form(
    state: &AppState,
    viewer: &User,
    form: &PostForm,
    errors: &FormErrors,
    post_id: Option<Uuid>,
) -> PageResult {
    let groups = state.repo.list_groups().await?;
    render(&PostFormTemplate {
        text: &form.text,
        selected_group: form.group_id,
        groups: &groups,
        errors,
        is_edit: post_id.is_some(),
        post_id,
        viewer: Some(&viewer.username),
    })
}

pub async fn post_create_form(state: web::Data<AppState>, req: HttpRequest) -> PageResult {
    let viewer = principal(&state, &req).await?;
    if let Decision::DenyRedirect(to) = rules::authorize_authenticated(viewer.as_ref(), req.path())
    {
        return Ok(see_other(&to));
    }
    let viewer = viewer.expect("authorized principal is present");
    render_post_form(&state, &viewer, &PostForm::default(), &FormErrors::default(), None).await
}

pub async fn post_create(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> PageResult {
    let viewer = principal(&state, &req).await?;
    if let Decision::DenyRedirect(to) = rules::authorize_authenticated(viewer.as_ref(), req.path())
    {
        return Ok(see_other(&to));
    }
    let viewer = viewer.expect("authorized principal is present");

    let (form, upload_error) = parse_post_form(payload).await?;
    let mut errors = form.validate().err().unwrap_or_default();
    if let Some(message) = upload_error {
        errors.add("image", message);
    }
    if !errors.is_empty() {
        return render_post_form(&state, &viewer, &form, &errors, None).await;
    }

    let image_id = match &form.image {
        Some(image) => Some(
            state
                .store
                .save_upload(image.data.clone(), &image.content_type)
                .await?,
        ),
        None => None,
    };

    state
        .repo
        .create_post(Post {
            id: Uuid::now_v7(),
            author_id: viewer.id,
            group_id: form.group_id,
            text: form.text,
            image_id,
            created_at: Utc::now(),
        })
        .await?;

    Ok(see_other(&paths::profile(&viewer.username)))
}

pub async fn post_edit_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> PageResult {
    let post_id = path.into_inner();
    // Login gate comes before the post lookup: anonymous requests go to
    // login even when the id is unknown.
    let viewer = principal(&state, &req).await?;
    if let Decision::DenyRedirect(to) = rules::authorize_authenticated(viewer.as_ref(), req.path())
    {
        return Ok(see_other(&to));
    }

    let post = state
        .repo
        .get_post(post_id)
        .await?
        .ok_or_else(|| not_found("post", post_id.to_string()))?;

    match rules::authorize_edit(viewer.as_ref(), &post, req.path()) {
        Decision::DenyRedirect(to) => return Ok(see_other(&to)),
        Decision::NotFound => return Err(not_found("post", post_id.to_string())),
        Decision::Allow => {}
    }
    let viewer = viewer.expect("authorized principal is present");

    let form = PostForm {
        text: post.text.clone(),
        group_id: post.group_id,
        image: None,
    };
    render_post_form(&state, &viewer, &form, &FormErrors::default(), Some(post_id)).await
}

pub async fn post_edit(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> PageResult {
    let post_id = path.into_inner();
    let viewer = principal(&state, &req).await?;
    if let Decision::DenyRedirect(to) = rules::authorize_authenticated(viewer.as_ref(), req.path())
    {
        return Ok(see_other(&to));
    }

    let mut post = state
        .repo
        .get_post(post_id)
        .await?
        .ok_or_else(|| not_found("post", post_id.to_string()))?;

    match rules::authorize_edit(viewer.as_ref(), &post, req.path()) {
        Decision::DenyRedirect(to) => return Ok(see_other(&to)),
        Decision::NotFound => return Err(not_found("post", post_id.to_string())),
        Decision::Allow => {}
    }
    let viewer = viewer.expect("authorized principal is present");

    let (form, upload_error) = parse_post_form(payload).await?;
    let mut errors = form.validate().err().unwrap_or_default();
    if let Some(message) = upload_error {
        errors.add("image", message);
    }
    if !errors.is_empty() {
        return render_post_form(&state, &viewer, &form, &errors, Some(post_id)).await;
    }

    // Author and created_at stay as they were; only the submitted
    // fields move.
    post.text = form.text;
    post.group_id = form.group_id;
    if let Some(image) = &form.image {
        post.image_id = Some(
            state
                .store
                .save_upload(image.data.clone(), &image.content_type)
                .await?,
        );
    }
    state.repo.update_post(&post).await?;

    Ok(see_other(&paths::post_detail(post_id)))
}

/// Raw comment body; invalid input is dropped without feedback and the
/// client lands back on the detail page either way.
#[derive(Debug, Deserialize)]
pub struct CommentFormData {
    pub text: String,
}

pub async fn add_comment(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Form<CommentFormData>,
) -> PageResult {
    let post_id = path.into_inner();
    let viewer = principal(&state, &req).await?;
    if let Decision::DenyRedirect(to) = rules::authorize_authenticated(viewer.as_ref(), req.path())
    {
        return Ok(see_other(&to));
    }
    let viewer = viewer.expect("authorized principal is present");

    let post = state
        .repo
        .get_post(post_id)
        .await?
        .ok_or_else(|| not_found("post", post_id.to_string()))?;

    let form = CommentForm {
        text: body.into_inner().text,
    };
    if form.validate().is_ok() {
        state
            .repo
            .create_comment(Comment {
                id: Uuid::now_v7(),
                post_id: post.id,
                author_id: viewer.id,
                text: form.text,
                created_at: Utc::now(),
            })
            .await?;
    }

    Ok(see_other(&paths::post_detail(post_id)))
}

pub async fn follow_index(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> PageResult {
    let viewer = principal(&state, &req).await?;
    if let Decision::DenyRedirect(to) = rules::authorize_authenticated(viewer.as_ref(), req.path())
    {
        return Ok(see_other(&to));
    }
    let viewer = viewer.expect("authorized principal is present");

    let page = feed_page(
        &state,
        FeedScope::FollowedBy(viewer.id),
        query.page.as_deref(),
    )
    .await?;
    render(&FollowTemplate {
        page: &page,
        viewer: Some(&viewer.username),
    })
}

pub async fn profile_follow(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> PageResult {
    let username = path.into_inner();
    let viewer = principal(&state, &req).await?;
    if let Decision::DenyRedirect(to) = rules::authorize_authenticated(viewer.as_ref(), req.path())
    {
        return Ok(see_other(&to));
    }
    let viewer = viewer.expect("authorized principal is present");

    let author = state
        .repo
        .get_user_by_username(&username)
        .await?
        .ok_or_else(|| not_found("user", &username))?;

    let already = state.repo.follow_exists(viewer.id, author.id).await?;
    if let FollowDecision::Create = rules::follow_decision(&viewer, &author, already) {
        state
            .repo
            .create_follow(Follow {
                id: Uuid::now_v7(),
                user_id: viewer.id,
                author_id: author.id,
                created_at: Utc::now(),
            })
            .await?;
    }
    Ok(see_other(&paths::profile(&author.username)))
}

pub async fn profile_unfollow(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> PageResult {
    let username = path.into_inner();
    let viewer = principal(&state, &req).await?;
    if let Decision::DenyRedirect(to) = rules::authorize_authenticated(viewer.as_ref(), req.path())
    {
        return Ok(see_other(&to));
    }
    let viewer = viewer.expect("authorized principal is present");

    let author = state
        .repo
        .get_user_by_username(&username)
        .await?
        .ok_or_else(|| not_found("user", &username))?;

    let removed = state.repo.delete_follow(viewer.id, author.id).await?;
    match rules::unfollow_outcome(removed, &author.username) {
        Decision::NotFound => Err(not_found("follow", &username)),
        _ => Ok(see_other(&paths::profile(&author.username))),
    }
}
