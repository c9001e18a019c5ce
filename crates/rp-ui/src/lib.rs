//! rusty-press/crates/rp-ui/src/lib.rs
//!
//! Askama templates for the server-rendered pages. Handlers build these
//! structs and hand the rendered HTML back through actix.

use askama::Template;
use rp_core::feed::Page;
use rp_core::forms::FormErrors;
use rp_core::models::{CommentView, Group, PostView};
use rp_core::traits::MediaStore;
use uuid::Uuid;

/// A feed row with its media URLs already resolved against the `MediaStore`,
/// so templates never reach back into the storage plugin.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub view: PostView,
    pub image_url: Option<String>,
    pub thumb_url: Option<String>,
}

impl FeedItem {
    pub fn new(view: PostView, store: &dyn MediaStore) -> Self {
        let image_url = view.post.image_id.as_deref().map(|id| store.get_url(id));
        let thumb_url = view
            .post
            .image_id
            .as_deref()
            .map(|id| store.get_thumbnail_url(id));
        Self {
            view,
            image_url,
            thumb_url,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub page: &'a Page<FeedItem>,
    pub viewer: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "group_list.html")]
pub struct GroupTemplate<'a> {
    pub group: &'a Group,
    pub page: &'a Page<FeedItem>,
    pub viewer: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate<'a> {
    pub author: &'a str,
    pub post_count: i64,
    /// Whether the viewing principal follows this author (false for anonymous).
    pub following: bool,
    /// Follow/unfollow buttons only make sense for a logged-in non-self viewer.
    pub can_follow: bool,
    pub page: &'a Page<FeedItem>,
    pub viewer: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate<'a> {
    pub item: &'a FeedItem,
    pub comments: &'a [CommentView],
    /// Total number of posts by this post's author.
    pub count: i64,
    pub is_owner: bool,
    pub viewer: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "create_post.html")]
pub struct PostFormTemplate<'a> {
    /// Current text value (submitted or, in edit mode, stored).
    pub text: &'a str,
    pub selected_group: Option<Uuid>,
    pub groups: &'a [Group],
    pub errors: &'a FormErrors,
    pub is_edit: bool,
    pub post_id: Option<Uuid>,
    pub viewer: Option<&'a str>,
}

impl PostFormTemplate<'_> {
    fn is_selected(&self, group: &Group) -> bool {
        self.selected_group == Some(group.id)
    }
}

#[derive(Template)]
#[template(path = "follow.html")]
pub struct FollowTemplate<'a> {
    pub page: &'a Page<FeedItem>,
    pub viewer: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate<'a> {
    pub error: Option<&'a str>,
    pub next: &'a str,
    pub viewer: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate<'a> {
    pub error: Option<&'a str>,
    pub viewer: Option<&'a str>,
}
