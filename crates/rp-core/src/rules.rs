//! # Authorization & Follow Rules
//!
//! Pure decision functions over (principal, target, existing records).
//! Handlers translate the returned `Decision` into an HTTP response; nothing
//! here touches the store or the network.

use uuid::Uuid;

use crate::models::{Post, User};

/// Login endpoint; protected pages bounce anonymous visitors here.
pub const LOGIN_PATH: &str = "/auth/login/";

/// Canonical path helpers shared by rules, handlers, and templates.
pub mod paths {
    use uuid::Uuid;

    pub fn profile(username: &str) -> String {
        format!("/profile/{username}/")
    }

    pub fn post_detail(post_id: Uuid) -> String {
        format!("/posts/{post_id}/")
    }

    /// Login URL carrying the originally requested path as a return target.
    pub fn login_with_next(next: &str) -> String {
        format!("{}?next={next}", super::LOGIN_PATH)
    }
}

/// Outcome of an access check.
///
/// Denials here are never error statuses: anonymous visitors are sent to the
/// login flow and authenticated non-owners are sent somewhere safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    DenyRedirect(String),
    NotFound,
}

/// Gate for actions that only require a logged-in principal
/// (create post, add comment, following feed).
pub fn authorize_authenticated(principal: Option<&User>, requested_path: &str) -> Decision {
    match principal {
        Some(_) => Decision::Allow,
        None => Decision::DenyRedirect(paths::login_with_next(requested_path)),
    }
}

/// Gate for editing a post: only the author may proceed. Anonymous visitors
/// go to login; authenticated non-owners are bounced to the post's detail
/// page rather than shown an error.
pub fn authorize_edit(principal: Option<&User>, post: &Post, requested_path: &str) -> Decision {
    match principal {
        None => Decision::DenyRedirect(paths::login_with_next(requested_path)),
        Some(user) if user.id == post.author_id => Decision::Allow,
        Some(_) => Decision::DenyRedirect(paths::post_detail(post.id)),
    }
}

/// Outcome of a follow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowDecision {
    /// Insert a new Follow edge, then redirect to the author's profile.
    Create,
    /// Self-follow or duplicate: redirect without touching the store.
    SkipToProfile,
}

/// Follow is skipped (not failed) when the principal targets themselves or
/// already follows the author.
pub fn follow_decision(principal: &User, author: &User, already_following: bool) -> FollowDecision {
    if principal.id == author.id || already_following {
        FollowDecision::SkipToProfile
    } else {
        FollowDecision::Create
    }
}

/// Unfollow requires an existing edge; `removed_rows == 0` means the
/// principal never followed this author and the request 404s.
pub fn unfollow_outcome(removed_rows: u64, author_username: &str) -> Decision {
    if removed_rows == 0 {
        Decision::NotFound
    } else {
        Decision::DenyRedirect(paths::profile(author_username))
    }
}

/// True iff the viewing principal owns the post (drives the "edit" link on
/// the detail page).
pub fn is_owner(principal: Option<&User>, post: &Post) -> bool {
    principal.map(|u| u.id == post.author_id).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(name: &str) -> User {
        User {
            id: Uuid::now_v7(),
            username: name.to_string(),
            password_hash: "x".to_string(),
            created_at: Utc::now(),
        }
    }

    fn post_by(author: &User) -> Post {
        Post {
            id: Uuid::now_v7(),
            author_id: author.id,
            group_id: None,
            text: "hello".to_string(),
            image_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn anonymous_edit_goes_to_login_with_next() {
        let author = user("author");
        let post = post_by(&author);
        let path = paths::post_detail(post.id) + "edit/";
        match authorize_edit(None, &post, &path) {
            Decision::DenyRedirect(to) => {
                assert!(to.starts_with(LOGIN_PATH));
                assert!(to.contains(&format!("next={path}")));
            }
            other => panic!("expected login redirect, got {other:?}"),
        }
    }

    #[test]
    fn non_owner_edit_bounces_to_detail() {
        let author = user("author");
        let intruder = user("intruder");
        let post = post_by(&author);
        assert_eq!(
            authorize_edit(Some(&intruder), &post, "/ignored/"),
            Decision::DenyRedirect(paths::post_detail(post.id)),
        );
    }

    #[test]
    fn owner_edit_allowed() {
        let author = user("author");
        let post = post_by(&author);
        assert_eq!(authorize_edit(Some(&author), &post, "/ignored/"), Decision::Allow);
        assert!(is_owner(Some(&author), &post));
        assert!(!is_owner(None, &post));
    }

    #[test]
    fn self_follow_and_duplicate_follow_are_skipped() {
        let me = user("me");
        let author = user("author");
        assert_eq!(follow_decision(&me, &me, false), FollowDecision::SkipToProfile);
        assert_eq!(follow_decision(&me, &author, true), FollowDecision::SkipToProfile);
        assert_eq!(follow_decision(&me, &author, false), FollowDecision::Create);
    }

    #[test]
    fn unfollow_without_edge_is_not_found() {
        assert_eq!(unfollow_outcome(0, "author"), Decision::NotFound);
        assert_eq!(
            unfollow_outcome(1, "author"),
            Decision::DenyRedirect(paths::profile("author")),
        );
    }
}
