//! Core record types
//!
//! Defines the records exchanged with the remote collections:
//! - Posts and the create-post payload
//! - Comments, the add-comment payload and its wire request
//!
//! Field names follow the remote API (camelCase on the wire).

use serde::{Deserialize, Serialize};

/// Address stamped onto locally authored comments.
///
/// The workflow has no authentication, so the server echo cannot be
/// trusted for authorship.
pub const PLACEHOLDER_EMAIL: &str = "myUser@mail.com";

/// Server-assigned post identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Server-assigned comment identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A post as held in the list
///
/// `id` is optional: a record without one can be listed but not deleted
/// and its comments cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Server-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PostId>,
    /// Authoring user, absent on freshly created posts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    /// Title (unique case-insensitively at creation time)
    pub title: String,
    /// Body text
    pub body: String,
}

impl Post {
    /// Create post with an identifier
    #[inline]
    #[must_use]
    pub fn new(id: u64, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Some(PostId(id)),
            user_id: None,
            title: title.into(),
            body: body.into(),
        }
    }

    /// With authoring user
    #[inline]
    #[must_use]
    pub fn with_user(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// Create-post form payload (`POST /posts`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
}

impl NewPost {
    /// Create payload
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// A comment attached to a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Owning post
    pub post_id: PostId,
    /// Server-assigned identifier
    #[serde(default)]
    pub id: CommentId,
    /// Displayed name
    #[serde(default)]
    pub name: String,
    /// Displayed email
    #[serde(default)]
    pub email: String,
    /// Body text
    #[serde(default)]
    pub body: String,
}

/// Add-comment form payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    /// Title, displayed as the comment name
    pub title: String,
    /// Body text
    pub body: String,
}

impl NewComment {
    /// Create payload
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Wire request for `POST /comments`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
    /// Post the comment belongs to
    pub post_id: PostId,
}

impl CommentRequest {
    /// Attach a draft to a post
    #[inline]
    #[must_use]
    pub fn new(draft: NewComment, post_id: PostId) -> Self {
        Self {
            title: draft.title,
            body: draft.body,
            post_id,
        }
    }
}
