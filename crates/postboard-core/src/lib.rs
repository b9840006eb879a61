//! Postboard Core - post list and comment lifecycle controllers
//!
//! The controllers behind a posts & comments workflow:
//! - Loads the post list and keeps a title-sorted view
//! - Validates and creates posts, rejecting duplicate titles locally
//! - Deletes posts optimistically behind a confirmation step
//! - Loads comments for the selected post, discarding superseded loads
//! - Adds comments with client-side authorship fields
//!
//! # Example
//!
//! ```rust,ignore
//! use postboard_core::{CommentController, NewPost, PostListController};
//! use std::sync::Arc;
//!
//! # async fn example(client: Arc<dyn postboard_core::ResourceClient>) -> Result<(), postboard_core::BoardError> {
//! let posts = PostListController::new(client.clone());
//! posts.load_all().await?;
//! posts.create_post(NewPost::new("Hello", "First post")).await?;
//!
//! let comments = CommentController::new(client);
//! comments.select(posts.sorted_view().first().cloned()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod comments;
pub mod config;
pub mod error;
pub mod form;
pub mod posts;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use client::{CancelToken, Outcome, ResourceClient};
pub use comments::{CommentController, CommentState, CommentStatus};
pub use config::{ApiConfig, BoardConfig, CommentConfig, DEFAULT_BASE_URL};
pub use error::{BoardError, ClientError, ConfigError};
pub use form::FormState;
pub use posts::{sort_by_title, LoadStatus, PostListController, PostListState};
pub use types::{
    Comment, CommentId, CommentRequest, NewComment, NewPost, Post, PostId, PLACEHOLDER_EMAIL,
};
pub use validation::{
    check_title_unique, validate_new_comment, validate_new_post, Field, FieldErrors,
    DUPLICATE_TITLE_MESSAGE,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Postboard Core
    pub use crate::{
        BoardError, CommentController, NewComment, NewPost, Outcome, Post, PostListController,
        ResourceClient,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
