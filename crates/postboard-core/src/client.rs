//! Resource client contract
//!
//! The controllers reach the remote `posts` and `comments` collections
//! only through [`ResourceClient`]. Implementations classify failures
//! as [`ClientError`] and report cancellation as [`Outcome::Cancelled`].

use crate::error::ClientError;
use crate::types::{Comment, CommentRequest, NewPost, Post, PostId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Result of a cancellation-aware call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Call ran to completion
    Completed(T),
    /// Token fired before the call completed; callers treat this as a no-op
    Cancelled,
}

impl<T> Outcome<T> {
    /// Check if the call was cancelled
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Completed value, if any
    #[inline]
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}

#[derive(Debug, Default)]
struct TokenInner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cooperative cancellation handle
///
/// Clones share state: cancelling any clone cancels all of them.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

impl CancelToken {
    /// Create a live token
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the token cancelled and wake every waiter
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Check if the token has been cancelled
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolve once the token is cancelled
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent cancel is not missed.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Remote collection access used by the controllers
///
/// Every operation either yields parsed records or fails with a
/// classified [`ClientError`].
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ResourceClient: Send + Sync {
    /// `GET /posts`
    async fn list_posts(&self) -> Result<Vec<Post>, ClientError>;

    /// `POST /posts`
    async fn create_post(&self, data: &NewPost) -> Result<Post, ClientError>;

    /// `DELETE /posts/{id}`
    async fn delete_post(&self, id: PostId) -> Result<(), ClientError>;

    /// `GET /comments?postId={id}`, abandoned when `token` fires
    async fn list_comments_by_post(
        &self,
        post_id: PostId,
        token: &CancelToken,
    ) -> Result<Outcome<Vec<Comment>>, ClientError>;

    /// `POST /comments`
    async fn create_comment(&self, data: &CommentRequest) -> Result<Comment, ClientError>;
}
