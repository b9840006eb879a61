//! Comment sub-controller
//!
//! Owns the comments of the currently selected post. Every selection
//! change cancels the previous load and bumps a generation number; a
//! load result is applied only while its generation is still current,
//! so comments of one post never land under another.

use crate::client::{CancelToken, Outcome, ResourceClient};
use crate::config::CommentConfig;
use crate::error::BoardError;
use crate::form::FormState;
use crate::types::{Comment, CommentRequest, NewComment, Post, PLACEHOLDER_EMAIL};
use crate::validation::validate_new_comment;
use parking_lot::Mutex;
use std::sync::Arc;

/// Comment collection status for the current selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentStatus {
    /// No post selected
    #[default]
    Empty,
    /// Load in flight for the selected post
    Loading,
    /// Comments of the selected post are loaded
    Ready,
    /// Load failed; see the recorded error
    Failed,
}

/// Snapshot of the comment panel for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentState {
    /// Status for the current selection
    pub status: CommentStatus,
    /// Selected post (value copy, not a reference into the list)
    pub selected: Option<Post>,
    /// Comments of the selected post
    pub comments: Vec<Comment>,
    /// Human-readable message for the last failed load
    pub error: Option<String>,
    /// Add-comment form
    pub form: FormState<NewComment>,
}

#[derive(Debug, Default)]
struct CommentInner {
    state: CommentState,
    generation: u64,
    token: Option<CancelToken>,
}

impl CommentInner {
    /// Supersede any in-flight load and show `post` with no comments
    fn switch_to(&mut self, post: Option<Post>) -> u64 {
        if let Some(previous) = self.token.take() {
            previous.cancel();
        }
        self.generation += 1;
        self.state.comments.clear();
        self.state.error = None;
        self.state.form.reset();
        self.state.status = CommentStatus::Empty;
        self.state.selected = post;
        self.generation
    }

    fn reject(&mut self, error: BoardError) -> BoardError {
        self.state.form.fail_submit(&error);
        error
    }
}

/// Controller for the selected post's comments
pub struct CommentController {
    client: Arc<dyn ResourceClient>,
    placeholder_email: String,
    inner: Mutex<CommentInner>,
}

impl std::fmt::Debug for CommentController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentController")
            .field("placeholder_email", &self.placeholder_email)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl CommentController {
    /// Create controller with nothing selected
    #[must_use]
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self {
            client,
            placeholder_email: PLACEHOLDER_EMAIL.to_string(),
            inner: Mutex::new(CommentInner::default()),
        }
    }

    /// Create controller using configured authorship placeholder
    #[must_use]
    pub fn with_config(client: Arc<dyn ResourceClient>, config: &CommentConfig) -> Self {
        Self {
            placeholder_email: config.placeholder_email.clone(),
            ..Self::new(client)
        }
    }

    /// Change the selected post and load its comments
    ///
    /// Cancels any in-flight load first. `None` closes the panel.
    ///
    /// # Returns
    /// - `Outcome::Completed(n)` with the number of comments applied
    ///   (0 when closing)
    /// - `Outcome::Cancelled` if a newer selection superseded this one;
    ///   state is left untouched in that case
    ///
    /// # Errors
    /// - `BoardError::MissingIdentifier` if the post has no id
    /// - `BoardError::Client` if the load fails
    ///
    /// Both are also recorded on the state as `Failed`.
    pub async fn select(&self, post: Option<Post>) -> Result<Outcome<usize>, BoardError> {
        let (post_id, token, generation) = {
            let mut inner = self.inner.lock();
            let generation = inner.switch_to(post);

            let post_id = match inner.state.selected.as_ref().map(|p| p.id) {
                None => {
                    tracing::debug!("Comment selection cleared (generation {})", generation);
                    return Ok(Outcome::Completed(0));
                }
                Some(None) => {
                    let error = BoardError::MissingIdentifier;
                    inner.state.status = CommentStatus::Failed;
                    inner.state.error = Some(error.to_string());
                    return Err(error);
                }
                Some(Some(id)) => id,
            };

            let token = CancelToken::new();
            inner.token = Some(token.clone());
            inner.state.status = CommentStatus::Loading;
            (post_id, token, generation)
        };
        tracing::debug!("Loading comments for post {} (generation {})", post_id, generation);

        let result = self.client.list_comments_by_post(post_id, &token).await;

        let mut inner = self.inner.lock();
        if inner.generation != generation || token.is_cancelled() {
            tracing::debug!(
                "Discarding comments for post {} (generation {} superseded)",
                post_id,
                generation
            );
            return Ok(Outcome::Cancelled);
        }
        match result {
            Ok(Outcome::Completed(comments)) => {
                let count = comments.len();
                inner.state.comments = comments;
                inner.state.status = CommentStatus::Ready;
                inner.token = None;
                tracing::debug!("Loaded {} comments for post {}", count, post_id);
                Ok(Outcome::Completed(count))
            }
            Ok(Outcome::Cancelled) => Ok(Outcome::Cancelled),
            Err(e) => {
                tracing::warn!("Loading comments for post {} failed: {}", post_id, e);
                inner.state.error = Some(format!("could not load comments: {e}"));
                inner.state.status = CommentStatus::Failed;
                inner.token = None;
                Err(e.into())
            }
        }
    }

    /// Deselect and drop any in-flight load
    pub fn close(&self) {
        let generation = self.inner.lock().switch_to(None);
        tracing::debug!("Comment panel closed (generation {})", generation);
    }

    /// Validate and post a comment on the selected post
    ///
    /// The server echo is shown with `name` set to the submitted title
    /// and `email` set to the placeholder address, then appended
    /// locally without re-fetching.
    ///
    /// # Errors
    /// - `BoardError::NoSelection` if no post is selected
    /// - `BoardError::MissingIdentifier` if the selected post has no id
    /// - `BoardError::Busy` while the selected post's comments are loading
    /// - `BoardError::Validation` if title or body is empty
    /// - `BoardError::Client` if the request fails
    pub async fn add_comment(&self, candidate: NewComment) -> Result<Comment, BoardError> {
        let (request, generation) = {
            let mut inner = self.inner.lock();
            inner.state.form.set_draft(candidate.clone());
            inner.state.form.begin_submit();

            let Some(selected_id) = inner.state.selected.as_ref().map(|p| p.id) else {
                return Err(inner.reject(BoardError::NoSelection));
            };
            let Some(post_id) = selected_id else {
                return Err(inner.reject(BoardError::MissingIdentifier));
            };
            // The pending load would replace the list and drop the new comment.
            if inner.state.status == CommentStatus::Loading {
                return Err(inner.reject(BoardError::Busy));
            }
            let field_errors = validate_new_comment(&candidate);
            if !field_errors.is_empty() {
                return Err(inner.reject(BoardError::Validation(field_errors)));
            }
            (CommentRequest::new(candidate, post_id), inner.generation)
        };
        tracing::info!("Adding comment to post {}", request.post_id);

        let result = self.client.create_comment(&request).await;

        let mut inner = self.inner.lock();
        let current = inner.generation == generation;
        match result {
            Ok(mut comment) => {
                comment.name.clone_from(&request.title);
                comment.email.clone_from(&self.placeholder_email);
                if current {
                    inner.state.comments.push(comment.clone());
                    inner.state.form.reset();
                } else {
                    tracing::debug!(
                        "Selection changed while posting; comment {} not appended",
                        comment.id
                    );
                }
                Ok(comment)
            }
            Err(e) => {
                tracing::warn!("Adding comment to post {} failed: {}", request.post_id, e);
                let error = BoardError::from(e);
                if current {
                    inner.state.form.fail_submit(&error);
                }
                Err(error)
            }
        }
    }

    /// Submit the current add-comment form draft
    pub async fn submit_comment_form(&self) -> Result<Comment, BoardError> {
        let draft = self.inner.lock().state.form.draft.clone();
        self.add_comment(draft).await
    }

    /// Replace the add-comment draft
    pub fn set_comment_draft(&self, draft: NewComment) {
        self.inner.lock().state.form.set_draft(draft);
    }

    /// Comments of the selected post
    #[must_use]
    pub fn comments(&self) -> Vec<Comment> {
        self.inner.lock().state.comments.clone()
    }

    /// Current status
    #[inline]
    #[must_use]
    pub fn status(&self) -> CommentStatus {
        self.inner.lock().state.status
    }

    /// Clone of the full state
    #[must_use]
    pub fn snapshot(&self) -> CommentState {
        self.inner.lock().state.clone()
    }
}
