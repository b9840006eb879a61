//! Post list controller
//!
//! Owns the authoritative in-memory post collection and orchestrates:
//! - Initial load (`Idle → Loading → Ready | Failed`)
//! - Validated creation with optimistic insert of the server echo
//! - Optimistic deletion behind a confirmation step
//! - The title-sorted view

use crate::client::{Outcome, ResourceClient};
use crate::error::BoardError;
use crate::form::FormState;
use crate::types::{NewPost, Post, PostId};
use crate::validation::{check_title_unique, validate_new_post};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Load status of a collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Request in flight
    Loading,
    /// Last load succeeded
    Ready,
    /// Last load failed; see the recorded error
    Failed,
}

/// Snapshot of the post list for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostListState {
    /// Load status
    pub status: LoadStatus,
    /// Posts in arrival order
    pub posts: Vec<Post>,
    /// Human-readable message for the last failed load
    pub error: Option<String>,
    /// Create-post dialog visibility
    pub create_dialog_open: bool,
    /// Create-post form
    pub form: FormState<NewPost>,
    /// Post awaiting delete confirmation
    pub pending_delete: Option<Post>,
}

impl PostListState {
    /// Check if a load is in flight
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.status == LoadStatus::Loading
    }
}

/// Order posts by title, case-sensitive, keeping arrival order for ties
#[must_use]
pub fn sort_by_title(posts: &[Post]) -> Vec<Post> {
    let mut sorted = posts.to_vec();
    sorted.sort_by(|a, b| a.title.cmp(&b.title));
    sorted
}

#[derive(Debug, Default)]
struct ListInner {
    state: PostListState,
    /// Cached sorted view, dropped on every collection change
    sorted: Option<Vec<Post>>,
    /// Bumped by every `load_all`; only the latest load may apply
    load_generation: u64,
    /// Lowercased titles of creates awaiting the server
    creating: HashSet<String>,
}

impl ListInner {
    fn replace_posts(&mut self, posts: Vec<Post>) {
        self.state.posts = posts;
        self.sorted = None;
    }

    fn push_post(&mut self, post: Post) {
        self.state.posts.push(post);
        self.sorted = None;
    }

    fn remove_post(&mut self, id: PostId) -> bool {
        let before = self.state.posts.len();
        self.state.posts.retain(|p| p.id != Some(id));
        self.sorted = None;
        self.state.posts.len() != before
    }

    fn title_taken(&self, candidate: &NewPost) -> bool {
        check_title_unique(candidate, &self.state.posts).is_some()
            || self.creating.contains(&candidate.title.to_lowercase())
    }

    fn reject(&mut self, error: BoardError) -> BoardError {
        self.state.form.fail_submit(&error);
        error
    }
}

/// Controller for the post collection
///
/// Operations take `&self`; state is locked only between awaits, so
/// overlapping operations interleave at network boundaries.
pub struct PostListController {
    client: Arc<dyn ResourceClient>,
    inner: Mutex<ListInner>,
}

impl std::fmt::Debug for PostListController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostListController")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl PostListController {
    /// Create controller in the `Idle` state
    #[must_use]
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self {
            client,
            inner: Mutex::new(ListInner::default()),
        }
    }

    /// Replace the collection from `GET /posts`
    ///
    /// Clears the previous error and ends outside `Loading` whatever
    /// the outcome. A newer `load_all` supersedes this one.
    ///
    /// # Returns
    /// - `Outcome::Completed(n)` with the number of posts loaded
    /// - `Outcome::Cancelled` if a newer load started meanwhile; its
    ///   result is discarded and state is left to the newer load
    ///
    /// # Errors
    /// `BoardError::Client` if the request fails; the message is also
    /// recorded on the state and the previous collection is kept.
    pub async fn load_all(&self) -> Result<Outcome<usize>, BoardError> {
        let generation = {
            let mut inner = self.inner.lock();
            inner.load_generation += 1;
            inner.state.status = LoadStatus::Loading;
            inner.state.error = None;
            inner.load_generation
        };
        tracing::info!("Loading posts (generation {})", generation);

        let result = self.client.list_posts().await;

        let mut inner = self.inner.lock();
        if inner.load_generation != generation {
            tracing::debug!("Discarding posts from superseded load {}", generation);
            return Ok(Outcome::Cancelled);
        }
        match result {
            Ok(posts) => {
                let count = posts.len();
                inner.replace_posts(posts);
                inner.state.status = LoadStatus::Ready;
                tracing::info!("Loaded {} posts", count);
                Ok(Outcome::Completed(count))
            }
            Err(e) => {
                tracing::warn!("Loading posts failed: {}", e);
                inner.state.error = Some(format!("could not load posts: {e}"));
                inner.state.status = LoadStatus::Failed;
                Err(e.into())
            }
        }
    }

    /// Validate and create a post, appending the server echo
    ///
    /// The candidate becomes the form draft. Field validation and the
    /// title uniqueness check run before any network call. The title
    /// stays reserved until the server answers, so overlapping creates
    /// cannot both pass the uniqueness check.
    ///
    /// # Errors
    /// - `BoardError::Busy` while the collection is loading
    /// - `BoardError::Validation` if title or body is empty
    /// - `BoardError::DuplicateTitle` if the title is used or being created
    /// - `BoardError::Client` if the request fails
    pub async fn create_post(&self, candidate: NewPost) -> Result<Post, BoardError> {
        let reserved = candidate.title.to_lowercase();
        {
            let mut inner = self.inner.lock();
            inner.state.form.set_draft(candidate.clone());
            inner.state.form.begin_submit();

            if inner.state.is_busy() {
                return Err(inner.reject(BoardError::Busy));
            }
            let field_errors = validate_new_post(&candidate);
            if !field_errors.is_empty() {
                return Err(inner.reject(BoardError::Validation(field_errors)));
            }
            if inner.title_taken(&candidate) {
                return Err(inner.reject(BoardError::DuplicateTitle));
            }
            inner.creating.insert(reserved.clone());
        }
        tracing::info!("Creating post: {}", candidate.title);

        let result = self.client.create_post(&candidate).await;

        let mut inner = self.inner.lock();
        inner.creating.remove(&reserved);
        match result {
            Ok(post) => {
                // A reload may already have brought the new post in.
                if check_title_unique(&candidate, &inner.state.posts).is_none() {
                    inner.push_post(post.clone());
                } else {
                    tracing::debug!("Post {:?} already listed; not appended", post.id);
                }
                inner.state.form.reset();
                inner.state.create_dialog_open = false;
                tracing::debug!("Created post {:?}", post.id);
                Ok(post)
            }
            Err(e) => {
                tracing::warn!("Creating post failed: {}", e);
                Err(inner.reject(e.into()))
            }
        }
    }

    /// Submit the current create-post form draft
    pub async fn submit_post_form(&self) -> Result<Post, BoardError> {
        let draft = self.inner.lock().state.form.draft.clone();
        self.create_post(draft).await
    }

    /// Delete a post optimistically
    ///
    /// The post leaves the local collection (and the pending-delete
    /// slot) before the server answers. The server result is only
    /// logged; a failed delete is not rolled back.
    ///
    /// # Errors
    /// `BoardError::MissingIdentifier` if the post has no id; nothing is
    /// sent in that case.
    pub async fn delete_post(&self, post: &Post) -> Result<PostId, BoardError> {
        let id = post.id.ok_or(BoardError::MissingIdentifier)?;
        {
            let mut inner = self.inner.lock();
            if !inner.remove_post(id) {
                tracing::debug!("Post {} was not in the local list", id);
            }
            if inner.state.pending_delete.as_ref().and_then(|p| p.id) == Some(id) {
                inner.state.pending_delete = None;
            }
        }
        tracing::info!("Deleting post {}", id);

        match self.client.delete_post(id).await {
            Ok(()) => tracing::debug!("Server confirmed delete of post {}", id),
            Err(e) => tracing::warn!("Server delete of post {} failed: {}", id, e),
        }
        Ok(id)
    }

    /// Mark a post as awaiting delete confirmation
    pub fn request_delete(&self, post: Post) {
        self.inner.lock().state.pending_delete = Some(post);
    }

    /// Dismiss the delete confirmation without deleting
    pub fn dismiss_delete(&self) {
        self.inner.lock().state.pending_delete = None;
    }

    /// Delete the post awaiting confirmation, if any
    ///
    /// # Returns
    /// `Ok(None)` when nothing was pending
    pub async fn confirm_delete(&self) -> Result<Option<PostId>, BoardError> {
        let pending = self.inner.lock().state.pending_delete.clone();
        match pending {
            Some(post) => self.delete_post(&post).await.map(Some),
            None => Ok(None),
        }
    }

    /// Open the create-post dialog
    pub fn open_create_dialog(&self) {
        self.inner.lock().state.create_dialog_open = true;
    }

    /// Close the create-post dialog, discarding the draft
    pub fn close_create_dialog(&self) {
        let mut inner = self.inner.lock();
        inner.state.create_dialog_open = false;
        inner.state.form.reset();
    }

    /// Replace the create-post draft
    pub fn set_post_draft(&self, draft: NewPost) {
        self.inner.lock().state.form.set_draft(draft);
    }

    /// Posts ordered by title
    ///
    /// Ordinary case-sensitive string order, stable for equal titles.
    /// Computed once per collection change.
    #[must_use]
    pub fn sorted_view(&self) -> Vec<Post> {
        let mut inner = self.inner.lock();
        if inner.sorted.is_none() {
            inner.sorted = Some(sort_by_title(&inner.state.posts));
        }
        inner.sorted.clone().unwrap_or_default()
    }

    /// Posts in arrival order
    #[must_use]
    pub fn posts(&self) -> Vec<Post> {
        self.inner.lock().state.posts.clone()
    }

    /// Current load status
    #[inline]
    #[must_use]
    pub fn status(&self) -> LoadStatus {
        self.inner.lock().state.status
    }

    /// Clone of the full state
    #[must_use]
    pub fn snapshot(&self) -> PostListState {
        self.inner.lock().state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockResourceClient;
    use crate::error::ClientError;
    use crate::validation::Field;
    use proptest::prelude::*;

    fn controller(mock: MockResourceClient) -> PostListController {
        PostListController::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn load_all_replaces_collection() {
        let mut mock = MockResourceClient::new();
        mock.expect_list_posts()
            .times(1)
            .returning(|| Ok(vec![Post::new(1, "B", "x"), Post::new(2, "A", "y")]));

        let ctl = controller(mock);
        assert_eq!(ctl.status(), LoadStatus::Idle);
        assert_eq!(ctl.load_all().await.unwrap(), Outcome::Completed(2));

        let state = ctl.snapshot();
        assert_eq!(state.status, LoadStatus::Ready);
        assert!(!state.is_busy());
        assert_eq!(state.posts.len(), 2);
    }

    #[tokio::test]
    async fn load_failure_records_message_and_keeps_posts() {
        let mut mock = MockResourceClient::new();
        let mut calls = 0;
        mock.expect_list_posts().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(vec![Post::new(1, "A", "x")])
            } else {
                Err(ClientError::Decode("not an array".into()))
            }
        });

        let ctl = controller(mock);
        ctl.load_all().await.unwrap();
        let err = ctl.load_all().await.unwrap_err();
        assert!(matches!(err, BoardError::Client(ClientError::Decode(_))));

        let state = ctl.snapshot();
        assert_eq!(state.status, LoadStatus::Failed);
        assert!(!state.is_busy());
        assert!(state.error.unwrap().contains("not an array"));
        assert_eq!(state.posts.len(), 1);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_client() {
        let mut mock = MockResourceClient::new();
        mock.expect_create_post().never();

        let ctl = controller(mock);
        let err = ctl.create_post(NewPost::new("", "y")).await.unwrap_err();

        let errors = err.field_errors().unwrap();
        assert_eq!(errors.get(Field::Title), Some("the title field is required"));
        assert_eq!(errors.len(), 1);
        assert_eq!(ctl.snapshot().form.field_errors, errors.clone());
    }

    #[tokio::test]
    async fn duplicate_title_never_reaches_client() {
        let mut mock = MockResourceClient::new();
        mock.expect_list_posts()
            .returning(|| Ok(vec![Post::new(1, "Foo", "x")]));
        mock.expect_create_post().never();

        let ctl = controller(mock);
        ctl.load_all().await.unwrap();

        for title in ["FOO", "foo"] {
            let err = ctl.create_post(NewPost::new(title, "b")).await.unwrap_err();
            assert_eq!(err, BoardError::DuplicateTitle);
        }
        let state = ctl.snapshot();
        assert_eq!(
            state.form.submit_error.as_deref(),
            Some("a post with this title already exists")
        );
        assert_eq!(state.form.draft.title, "foo");
    }

    #[tokio::test]
    async fn create_appends_echo_and_resets_form() {
        let mut mock = MockResourceClient::new();
        mock.expect_create_post()
            .withf(|data| data.title == "Zed" && data.body == "b")
            .returning(|data| Ok(Post::new(101, data.title.clone(), data.body.clone())));

        let ctl = controller(mock);
        ctl.open_create_dialog();
        let post = ctl.create_post(NewPost::new("Zed", "b")).await.unwrap();

        let state = ctl.snapshot();
        assert_eq!(post.id, Some(PostId(101)));
        assert_eq!(state.posts, vec![post]);
        assert_eq!(state.form, FormState::new());
        assert!(!state.create_dialog_open);
    }

    #[tokio::test]
    async fn create_failure_keeps_collection_and_draft() {
        let mut mock = MockResourceClient::new();
        mock.expect_create_post()
            .returning(|_| Err(ClientError::Server { status: 500 }));

        let ctl = controller(mock);
        ctl.set_post_draft(NewPost::new("T", "B"));
        let err = ctl.submit_post_form().await.unwrap_err();

        assert!(!err.is_local());
        let state = ctl.snapshot();
        assert!(state.posts.is_empty());
        assert_eq!(state.form.draft, NewPost::new("T", "B"));
        assert!(state.form.submit_error.is_some());
        assert!(!state.form.submitting);
    }

    #[tokio::test]
    async fn delete_without_id_is_local() {
        let mut mock = MockResourceClient::new();
        mock.expect_delete_post().never();

        let ctl = controller(mock);
        let post = Post {
            id: None,
            user_id: None,
            title: "t".into(),
            body: "b".into(),
        };
        assert_eq!(
            ctl.delete_post(&post).await.unwrap_err(),
            BoardError::MissingIdentifier
        );
    }

    #[tokio::test]
    async fn delete_removes_even_when_server_fails() {
        let mut mock = MockResourceClient::new();
        mock.expect_list_posts()
            .returning(|| Ok(vec![Post::new(1, "A", "x"), Post::new(2, "B", "y")]));
        mock.expect_delete_post()
            .withf(|id| *id == PostId(1))
            .times(1)
            .returning(|_| Err(ClientError::Network("connection reset".into())));

        let ctl = controller(mock);
        ctl.load_all().await.unwrap();
        ctl.request_delete(Post::new(1, "A", "x"));

        assert_eq!(ctl.confirm_delete().await.unwrap(), Some(PostId(1)));
        let state = ctl.snapshot();
        assert!(state.posts.iter().all(|p| p.id != Some(PostId(1))));
        assert!(state.pending_delete.is_none());
    }

    #[tokio::test]
    async fn confirm_with_nothing_pending_is_noop() {
        let mut mock = MockResourceClient::new();
        mock.expect_delete_post().never();

        let ctl = controller(mock);
        ctl.request_delete(Post::new(4, "x", "y"));
        ctl.dismiss_delete();
        assert_eq!(ctl.confirm_delete().await.unwrap(), None);
    }

    #[test]
    fn close_dialog_discards_draft() {
        let ctl = controller(MockResourceClient::new());
        ctl.open_create_dialog();
        ctl.set_post_draft(NewPost::new("half", ""));
        ctl.close_create_dialog();

        let state = ctl.snapshot();
        assert!(!state.create_dialog_open);
        assert_eq!(state.form.draft, NewPost::default());
    }

    #[test]
    fn sort_is_case_sensitive_and_stable() {
        let posts = vec![
            Post::new(1, "b", "1"),
            Post::new(2, "B", "2"),
            Post::new(3, "a", "3"),
            Post::new(4, "B", "4"),
        ];
        let ids: Vec<u64> = sort_by_title(&posts)
            .iter()
            .map(|p| p.id.unwrap().0)
            .collect();
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }

    proptest! {
        #[test]
        fn prop_sorted_view_is_ordered_permutation(
            titles in proptest::collection::vec("[a-cA-C]{0,3}", 0..30)
        ) {
            let posts: Vec<Post> = titles
                .iter()
                .enumerate()
                .map(|(i, t)| Post::new(i as u64, t.clone(), ""))
                .collect();
            let sorted = sort_by_title(&posts);

            prop_assert_eq!(sorted.len(), posts.len());
            for pair in sorted.windows(2) {
                prop_assert!(pair[0].title <= pair[1].title);
                if pair[0].title == pair[1].title {
                    prop_assert!(pair[0].id < pair[1].id);
                }
            }
            prop_assert_eq!(sort_by_title(&sorted), sorted);
        }
    }
}
