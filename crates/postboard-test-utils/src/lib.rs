//! Testing utilities for the Postboard workspace
//!
//! Shared fixtures, a scripted in-memory resource client and tracing
//! setup for tests.

#![allow(missing_docs)]

use parking_lot::Mutex;
use postboard_core::{
    CancelToken, ClientError, Comment, CommentId, CommentRequest, NewPost, Outcome, Post, PostId,
    ResourceClient,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{oneshot, Notify};

/// Install a test subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn post(id: u64, title: &str, body: &str) -> Post {
    Post::new(id, title, body).with_user(1)
}

pub fn comment(id: u64, post_id: u64, body: &str) -> Comment {
    Comment {
        post_id: PostId(post_id),
        id: CommentId(id),
        name: format!("commenter {id}"),
        email: format!("c{id}@example.com"),
        body: body.to_string(),
    }
}

/// A request the scripted client received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListPosts,
    CreatePost(NewPost),
    DeletePost(PostId),
    ListComments(PostId),
    CreateComment(CommentRequest),
}

type CommentReply = Result<Vec<Comment>, ClientError>;
type PostsReply = Result<Vec<Post>, ClientError>;

#[derive(Debug)]
struct Script {
    posts: PostsReply,
    hold_posts: bool,
    pending_posts: VecDeque<oneshot::Sender<PostsReply>>,
    create_latency: Option<Duration>,
    create_post_error: Option<ClientError>,
    delete_error: Option<ClientError>,
    comments: HashMap<PostId, CommentReply>,
    create_comment_error: Option<ClientError>,
    held: HashSet<PostId>,
    pending: HashMap<PostId, VecDeque<oneshot::Sender<CommentReply>>>,
    next_post_id: u64,
    next_comment_id: u64,
    calls: Vec<Call>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            posts: Ok(Vec::new()),
            hold_posts: false,
            pending_posts: VecDeque::new(),
            create_latency: None,
            create_post_error: None,
            delete_error: None,
            comments: HashMap::new(),
            create_comment_error: None,
            held: HashSet::new(),
            pending: HashMap::new(),
            next_post_id: 101,
            next_comment_id: 501,
            calls: Vec::new(),
        }
    }
}

/// In-memory resource client with scripted responses
///
/// Post list loads and comment loads for a "held" post wait until the
/// test releases them, which lets tests reorder responses. By default a held load also
/// returns `Outcome::Cancelled` as soon as its token fires; with
/// cancellation ignored it keeps waiting and delivers whatever is
/// released, like a server that answers anyway.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    script: Mutex<Script>,
    changed: Notify,
    ignore_cancellation: AtomicBool,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_posts(&self, posts: Vec<Post>) {
        self.script.lock().posts = Ok(posts);
    }

    pub fn fail_list_posts(&self, error: ClientError) {
        self.script.lock().posts = Err(error);
    }

    /// Make post list loads wait for [`Self::release_posts`]
    pub fn hold_posts(&self) {
        self.script.lock().hold_posts = true;
    }

    /// Answer the oldest held post list load
    pub fn release_posts(&self, reply: PostsReply) -> bool {
        let sender = self.script.lock().pending_posts.pop_front();
        sender.is_some_and(|tx| tx.send(reply).is_ok())
    }

    /// Wait until `count` post list loads are parked
    pub async fn wait_for_pending_posts(&self, count: usize) {
        self.wait_until(|script| script.pending_posts.len() >= count)
            .await;
    }

    /// Delay every create call by `latency`
    pub fn set_create_latency(&self, latency: Duration) {
        self.script.lock().create_latency = Some(latency);
    }

    pub fn fail_create_post(&self, error: Option<ClientError>) {
        self.script.lock().create_post_error = error;
    }

    pub fn fail_delete(&self, error: Option<ClientError>) {
        self.script.lock().delete_error = error;
    }

    pub fn set_comments(&self, post_id: u64, comments: Vec<Comment>) {
        self.script.lock().comments.insert(PostId(post_id), Ok(comments));
    }

    pub fn fail_comments(&self, post_id: u64, error: ClientError) {
        self.script.lock().comments.insert(PostId(post_id), Err(error));
    }

    pub fn fail_create_comment(&self, error: Option<ClientError>) {
        self.script.lock().create_comment_error = error;
    }

    /// Make comment loads for `post_id` wait for [`Self::release_comments`]
    pub fn hold_comments(&self, post_id: u64) {
        self.script.lock().held.insert(PostId(post_id));
    }

    pub fn ignore_cancellation(&self, ignore: bool) {
        self.ignore_cancellation.store(ignore, Ordering::Release);
    }

    /// Answer the oldest held load for `post_id`
    ///
    /// Returns false if no load was waiting or its caller went away.
    pub fn release_comments(&self, post_id: u64, reply: CommentReply) -> bool {
        let sender = self
            .script
            .lock()
            .pending
            .get_mut(&PostId(post_id))
            .and_then(VecDeque::pop_front);
        sender.is_some_and(|tx| tx.send(reply).is_ok())
    }

    /// Wait until a held load for `post_id` is parked
    pub async fn wait_for_pending(&self, post_id: u64) {
        let post_id = PostId(post_id);
        self.wait_until(|script| script.pending.get(&post_id).is_some_and(|q| !q.is_empty()))
            .await;
    }

    async fn wait_until(&self, ready: impl Fn(&Script) -> bool) {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if ready(&self.script.lock()) {
                return;
            }
            notified.await;
        }
    }

    async fn create_delay(&self) {
        let latency = self.script.lock().create_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().calls.len()
    }

    fn record(&self, call: Call) {
        self.script.lock().calls.push(call);
    }
}

#[async_trait::async_trait]
impl ResourceClient for ScriptedClient {
    async fn list_posts(&self) -> Result<Vec<Post>, ClientError> {
        self.record(Call::ListPosts);
        let rx = {
            let mut script = self.script.lock();
            if !script.hold_posts {
                return script.posts.clone();
            }
            let (tx, rx) = oneshot::channel();
            script.pending_posts.push_back(tx);
            rx
        };
        self.changed.notify_waiters();
        rx.await
            .map_err(|_| ClientError::Network("held request dropped".to_string()))?
    }

    async fn create_post(&self, data: &NewPost) -> Result<Post, ClientError> {
        self.record(Call::CreatePost(data.clone()));
        self.create_delay().await;
        let mut script = self.script.lock();
        if let Some(error) = script.create_post_error.clone() {
            return Err(error);
        }
        let id = script.next_post_id;
        script.next_post_id += 1;
        Ok(Post::new(id, data.title.clone(), data.body.clone()))
    }

    async fn delete_post(&self, id: PostId) -> Result<(), ClientError> {
        self.record(Call::DeletePost(id));
        match self.script.lock().delete_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn list_comments_by_post(
        &self,
        post_id: PostId,
        token: &CancelToken,
    ) -> Result<Outcome<Vec<Comment>>, ClientError> {
        self.record(Call::ListComments(post_id));
        let rx = {
            let mut script = self.script.lock();
            if !script.held.contains(&post_id) {
                return script
                    .comments
                    .get(&post_id)
                    .cloned()
                    .unwrap_or_else(|| Ok(Vec::new()))
                    .map(Outcome::Completed);
            }
            let (tx, rx) = oneshot::channel();
            script.pending.entry(post_id).or_default().push_back(tx);
            rx
        };
        self.changed.notify_waiters();

        let reply = if self.ignore_cancellation.load(Ordering::Acquire) {
            rx.await
        } else {
            tokio::select! {
                biased;
                () = token.cancelled() => return Ok(Outcome::Cancelled),
                reply = rx => reply,
            }
        };
        reply
            .map_err(|_| ClientError::Network("held request dropped".to_string()))?
            .map(Outcome::Completed)
    }

    async fn create_comment(&self, data: &CommentRequest) -> Result<Comment, ClientError> {
        self.record(Call::CreateComment(data.clone()));
        self.create_delay().await;
        let mut script = self.script.lock();
        if let Some(error) = script.create_comment_error.clone() {
            return Err(error);
        }
        let id = script.next_comment_id;
        script.next_comment_id += 1;
        // Echo shape of the remote API: no real authorship.
        Ok(Comment {
            post_id: data.post_id,
            id: CommentId(id),
            name: String::new(),
            email: String::new(),
            body: data.body.clone(),
        })
    }
}
