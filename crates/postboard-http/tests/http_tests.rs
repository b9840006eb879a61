use postboard_core::{
    BoardConfig, CancelToken, ClientError, CommentController, CommentRequest, CommentStatus,
    NewComment, NewPost, Post, PostId, PostListController, ResourceClient, PLACEHOLDER_EMAIL,
};
use postboard_http::HttpResourceClient;
use postboard_test_utils::init_tracing;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Reply};

const SLOW_POST: u64 = 4;

fn comments_for(post_id: u64) -> Response {
    match post_id {
        1 => warp::reply::json(&json!([
            {"postId": 1, "id": 1, "name": "n1", "email": "a@x.io", "body": "b1"},
            {"postId": 1, "id": 2, "name": "n2", "email": "b@x.io", "body": "b2"}
        ]))
        .into_response(),
        2 => warp::reply::json(&json!({"not": "an array"})).into_response(),
        3 => warp::reply::with_status(warp::reply::json(&json!({})), StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        _ => warp::reply::json(&json!([])).into_response(),
    }
}

/// In-process stand-in for the remote collections
fn api() -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let list_posts = warp::path!("posts").and(warp::get()).map(|| {
        warp::reply::json(&json!([
            {"userId": 1, "id": 1, "title": "B", "body": "x"},
            {"userId": 1, "id": 2, "title": "A", "body": "y"}
        ]))
    });

    let create_post = warp::path!("posts")
        .and(warp::post())
        .and(warp::body::json())
        .map(|mut body: Value| {
            body["id"] = json!(101);
            warp::reply::with_status(warp::reply::json(&body), StatusCode::CREATED)
        });

    let delete_post = warp::path!("posts" / u64).and(warp::delete()).map(|id: u64| {
        let status = if id == 404 {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::OK
        };
        warp::reply::with_status(warp::reply::json(&json!({})), status)
    });

    let list_comments = warp::path!("comments")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and_then(|query: HashMap<String, String>| async move {
            let post_id: u64 = query
                .get("postId")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default();
            if post_id == SLOW_POST {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok::<_, warp::Rejection>(comments_for(post_id))
        });

    let create_comment = warp::path!("comments")
        .and(warp::post())
        .and(warp::body::json())
        .map(|mut body: Value| {
            body["id"] = json!(501);
            warp::reply::with_status(warp::reply::json(&body), StatusCode::CREATED)
        });

    list_posts
        .or(create_post)
        .or(delete_post)
        .or(list_comments)
        .or(create_comment)
}

/// Serves `/posts` with an object instead of an array
fn broken_api() -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path!("posts")
        .and(warp::get())
        .map(|| warp::reply::json(&json!({"posts": "unavailable"})))
}

fn client_for(base_url: &str) -> HttpResourceClient {
    let config = BoardConfig::new()
        .with_base_url(base_url)
        .with_timeout_secs(10);
    HttpResourceClient::new(&config.api).unwrap()
}

async fn start() -> HttpResourceClient {
    init_tracing();
    let (addr, server) = warp::serve(api()).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    client_for(&format!("http://{addr}"))
}

async fn start_broken() -> HttpResourceClient {
    init_tracing();
    let (addr, server) = warp::serve(broken_api()).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    client_for(&format!("http://{addr}"))
}

fn closed_port_client() -> HttpResourceClient {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    client_for(&format!("http://{addr}"))
}

#[tokio::test]
async fn test_list_posts() {
    let client = start().await;
    let posts = client.list_posts().await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0], Post::new(1, "B", "x").with_user(1));
}

#[tokio::test]
async fn test_list_posts_wrong_shape_is_decode_failure() {
    let client = start_broken().await;
    let err = client.list_posts().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_server_is_network_failure() {
    let client = closed_port_client();
    let err = client.list_posts().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)), "got {err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_create_post_returns_server_record() {
    let client = start().await;
    let post = client
        .create_post(&NewPost::new("Hello", "World"))
        .await
        .unwrap();

    assert_eq!(post.id, Some(PostId(101)));
    assert_eq!(post.title, "Hello");
    assert_eq!(post.user_id, None);
}

#[tokio::test]
async fn test_delete_post_statuses() {
    let client = start().await;
    client.delete_post(PostId(1)).await.unwrap();

    let err = client.delete_post(PostId(404)).await.unwrap_err();
    assert_eq!(err, ClientError::Server { status: 404 });
}

#[tokio::test]
async fn test_list_comments_outcomes() {
    let client = start().await;
    let token = CancelToken::new();

    let comments = client
        .list_comments_by_post(PostId(1), &token)
        .await
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(comments.len(), 2);
    assert!(comments.iter().all(|c| c.post_id == PostId(1)));

    let err = client
        .list_comments_by_post(PostId(2), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));

    let err = client
        .list_comments_by_post(PostId(3), &token)
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::Server { status: 500 });
}

#[tokio::test]
async fn test_cancel_in_flight_comment_request() {
    let client = start().await;
    let token = CancelToken::new();

    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        })
    };

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        client.list_comments_by_post(PostId(SLOW_POST), &token),
    )
    .await
    .expect("cancellation should end the request")
    .unwrap();

    assert!(outcome.is_cancelled());
    canceller.await.unwrap();
}

#[tokio::test]
async fn test_create_comment_echo() {
    let client = start().await;
    let request = CommentRequest::new(NewComment::new("T", "B"), PostId(1));

    let comment = client.create_comment(&request).await.unwrap();

    assert_eq!(comment.post_id, PostId(1));
    assert_eq!(comment.body, "B");
    assert!(comment.email.is_empty());
}

#[tokio::test]
async fn test_controllers_over_http() {
    let client: Arc<dyn ResourceClient> = Arc::new(start().await);
    let posts = PostListController::new(client.clone());
    let comments = CommentController::new(client);

    posts.load_all().await.unwrap();
    let sorted = posts.sorted_view();
    assert_eq!(sorted[0].title, "A");

    comments.select(posts.posts().first().cloned()).await.unwrap();
    assert_eq!(comments.status(), CommentStatus::Ready);

    let added = comments
        .add_comment(NewComment::new("Title", "Body"))
        .await
        .unwrap();
    assert_eq!(added.name, "Title");
    assert_eq!(added.email, PLACEHOLDER_EMAIL);
    assert_eq!(comments.comments().len(), 3);
}
