//! HTTP resource client
//!
//! Implements [`ResourceClient`] over the REST collections:
//! - `GET /posts`, `POST /posts`, `DELETE /posts/{id}`
//! - `GET /comments?postId={id}`, `POST /comments`
//!
//! Failures are classified as network (no response), server (non-2xx
//! status) or decode (body not of the expected shape).

#![warn(unreachable_pub)]

use postboard_core::{
    ApiConfig, CancelToken, ClientError, Comment, CommentRequest, NewPost, Outcome, Post, PostId,
    ResourceClient,
};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// reqwest-backed resource client
#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpResourceClient {
    /// Build a client from API settings
    ///
    /// # Errors
    /// `ClientError::InvalidConfig` if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    /// Collection root requests are sent to
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send and reject non-success statuses
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ResourceClient for HttpResourceClient {
    async fn list_posts(&self) -> Result<Vec<Post>, ClientError> {
        tracing::debug!("GET /posts");
        self.fetch_json(self.client.get(self.url("/posts"))).await
    }

    async fn create_post(&self, data: &NewPost) -> Result<Post, ClientError> {
        tracing::debug!("POST /posts");
        self.fetch_json(self.client.post(self.url("/posts")).json(data))
            .await
    }

    async fn delete_post(&self, id: PostId) -> Result<(), ClientError> {
        tracing::debug!("DELETE /posts/{}", id);
        // No body is required on success.
        self.send(self.client.delete(self.url(&format!("/posts/{id}"))))
            .await
            .map(|_| ())
    }

    async fn list_comments_by_post(
        &self,
        post_id: PostId,
        token: &CancelToken,
    ) -> Result<Outcome<Vec<Comment>>, ClientError> {
        if token.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        tracing::debug!("GET /comments?postId={}", post_id);

        let request = self
            .client
            .get(self.url("/comments"))
            .query(&[("postId", post_id.0)]);

        tokio::select! {
            biased;
            () = token.cancelled() => {
                tracing::debug!("Comment request for post {} cancelled", post_id);
                Ok(Outcome::Cancelled)
            }
            result = self.fetch_json::<Vec<Comment>>(request) => result.map(Outcome::Completed),
        }
    }

    async fn create_comment(&self, data: &CommentRequest) -> Result<Comment, ClientError> {
        tracing::debug!("POST /comments (post {})", data.post_id);
        self.fetch_json(self.client.post(self.url("/comments")).json(data))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postboard_core::BoardConfig;

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = BoardConfig::new().with_base_url("http://localhost:3000/");
        let client = HttpResourceClient::new(&config.api).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.url("/posts"), "http://localhost:3000/posts");
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        // Unroutable address: any request would fail as a network error.
        let config = BoardConfig::new().with_base_url("http://127.0.0.1:9");
        let client = HttpResourceClient::new(&config.api).unwrap();

        let token = CancelToken::new();
        token.cancel();
        let outcome = client
            .list_comments_by_post(PostId(1), &token)
            .await
            .unwrap();
        assert!(outcome.is_cancelled());
    }
}
