//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to publish a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub text: String,
}

/// Request to comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
    /// Encoded key of the post being commented on.
    pub post_key: String,
}

/// `?limit=N` on timeline reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub key: Option<String>,
    pub post_key: String,
    pub text: String,
    pub author: String,
    pub creation: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub key: Option<String>,
    pub title: String,
    pub text: String,
    pub author: String,
    pub creation: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<CommentResponse>,
}
