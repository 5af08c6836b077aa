//! Post and comment handlers.

use actix_web::{HttpResponse, web};

use postline_core::domain::{Comment, Key, Post};
use postline_shared::ApiResponse;
use postline_shared::dto::{
    CommentResponse, CreateCommentRequest, CreatePostRequest, PostResponse, TimelineQuery,
};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn encoded(key: Option<&Key>) -> Option<String> {
    key.and_then(|k| k.encode().ok())
}

fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        key: encoded(comment.key.as_ref()),
        post_key: encoded(Some(&comment.post_key)).unwrap_or_default(),
        text: comment.text,
        author: comment.author,
        creation: comment.creation,
    }
}

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        key: encoded(post.key.as_ref()),
        title: post.title,
        text: post.text,
        author: post.author,
        creation: post.creation,
        comments: post.comments.into_iter().map(comment_response).collect(),
    }
}

/// GET /api/posts?limit=N
pub async fn list_posts(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<TimelineQuery>,
) -> AppResult<HttpResponse> {
    let limit = query
        .limit
        .unwrap_or(state.blog.config().default_limit);

    let posts = state.blog.fetch_posts(identity.0.as_ref(), limit).await?;
    let body: Vec<_> = posts.into_iter().map(post_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// GET /api/users/{email}/posts?limit=N
pub async fn list_user_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<TimelineQuery>,
) -> AppResult<HttpResponse> {
    let email = path.into_inner();
    let limit = query
        .limit
        .unwrap_or(state.blog.config().default_limit);

    let posts = state.blog.fetch_posts_for_user(&email, limit).await?;
    let body: Vec<_> = posts.into_iter().map(post_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// GET /api/posts/{post_key}/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_key = Key::decode(&path.into_inner())?;

    let comments = state
        .blog
        .fetch_comments(identity.0.as_ref(), &post_key)
        .await?;
    let body: Vec<_> = comments.into_iter().map(comment_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// POST /api/posts - Protected route
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .blog
        .publish_post(Some(&identity.0), &req.title, &req.text)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(post))))
}

/// POST /api/comments - Protected route
pub async fn create_comment(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let comment = state
        .blog
        .publish_comment(Some(&identity.0), &req.text, &req.post_key)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(comment_response(comment))))
}
