//! Blog use cases: publishing and reading posts and comments.

use std::sync::Arc;

use crate::domain::{Comment, CurrentUser, Key, Post, User};
use crate::error::{DomainError, RepoError, TimelineError};
use crate::ports::{Cache, Order, Query, Record, RecordStore};
use crate::timeline::{CacheAside, DualSourceFetcher, TimelineConfig, attach_children, with_deadline};

/// Entry point for request handlers.
#[derive(Clone)]
pub struct BlogService {
    store: Arc<dyn RecordStore>,
    fetcher: DualSourceFetcher,
    config: TimelineConfig,
}

impl BlogService {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn Cache>, config: TimelineConfig) -> Self {
        let cache = CacheAside::new(cache, config.cache_ttl, config.call_timeout);
        let fetcher = DualSourceFetcher::new(store.clone(), cache, config.call_timeout);
        Self {
            store,
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Save a new post authored by `user`.
    pub async fn publish_post(
        &self,
        user: Option<&CurrentUser>,
        title: &str,
        text: &str,
    ) -> Result<Post, DomainError> {
        let user = user.ok_or(DomainError::Unauthorized)?;
        self.save_user(user).await?;

        let mut post = Post::new(title, text);
        post.author = user.email.clone();
        post.key = Some(self.put_owned(user, &post).await?);

        tracing::info!(key = ?post.key, author = %post.author, "Post published");
        Ok(post)
    }

    /// Save a new comment by `user` on the post whose encoded key is `post_key`.
    ///
    /// The key is checked before anything is written.
    pub async fn publish_comment(
        &self,
        user: Option<&CurrentUser>,
        text: &str,
        post_key: &str,
    ) -> Result<Comment, DomainError> {
        let user = user.ok_or(DomainError::Unauthorized)?;
        let mut comment = Comment::new(text, post_key)?;
        self.save_user(user).await?;

        comment.author = user.email.clone();
        comment.key = Some(self.put_owned(user, &comment).await?);

        tracing::info!(key = ?comment.key, post = %comment.post_key, "Comment published");
        Ok(comment)
    }

    /// The `limit` newest posts, each with its comments attached.
    ///
    /// `limit` is clamped to `max_limit`. Each distinct limit has its own
    /// cached global view, so a short list never stands in for a longer one.
    pub async fn fetch_posts(
        &self,
        user: Option<&CurrentUser>,
        limit: usize,
    ) -> Result<Vec<Post>, DomainError> {
        let limit = self.bounded(limit);
        let scope = user.map(CurrentUser::key);
        let query = Query::new(Post::KIND).order(Order::CreationDesc).limit(limit);
        let cache_key = format!("{}:{}", self.config.posts_cache_key, limit);

        let posts: Vec<Post> = self
            .fetcher
            .fetch_cached(query, &cache_key, scope.as_ref())
            .await?;
        tracing::debug!(count = posts.len(), "Fetched posts, attaching comments");

        // spawned tasks must be 'static, so each one owns a clone of the
        // Arc-backed fetcher
        let fetcher = self.fetcher.clone();
        let posts = attach_children(
            posts,
            move |post| {
                let fetcher = fetcher.clone();
                let post_key = post.key.clone();
                let scope = scope.clone();
                async move {
                    match post_key {
                        Some(post_key) => comments_of(&fetcher, &post_key, scope.as_ref()).await,
                        None => Ok(Vec::new()),
                    }
                }
            },
            |post, comments| post.comments = comments,
        )
        .await?;

        Ok(posts)
    }

    /// The `limit` newest posts written by `email`, without comments.
    pub async fn fetch_posts_for_user(&self, email: &str, limit: usize) -> Result<Vec<Post>, DomainError> {
        let query = Query::new(Post::KIND)
            .order(Order::CreationDesc)
            .limit(self.bounded(limit));
        let posts = self.fetcher.fetch_scoped(query, &User::key_for(email)).await?;
        Ok(posts)
    }

    /// All comments on `post_key`, oldest first.
    pub async fn fetch_comments(
        &self,
        user: Option<&CurrentUser>,
        post_key: &Key,
    ) -> Result<Vec<Comment>, DomainError> {
        let scope = user.map(CurrentUser::key);
        Ok(comments_of(&self.fetcher, post_key, scope.as_ref()).await?)
    }

    fn bounded(&self, limit: usize) -> usize {
        limit.min(self.config.max_limit)
    }

    async fn save_user(&self, user: &CurrentUser) -> Result<(), TimelineError> {
        let record = User::new(user.email.clone());
        with_deadline(
            self.config.call_timeout,
            self.store.put(user.key(), record.creation(), record.properties()),
        )
        .await?;
        Ok(())
    }

    async fn put_owned<T: Record>(&self, user: &CurrentUser, record: &T) -> Result<Key, TimelineError> {
        let key = Key::incomplete(T::KIND, Some(user.key()));
        with_deadline(
            self.config.call_timeout,
            self.store.put(key, record.creation(), record.properties()),
        )
        .await
    }
}

async fn comments_of(
    fetcher: &DualSourceFetcher,
    post_key: &Key,
    scope: Option<&Key>,
) -> Result<Vec<Comment>, TimelineError> {
    let encoded = post_key
        .encode()
        .map_err(|e| RepoError::Decode(e.to_string()))?;
    let query = Query::new(Comment::KIND)
        .filter(Comment::POST_KEY_PROPERTY, encoded)
        .order(Order::CreationAsc);
    fetcher.fetch_fresh(query, scope).await
}
