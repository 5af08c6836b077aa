use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Key, KeyError};
use crate::error::RepoError;
use crate::ports::{Record, StoredRecord};

/// Comment entity - a reply attached to a post by its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub key: Option<Key>,
    pub post_key: Key,
    pub text: String,
    pub author: String,
    pub creation: DateTime<Utc>,
}

#[derive(Deserialize)]
struct CommentProperties {
    post_key: Key,
    text: String,
    author: String,
}

impl Comment {
    /// Name of the stored property holding the owning post's encoded key.
    pub const POST_KEY_PROPERTY: &'static str = "post_key";

    /// Create a new, unsaved comment on the post identified by `post_key`.
    ///
    /// Fails if `post_key` does not decode to a key.
    pub fn new(text: impl Into<String>, post_key: &str) -> Result<Self, KeyError> {
        let post_key = Key::decode(post_key)?;
        Ok(Self {
            key: None,
            post_key,
            text: text.into(),
            author: String::new(),
            creation: Utc::now(),
        })
    }
}

impl Record for Comment {
    const KIND: &'static str = "Comment";

    fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    fn creation(&self) -> DateTime<Utc> {
        self.creation
    }

    fn properties(&self) -> serde_json::Value {
        serde_json::json!({
            "post_key": self.post_key,
            "text": self.text,
            "author": self.author,
        })
    }

    fn from_stored(record: StoredRecord) -> Result<Self, RepoError> {
        let props: CommentProperties = serde_json::from_value(record.properties)
            .map_err(|e| RepoError::Decode(e.to_string()))?;
        Ok(Self {
            key: Some(record.key),
            post_key: props.post_key,
            text: props.text,
            author: props.author,
            creation: record.creation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_comment_rejects_bad_post_key() {
        let result = Comment::new("hello", "%%%");
        assert!(matches!(result, Err(KeyError::Encoding(0))));
    }

    #[test]
    fn test_new_comment_keeps_post_reference() {
        let post_key = Key::named("Post", "p-1", Some(Key::named("User", "a@b.c", None)));
        let encoded = post_key.encode().unwrap();

        let comment = Comment::new("hello", &encoded).unwrap();

        assert_eq!(comment.post_key, post_key);
        assert!(comment.key.is_none());
        assert!(comment.author.is_empty());
    }

    #[test]
    fn test_stored_round_trip_preserves_post_key_filter_value() {
        let post_key = Key::named("Post", "p-1", None);
        let mut comment = Comment::new("hi", &post_key.encode().unwrap()).unwrap();
        comment.author = "a@b.c".to_string();

        let props = comment.properties();
        assert_eq!(
            props[Comment::POST_KEY_PROPERTY],
            serde_json::Value::String(post_key.encode().unwrap())
        );

        let stored = StoredRecord {
            key: Key::named("Comment", "c-1", None),
            creation: comment.creation,
            properties: props,
        };
        let back = Comment::from_stored(stored).unwrap();
        assert_eq!(back.text, "hi");
        assert_eq!(back.author, "a@b.c");
        assert_eq!(back.post_key, post_key);
    }
}
