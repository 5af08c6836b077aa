use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Comment, Key};
use crate::error::RepoError;
use crate::ports::{Record, StoredRecord};

/// Post entity - a titled entry on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Assigned by the store on save.
    pub key: Option<Key>,
    pub title: String,
    pub text: String,
    /// Set from the session on save.
    pub author: String,
    pub creation: DateTime<Utc>,
    /// Filled in at read time, never stored.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Deserialize)]
struct PostProperties {
    title: String,
    text: String,
    author: String,
}

impl Post {
    /// Create a new, unsaved post stamped with the current time.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: None,
            title: title.into(),
            text: text.into(),
            author: String::new(),
            creation: Utc::now(),
            comments: Vec::new(),
        }
    }
}

impl Record for Post {
    const KIND: &'static str = "Post";

    fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    fn creation(&self) -> DateTime<Utc> {
        self.creation
    }

    fn properties(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title,
            "text": self.text,
            "author": self.author,
        })
    }

    fn from_stored(record: StoredRecord) -> Result<Self, RepoError> {
        let props: PostProperties = serde_json::from_value(record.properties)
            .map_err(|e| RepoError::Decode(e.to_string()))?;
        Ok(Self {
            key: Some(record.key),
            title: props.title,
            text: props.text,
            author: props.author,
            creation: record.creation,
            comments: Vec::new(),
        })
    }
}
