use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Key;
use crate::error::RepoError;
use crate::ports::{Record, StoredRecord};

/// User entity - a marker record named by the provider's email.
///
/// Created lazily on a user's first write. Posts and comments are stored
/// beneath its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            created_at: Utc::now(),
        }
    }

    /// Ancestor scope under which a user's records are written and queried.
    pub fn key_for(email: &str) -> Key {
        Key::named(<Self as Record>::KIND, email, None)
    }
}

impl Record for User {
    const KIND: &'static str = "User";

    fn key(&self) -> Option<&Key> {
        None
    }

    fn creation(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn properties(&self) -> serde_json::Value {
        serde_json::json!({})
    }

    fn from_stored(record: StoredRecord) -> Result<Self, RepoError> {
        let email = record
            .key
            .name()
            .ok_or_else(|| RepoError::Decode("user key has no name".to_string()))?;
        Ok(Self {
            email: email.to_string(),
            created_at: record.creation,
        })
    }
}

/// The signed-in caller, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub email: String,
}

impl CurrentUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    pub fn key(&self) -> Key {
        User::key_for(&self.email)
    }
}
