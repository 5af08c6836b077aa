//! Hierarchical record keys.
//!
//! A key names a record by kind and name and may nest under a parent key.
//! The encoded form is opaque to callers: one URL-safe base64 segment per
//! path element, root first, joined by `.`.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const SEGMENT_SEPARATOR: char = '.';
const NAME_SEPARATOR: char = '\0';

/// Errors produced while decoding a key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("empty key")]
    Empty,

    #[error("segment {0} is not valid base64")]
    Encoding(usize),

    #[error("segment {0} is malformed")]
    Malformed(usize),

    #[error("key is incomplete")]
    Incomplete,
}

/// Identity of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    kind: String,
    name: Option<String>,
    parent: Option<Box<Key>>,
}

impl Key {
    /// A key the store completes on `put`.
    pub fn incomplete(kind: impl Into<String>, parent: Option<Key>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            parent: parent.map(Box::new),
        }
    }

    pub fn named(kind: impl Into<String>, name: impl Into<String>, parent: Option<Key>) -> Self {
        Self {
            kind: kind.into(),
            name: Some(name.into()),
            parent: parent.map(Box::new),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> Option<&Key> {
        self.parent.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.name.is_some()
    }

    /// Returns a copy of this key completed with `name`.
    pub fn complete_with(&self, name: impl Into<String>) -> Self {
        Self {
            kind: self.kind.clone(),
            name: Some(name.into()),
            parent: self.parent.clone(),
        }
    }

    /// True when `ancestor` is this key or one of its parents.
    pub fn is_descendant_of(&self, ancestor: &Key) -> bool {
        let mut current = Some(self);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = key.parent();
        }
        false
    }

    /// Path from the root key down to this one.
    fn path(&self) -> Vec<&Key> {
        let mut path = Vec::new();
        let mut current = Some(self);
        while let Some(key) = current {
            path.push(key);
            current = key.parent();
        }
        path.reverse();
        path
    }

    pub fn encode(&self) -> Result<String, KeyError> {
        let mut segments = Vec::new();
        for key in self.path() {
            let name = key.name.as_deref().ok_or(KeyError::Incomplete)?;
            let raw = format!("{}{NAME_SEPARATOR}{}", key.kind, name);
            segments.push(URL_SAFE_NO_PAD.encode(raw.as_bytes()));
        }
        Ok(segments.join(&SEGMENT_SEPARATOR.to_string()))
    }

    pub fn decode(encoded: &str) -> Result<Self, KeyError> {
        if encoded.is_empty() {
            return Err(KeyError::Empty);
        }

        let mut key: Option<Key> = None;
        for (index, segment) in encoded.split(SEGMENT_SEPARATOR).enumerate() {
            let bytes = URL_SAFE_NO_PAD
                .decode(segment)
                .map_err(|_| KeyError::Encoding(index))?;
            let raw = String::from_utf8(bytes).map_err(|_| KeyError::Malformed(index))?;
            let (kind, name) = raw
                .split_once(NAME_SEPARATOR)
                .ok_or(KeyError::Malformed(index))?;
            if kind.is_empty() || name.is_empty() {
                return Err(KeyError::Malformed(index));
            }
            key = Some(Key::named(kind, name, key));
        }

        key.ok_or(KeyError::Empty)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, key) in self.path().into_iter().enumerate() {
            if index > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}:{}", key.kind, key.name.as_deref().unwrap_or("?"))?;
        }
        Ok(())
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = self.encode().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Key::decode(&encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_key() -> Key {
        Key::named("User", "ada@example.com", None)
    }

    #[test]
    fn test_encode_decode_nested_key() {
        let key = Key::named("Post", "p-1", Some(user_key()));
        let encoded = key.encode().unwrap();

        assert!(!encoded.contains('/'));
        assert_eq!(Key::decode(&encoded).unwrap(), key);
    }

    #[test]
    fn test_incomplete_key_cannot_encode() {
        let key = Key::incomplete("Post", Some(user_key()));
        assert_eq!(key.encode(), Err(KeyError::Incomplete));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(Key::decode(""), Err(KeyError::Empty));
        assert_eq!(Key::decode("not base64!"), Err(KeyError::Encoding(0)));
        // valid base64 without the kind/name separator
        assert_eq!(Key::decode("UG9zdA"), Err(KeyError::Malformed(0)));
    }

    #[test]
    fn test_descendant_check() {
        let user = user_key();
        let post = Key::named("Post", "p-1", Some(user.clone()));
        let other = Key::named("User", "bob@example.com", None);

        assert!(post.is_descendant_of(&user));
        assert!(post.is_descendant_of(&post));
        assert!(!post.is_descendant_of(&other));
        assert!(!user.is_descendant_of(&post));
    }

    #[test]
    fn test_serde_uses_encoded_form() {
        let key = Key::named("Comment", "c-9", Some(user_key()));
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", key.encode().unwrap()));

        let back: Key = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
