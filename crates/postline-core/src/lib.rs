//! # Postline Core
//!
//! The domain layer of Postline: posts, comments and the merged timeline.
//! Storage and caching are reached only through the ports defined here.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod timeline;

pub use error::{DomainError, RepoError, TimelineError};
pub use service::BlogService;
pub use timeline::TimelineConfig;
