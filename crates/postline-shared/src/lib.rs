//! # Postline Shared
//!
//! Wire types for the HTTP API, kept free of server-only dependencies.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
