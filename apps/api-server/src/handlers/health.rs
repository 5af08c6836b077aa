//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// How stale the global timeline may be, in seconds.
    pub timeline_cache_ttl_secs: u64,
}

/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        timeline_cache_ttl_secs: state.blog.config().cache_ttl.as_secs(),
    };

    HttpResponse::Ok().json(response)
}
