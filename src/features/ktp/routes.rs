use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;

use crate::features::ktp::dtos::MAX_IMAGE_SIZE;
use crate::features::ktp::handlers::verify_ktp;
use crate::features::ktp::services::KtpVerificationService;

/// Create routes for the KTP feature
pub fn routes(service: Arc<KtpVerificationService>) -> Router {
    Router::new()
        .route(
            "/api/ktp/verify",
            // Allow body size up to MAX_IMAGE_SIZE + buffer for multipart overhead
            post(verify_ktp).layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + 1024 * 1024)),
        )
        .with_state(service)
}
