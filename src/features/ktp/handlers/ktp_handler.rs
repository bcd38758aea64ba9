use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AppError;
use crate::features::ktp::dtos::{
    is_mime_type_allowed, mime_type_from_file_name, KtpVerificationResponseDto, UploadKtpDto,
    ALLOWED_MIME_TYPES, MAX_IMAGE_SIZE,
};
use crate::features::ktp::services::KtpVerificationService;
use crate::shared::types::ApiResponse;

struct UploadedImage {
    data: Vec<u8>,
    content_type: String,
}

fn too_large_message() -> String {
    format!(
        "File too large. Maximum size is {} bytes ({} MB)",
        MAX_IMAGE_SIZE,
        MAX_IMAGE_SIZE / 1024 / 1024
    )
}

/// Hitting the route body limit surfaces as a multipart error with status 413
fn multipart_error(e: MultipartError, context: &str) -> AppError {
    debug!("{}: {}", context, e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(too_large_message())
    } else {
        AppError::BadRequest(format!("{}: {}", context, e))
    }
}

/// Read the `file` field from the multipart body, ignoring other fields
async fn read_image(multipart: &mut Multipart) -> Result<Option<UploadedImage>, AppError> {
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to read multipart data"))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != "file" {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        // Browsers sometimes send octet-stream; fall back to the extension
        let declared = field.content_type().map(|s| s.to_string());
        let from_name = field.file_name().and_then(mime_type_from_file_name);
        let content_type = match declared {
            Some(ct) if ct != "application/octet-stream" => ct,
            _ => from_name
                .map(str::to_string)
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        };

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, "Failed to read file data"))?;

        image = Some(UploadedImage {
            data: data.to_vec(),
            content_type,
        });
    }

    Ok(image)
}

/// Verify a KTP image
///
/// Extracts the KTP fields with Gemini, then looks up the address with
/// Nominatim. Accepts multipart/form-data with a single `file` field (JPG/PNG).
/// Invalid model output and failed geocoding are reported inside the record;
/// only a failing vision provider yields an error status.
#[utoipa::path(
    post,
    path = "/api/ktp/verify",
    tag = "ktp",
    request_body(
        content = UploadKtpDto,
        content_type = "multipart/form-data",
        description = "KTP/KK image to process",
    ),
    responses(
        (status = 200, description = "Processing finished", body = ApiResponse<KtpVerificationResponseDto>),
        (status = 400, description = "Missing, empty, or unsupported image"),
        (status = 413, description = "Image too large"),
        (status = 502, description = "Vision provider failed")
    )
)]
pub async fn verify_ktp(
    State(service): State<Arc<KtpVerificationService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<KtpVerificationResponseDto>>, AppError> {
    let image = read_image(&mut multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    if image.data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    if image.data.len() > MAX_IMAGE_SIZE {
        return Err(AppError::PayloadTooLarge(too_large_message()));
    }

    if !is_mime_type_allowed(&image.content_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            image.content_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }

    tracing::info!(
        "Processing KTP image ({} bytes, {})",
        image.data.len(),
        image.content_type
    );

    let record = service.verify(&image.data, &image.content_type).await?;
    let response = KtpVerificationResponseDto::from_record(record);
    let banner = response.banner();

    Ok(Json(ApiResponse::success(Some(response), Some(banner))))
}
