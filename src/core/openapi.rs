use utoipa::{Modify, OpenApi};

use crate::features::ktp::{dtos as ktp_dtos, handlers as ktp_handlers};
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // KTP
        ktp_handlers::verify_ktp,
    ),
    components(
        schemas(
            // KTP
            ktp_dtos::UploadKtpDto,
            ktp_dtos::IdentityRecordDto,
            ktp_dtos::MapPointDto,
            ktp_dtos::KtpVerificationResponseDto,
            ApiResponse<ktp_dtos::KtpVerificationResponseDto>,
        )
    ),
    tags(
        (name = "ktp", description = "KTP extraction (Gemini) and address geocoding (Nominatim)"),
    ),
    info(
        title = "KTP Geo-Verification API",
        version = "0.1.0",
        description = "Ekstraksi data KTP dengan Gemini dan validasi koordinat dengan Nominatim",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
