use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::ktp::models::IdentityRecord;

/// Upload KTP request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadKtpDto {
    /// KTP/KK image (JPG/PNG)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Extracted identity fields and geocoding outcome
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdentityRecordDto {
    /// NIK, or "TIDAK DITEMUKAN" when the model did not return one
    #[schema(example = "9104012345670001")]
    pub id_number: String,
    pub full_name: String,
    /// "Tempat, DD-MM-YYYY"
    #[schema(example = "Jayapura, 01-01-1990")]
    pub birth_info: String,
    pub address_text: String,
    /// Kabupaten/Kota
    #[schema(example = "Nabire")]
    pub region: String,
    /// "lat, lon" or a failure message
    #[schema(example = "-3.366, 135.496")]
    pub coordinate_status: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Duration of the vision call in seconds
    pub elapsed_seconds: f64,
    /// Start of the model output when it was not valid JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_excerpt: Option<String>,
}

/// Single map marker for the resolved address
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MapPointDto {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

/// Response DTO for one verification run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KtpVerificationResponseDto {
    pub record: IdentityRecordDto,
    pub coordinates_found: bool,
    /// Present only when coordinates were found
    pub map_point: Option<MapPointDto>,
    pub processed_at: DateTime<Utc>,
}

/// Allowed MIME types for KTP uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Maximum image size in bytes (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Zoom level for the single-point map view
pub const MAP_ZOOM: u8 = 12;

/// Check if a MIME type is allowed
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// Guess the MIME type from a file name, for clients that send octet-stream
pub fn mime_type_from_file_name(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

impl From<IdentityRecord> for IdentityRecordDto {
    fn from(record: IdentityRecord) -> Self {
        Self {
            latitude: record.latitude(),
            longitude: record.longitude(),
            id_number: record.id_number,
            full_name: record.full_name,
            birth_info: record.birth_info,
            address_text: record.address_text,
            region: record.region,
            coordinate_status: record.coordinate_status,
            elapsed_seconds: record.elapsed_seconds,
            raw_excerpt: record.raw_excerpt,
        }
    }
}

impl KtpVerificationResponseDto {
    pub fn from_record(record: IdentityRecord) -> Self {
        let map_point = record.coordinates.map(|c| MapPointDto {
            lat: c.latitude,
            lon: c.longitude,
            zoom: MAP_ZOOM,
        });

        Self {
            coordinates_found: map_point.is_some(),
            map_point,
            record: record.into(),
            processed_at: Utc::now(),
        }
    }

    /// Banner text for the coordinate check
    pub fn banner(&self) -> String {
        if self.coordinates_found {
            format!("KOORDINAT DITEMUKAN: {}", self.record.coordinate_status)
        } else {
            format!(
                "KOORDINAT GAGAL DITEMUKAN. Pesan: {}",
                self.record.coordinate_status
            )
        }
    }
}
