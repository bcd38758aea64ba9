use std::sync::Arc;
use std::time::Instant;

use crate::core::error::Result;
use crate::features::ktp::models::{round_to, ExtractedKtpData};
use crate::modules::gemini::VisionModel;
use crate::shared::llm::{excerpt, parse_with_fallback, LlmResponse};

/// Fixed instruction sent with every KTP image
pub const KTP_EXTRACTION_PROMPT: &str = "Anda adalah sistem ekstraksi data KTP profesional. Dari gambar KTP ini, \
ekstrak data berikut: NIK, NAMA, Alamat, dan Kabupaten/Kota. Gabungkan Tempat Lahir dan Tanggal Lahir menjadi 'TTL' dengan format 'Tempat, DD-MM-YYYY'. \
Sajikan hasilnya HANYA dalam format JSON dengan keys: NIK, NAMA, TTL, ALAMAT, KABUPATEN/KOTA. Jangan tambahkan penjelasan apapun.";

/// Parsed model output plus the duration of the vision call
#[derive(Debug)]
pub struct ExtractionResult {
    pub data: ExtractedKtpData,
    pub elapsed_seconds: f64,
}

/// Service for extracting KTP fields from an image with a vision model
pub struct ExtractionService {
    vision: Arc<dyn VisionModel>,
}

impl ExtractionService {
    pub fn new(vision: Arc<dyn VisionModel>) -> Self {
        Self { vision }
    }

    /// Extract KTP fields from one image
    ///
    /// Issues exactly one vision call. Unparseable output is not an error: the
    /// returned data is marked as fallback with every field set to the JSON
    /// error sentinel. Provider failures propagate.
    pub async fn extract(&self, image: &[u8], mime_type: &str) -> Result<ExtractionResult> {
        let started = Instant::now();
        let text = self
            .vision
            .generate(KTP_EXTRACTION_PROMPT, image, mime_type)
            .await?;
        let elapsed_seconds = round_to(started.elapsed().as_secs_f64(), 2);

        tracing::debug!(
            "Raw vision response (first 500 chars): {}",
            excerpt(&text, 500)
        );

        let data: ExtractedKtpData = parse_with_fallback(&text);

        if data.is_success() {
            tracing::info!("KTP extraction completed in {:.2}s", elapsed_seconds);
        } else {
            tracing::warn!(
                "KTP extraction returned invalid JSON after {:.2}s: {:?}",
                elapsed_seconds,
                data.raw_excerpt()
            );
        }

        Ok(ExtractionResult {
            data,
            elapsed_seconds,
        })
    }
}
