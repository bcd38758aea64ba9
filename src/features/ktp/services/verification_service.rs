use std::sync::Arc;

use super::{ExtractionService, GeocodingService};
use crate::core::error::Result;
use crate::features::ktp::models::IdentityRecord;
use crate::shared::llm::LlmResponse;

/// Runs the KTP pipeline: extraction, then geocoding, then assembly
pub struct KtpVerificationService {
    extraction: Arc<ExtractionService>,
    geocoding: Arc<GeocodingService>,
}

impl KtpVerificationService {
    pub fn new(extraction: Arc<ExtractionService>, geocoding: Arc<GeocodingService>) -> Self {
        Self {
            extraction,
            geocoding,
        }
    }

    /// Verify one KTP image
    ///
    /// Parse failures and geocoding failures are returned as data in the
    /// record. Only vision provider failures are errors.
    pub async fn verify(&self, image: &[u8], mime_type: &str) -> Result<IdentityRecord> {
        let extracted = self.extraction.extract(image, mime_type).await?;

        if !extracted.data.is_success() {
            let raw_excerpt = extracted.data.raw_excerpt().map(str::to_string);
            return Ok(IdentityRecord::json_error(
                extracted.elapsed_seconds,
                raw_excerpt,
            ));
        }

        let fields = extracted.data.into_fields();
        let outcome = self
            .geocoding
            .resolve(&fields.address_text, &fields.region)
            .await;

        Ok(IdentityRecord::assemble(
            fields,
            &outcome,
            extracted.elapsed_seconds,
        ))
    }
}
