mod extraction_service;
mod geocoding_service;
mod verification_service;

pub use extraction_service::ExtractionService;
pub use geocoding_service::{GeocodeOutcome, GeocodingService};
pub use verification_service::KtpVerificationService;
