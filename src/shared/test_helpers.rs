use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::config::GeocodingConfig;
use crate::features::ktp::{ExtractionService, GeocodingService, KtpVerificationService};
use crate::modules::gemini::{VisionError, VisionModel};
use crate::modules::nominatim::{GeocodedPlace, Geocoder, GeocodingError, GeocodingErrorKind};

/// Vision model that returns a canned answer
pub struct FakeVisionModel {
    /// `None` simulates a provider failure
    response: Option<String>,
    calls: AtomicUsize,
}

impl FakeVisionModel {
    pub fn returning(text: &str) -> Self {
        Self {
            response: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionModel for FakeVisionModel {
    async fn generate(
        &self,
        _prompt: &str,
        _image: &[u8],
        _mime_type: &str,
    ) -> Result<String, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().ok_or(VisionError::EmptyResponse)
    }
}

#[derive(Debug, Clone)]
pub enum FakeGeocodeBehavior {
    Found(f64, f64),
    NotFound,
    Fail(GeocodingErrorKind),
    /// Never answers within the bounded wait
    Hang,
}

/// Geocoder with scripted behavior that records every query
pub struct FakeGeocoder {
    behavior: FakeGeocodeBehavior,
    queries: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn new(behavior: FakeGeocodeBehavior) -> Self {
        Self {
            behavior,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodingError> {
        self.queries.lock().unwrap().push(query.to_string());

        match &self.behavior {
            FakeGeocodeBehavior::Found(latitude, longitude) => Ok(Some(GeocodedPlace {
                latitude: *latitude,
                longitude: *longitude,
                display_name: "Test Place".to_string(),
            })),
            FakeGeocodeBehavior::NotFound => Ok(None),
            FakeGeocodeBehavior::Fail(kind) => Err(GeocodingError::new(*kind, "scripted failure")),
            FakeGeocodeBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }
}

/// Geocoding settings with the production bounds
pub fn geocoding_config() -> GeocodingConfig {
    GeocodingConfig::default()
}

/// Geocoding settings without the courtesy pause, for tests on a real clock
pub fn geocoding_config_without_pause() -> GeocodingConfig {
    GeocodingConfig {
        courtesy_pause: Duration::ZERO,
        ..GeocodingConfig::default()
    }
}

/// Wire a full pipeline around the given fakes
pub fn verification_service(
    vision: Arc<FakeVisionModel>,
    geocoder: Arc<FakeGeocoder>,
    config: &GeocodingConfig,
) -> KtpVerificationService {
    let extraction = Arc::new(ExtractionService::new(vision));
    let geocoding = Arc::new(GeocodingService::new(geocoder, config));
    KtpVerificationService::new(extraction, geocoding)
}
