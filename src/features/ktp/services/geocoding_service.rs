use std::sync::Arc;
use std::time::Duration;

use crate::core::config::GeocodingConfig;
use crate::features::ktp::models::Coordinates;
use crate::modules::nominatim::{Geocoder, GeocodingErrorKind};
use crate::shared::constants::{COORDINATE_ERROR_PREFIX, COORDINATE_NOT_FOUND};

/// Outcome of one address lookup
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Found(Coordinates),
    /// The provider answered with no match; an expected outcome, not an error
    NotFound,
    ProviderError(GeocodingErrorKind),
}

impl GeocodeOutcome {
    /// Human-readable coordinate status, never empty
    pub fn status_text(&self) -> String {
        match self {
            Self::Found(coordinates) => coordinates.to_string(),
            Self::NotFound => COORDINATE_NOT_FOUND.to_string(),
            Self::ProviderError(kind) => format!("{}: {}", COORDINATE_ERROR_PREFIX, kind),
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Found(coordinates) => Some(*coordinates),
            _ => None,
        }
    }
}

/// Service for resolving extracted KTP addresses to coordinates
pub struct GeocodingService {
    geocoder: Arc<dyn Geocoder>,
    region_suffix: String,
    timeout: Duration,
    courtesy_pause: Duration,
}

impl GeocodingService {
    pub fn new(geocoder: Arc<dyn Geocoder>, config: &GeocodingConfig) -> Self {
        Self {
            geocoder,
            region_suffix: config.region_suffix.clone(),
            timeout: config.timeout,
            courtesy_pause: config.courtesy_pause,
        }
    }

    /// "address, region, suffix" free-text query
    pub fn build_query(&self, address_text: &str, region: &str) -> String {
        format!("{}, {}, {}", address_text, region, self.region_suffix)
    }

    /// Resolve an address to coordinates
    ///
    /// Never fails: every failure becomes a [`GeocodeOutcome`]. Exactly one
    /// lookup is issued, bounded by the configured timeout, and the courtesy
    /// pause runs once afterwards on every path.
    pub async fn resolve(&self, address_text: &str, region: &str) -> GeocodeOutcome {
        let query = self.build_query(address_text, region);
        tracing::info!("Geocoding KTP address: {}", query);

        let outcome = match tokio::time::timeout(self.timeout, self.geocoder.geocode(&query)).await
        {
            Ok(Ok(Some(place))) => {
                tracing::debug!("Nominatim match: {}", place.display_name);
                GeocodeOutcome::Found(Coordinates::rounded(place.latitude, place.longitude))
            }
            Ok(Ok(None)) => GeocodeOutcome::NotFound,
            Ok(Err(e)) => {
                tracing::warn!("Geocoding failed for '{}': {}", query, e);
                GeocodeOutcome::ProviderError(e.kind)
            }
            Err(_) => {
                tracing::warn!(
                    "Geocoding timed out after {:?} for '{}'",
                    self.timeout,
                    query
                );
                GeocodeOutcome::ProviderError(GeocodingErrorKind::Timeout)
            }
        };

        // Nominatim usage policy: at most one request per second
        tokio::time::sleep(self.courtesy_pause).await;

        tracing::info!("Geocoding result: {}", outcome.status_text());
        outcome
    }
}
