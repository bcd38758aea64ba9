use std::fmt;

use super::KtpFields;
use crate::features::ktp::services::GeocodeOutcome;
use crate::shared::constants::{COORDINATE_JSON_ERROR, JSON_ERROR};

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    const DECIMALS: i32 = 6;

    /// Coordinates rounded to 6 decimal places
    pub fn rounded(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: round_to(latitude, Self::DECIMALS),
            longitude: round_to(longitude, Self::DECIMALS),
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}",
            format_degrees(self.latitude),
            format_degrees(self.longitude)
        )
    }
}

/// Shortest decimal text for a coordinate, keeping a trailing `.0` on whole
/// numbers and using `e-05` style exponents below 1e-4
fn format_degrees(value: f64) -> String {
    if value.fract() == 0.0 {
        return format!("{:.1}", value);
    }

    if value.abs() < 1e-4 {
        let text = format!("{:e}", value);
        if let Some((mantissa, exponent)) = text.split_once("e-") {
            return format!("{}e-{:0>2}", mantissa, exponent);
        }
    }

    value.to_string()
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Result of one verification run
///
/// Created per request and discarded once the response is written.
/// Latitude and longitude live in a single `Option<Coordinates>` so they are
/// always set or unset together.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityRecord {
    pub id_number: String,
    pub full_name: String,
    pub birth_info: String,
    pub address_text: String,
    pub region: String,
    /// "lat, lon" on success, otherwise a failure sentinel; never empty
    pub coordinate_status: String,
    pub coordinates: Option<Coordinates>,
    /// Duration of the vision call in seconds, 2 decimal places
    pub elapsed_seconds: f64,
    /// Leading characters of unparseable model output
    pub raw_excerpt: Option<String>,
}

impl IdentityRecord {
    /// Combine extracted fields with the geocoding outcome
    pub fn assemble(fields: KtpFields, outcome: &GeocodeOutcome, elapsed_seconds: f64) -> Self {
        Self {
            id_number: fields.id_number,
            full_name: fields.full_name,
            birth_info: fields.birth_info,
            address_text: fields.address_text,
            region: fields.region,
            coordinate_status: outcome.status_text(),
            coordinates: outcome.coordinates(),
            elapsed_seconds,
            raw_excerpt: None,
        }
    }

    /// Record for model output that was not valid JSON; geocoding is skipped
    pub fn json_error(elapsed_seconds: f64, raw_excerpt: Option<String>) -> Self {
        Self {
            id_number: JSON_ERROR.to_string(),
            full_name: JSON_ERROR.to_string(),
            birth_info: JSON_ERROR.to_string(),
            address_text: JSON_ERROR.to_string(),
            region: JSON_ERROR.to_string(),
            coordinate_status: COORDINATE_JSON_ERROR.to_string(),
            coordinates: None,
            elapsed_seconds,
            raw_excerpt,
        }
    }

    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.longitude)
    }

    #[cfg(test)]
    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }
}
