use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

use crate::core::config::GeocodingConfig;

/// Nominatim API response structure
#[derive(Debug, Deserialize)]
pub struct NominatimResponse {
    #[allow(dead_code)]
    pub place_id: Option<i64>,
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
}

/// Best match returned by a geocoder, in decimal degrees
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// Short classification of a geocoding failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingErrorKind {
    Timeout,
    ConnectionError,
    RateLimited,
    ServiceError,
    InvalidResponse,
    RequestError,
}

impl GeocodingErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "Timeout",
            Self::ConnectionError => "ConnectionError",
            Self::RateLimited => "RateLimited",
            Self::ServiceError => "ServiceError",
            Self::InvalidResponse => "InvalidResponse",
            Self::RequestError => "RequestError",
        }
    }

    fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited
        } else {
            Self::ServiceError
        }
    }
}

impl fmt::Display for GeocodingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct GeocodingError {
    pub kind: GeocodingErrorKind,
    pub message: String,
}

impl GeocodingError {
    pub fn new(kind: GeocodingErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for GeocodingError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            GeocodingErrorKind::Timeout
        } else if e.is_connect() {
            GeocodingErrorKind::ConnectionError
        } else if e.is_decode() {
            GeocodingErrorKind::InvalidResponse
        } else if let Some(status) = e.status() {
            GeocodingErrorKind::from_status(status)
        } else {
            GeocodingErrorKind::RequestError
        };
        Self::new(kind, e.to_string())
    }
}

/// Free-text forward geocoding
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Look up the single best match for `query`; `Ok(None)` means no match
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodingError>;
}

/// Nominatim search client
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodingError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    /// Execute HTTP request to Nominatim and parse response
    async fn execute_request(&self, url: &str) -> Result<Option<NominatimResponse>, GeocodingError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Nominatim request failed: {:?}", e);
            GeocodingError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Nominatim returned status: {}", status);
            return Err(GeocodingError::new(
                GeocodingErrorKind::from_status(status),
                format!("Nominatim returned status {}", status),
            ));
        }

        let results: Vec<NominatimResponse> = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Nominatim response: {:?}", e);
            GeocodingError::new(GeocodingErrorKind::InvalidResponse, e.to_string())
        })?;

        Ok(results.into_iter().next())
    }
}

impl TryFrom<NominatimResponse> for GeocodedPlace {
    type Error = GeocodingError;

    fn try_from(r: NominatimResponse) -> Result<Self, Self::Error> {
        let parse = |value: &str, field: &str| {
            value.parse::<f64>().map_err(|_| {
                GeocodingError::new(
                    GeocodingErrorKind::InvalidResponse,
                    format!("Invalid {} in Nominatim response: {}", field, value),
                )
            })
        };

        Ok(Self {
            latitude: parse(&r.lat, "lat")?,
            longitude: parse(&r.lon, "lon")?,
            display_name: r.display_name,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodingError> {
        let url = self.search_url(query);

        tracing::debug!("Geocoding (free-form): {} -> {}", query, url);

        self.execute_request(&url)
            .await?
            .map(GeocodedPlace::try_from)
            .transpose()
    }
}
