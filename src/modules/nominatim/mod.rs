mod client;

pub use client::{Geocoder, GeocodingErrorKind, NominatimClient};

#[cfg(test)]
pub use client::{GeocodedPlace, GeocodingError};
