// =============================================================================
// KTP FIELD SENTINELS
// =============================================================================

/// Identity number placeholder when the model output has no `NIK` key
pub const NIK_NOT_FOUND: &str = "TIDAK DITEMUKAN";

/// Placeholder for every text field when the model output is not valid JSON
pub const JSON_ERROR: &str = "Error JSON";

// =============================================================================
// COORDINATE STATUS SENTINELS
// =============================================================================

/// Geocoding completed but returned no match
pub const COORDINATE_NOT_FOUND: &str = "Gagal Ditemukan (Nominatim)";

/// Geocoding skipped because extraction produced no parseable JSON
pub const COORDINATE_JSON_ERROR: &str = "Gagal (JSON Error)";

/// Prefix for geocoding provider failures, followed by the error kind
pub const COORDINATE_ERROR_PREFIX: &str = "Error Geocoding";

/// Maximum characters of malformed model output surfaced to the caller
pub const RAW_EXCERPT_MAX_CHARS: usize = 100;
