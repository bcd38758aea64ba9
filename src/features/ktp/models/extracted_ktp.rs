use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::shared::constants::{JSON_ERROR, NIK_NOT_FOUND};
use crate::shared::llm::{LlmResponse, ParseError};

fn default_true() -> bool {
    true
}

/// Accept any JSON scalar as text; `null` counts as absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// KTP fields exactly as the vision model returned them
///
/// Keys are the Indonesian labels requested in the extraction prompt. Every
/// key is optional here; defaults are applied in [`ExtractedKtpData::into_fields`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedKtpData {
    #[serde(rename = "NIK", default, deserialize_with = "lenient_string")]
    pub nik: Option<String>,

    #[serde(rename = "NAMA", default, deserialize_with = "lenient_string")]
    pub nama: Option<String>,

    /// "Tempat, DD-MM-YYYY", composed by the model
    #[serde(rename = "TTL", default, deserialize_with = "lenient_string")]
    pub ttl: Option<String>,

    #[serde(rename = "ALAMAT", default, deserialize_with = "lenient_string")]
    pub alamat: Option<String>,

    #[serde(rename = "KABUPATEN/KOTA", default, deserialize_with = "lenient_string")]
    pub kabupaten_kota: Option<String>,

    /// Whether the model output parsed as JSON; never read from the payload
    #[serde(skip, default = "default_true")]
    pub is_llm_success: bool,

    /// Parse failure details, set only on fallback
    #[serde(skip)]
    pub llm_error: Option<ParseError>,
}

impl LlmResponse for ExtractedKtpData {
    fn mark_as_fallback(&mut self, error: ParseError) {
        self.is_llm_success = false;
        self.llm_error = Some(error);
        for field in [
            &mut self.nik,
            &mut self.nama,
            &mut self.ttl,
            &mut self.alamat,
            &mut self.kabupaten_kota,
        ] {
            *field = Some(JSON_ERROR.to_string());
        }
    }

    fn is_success(&self) -> bool {
        self.is_llm_success
    }
}

/// Extracted KTP fields with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KtpFields {
    pub id_number: String,
    pub full_name: String,
    pub birth_info: String,
    pub address_text: String,
    pub region: String,
}

impl ExtractedKtpData {
    /// Apply the missing-key defaults: `NIK` falls back to "TIDAK DITEMUKAN",
    /// every other field to an empty string.
    pub fn into_fields(self) -> KtpFields {
        KtpFields {
            id_number: self.nik.unwrap_or_else(|| NIK_NOT_FOUND.to_string()),
            full_name: self.nama.unwrap_or_default(),
            birth_info: self.ttl.unwrap_or_default(),
            address_text: self.alamat.unwrap_or_default(),
            region: self.kabupaten_kota.unwrap_or_default(),
        }
    }

    /// Raw-text excerpt recorded on parse failure
    pub fn raw_excerpt(&self) -> Option<&str> {
        self.llm_error.as_ref().map(|e| e.excerpt.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::llm::parse_with_fallback;

    #[test]
    fn test_all_keys_present() {
        let text = r#"{"NIK":"123","NAMA":"Budi","TTL":"Jayapura, 01-01-1990","ALAMAT":"Jl. Merdeka","KABUPATEN/KOTA":"Nabire"}"#;
        let data: ExtractedKtpData = parse_with_fallback(text);
        assert!(data.is_success());

        let fields = data.into_fields();
        assert_eq!(fields.id_number, "123");
        assert_eq!(fields.full_name, "Budi");
        assert_eq!(fields.birth_info, "Jayapura, 01-01-1990");
        assert_eq!(fields.address_text, "Jl. Merdeka");
        assert_eq!(fields.region, "Nabire");
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let data: ExtractedKtpData = parse_with_fallback("```json\n{\"NIK\":\"456\"}\n```");
        assert!(data.is_success());

        let fields = data.into_fields();
        assert_eq!(fields.id_number, "456");
        assert_eq!(fields.full_name, "");
        assert_eq!(fields.birth_info, "");
        assert_eq!(fields.address_text, "");
        assert_eq!(fields.region, "");
    }

    #[test]
    fn test_missing_nik_uses_sentinel() {
        let data: ExtractedKtpData = parse_with_fallback(r#"{"NAMA":"Siti"}"#);
        assert_eq!(data.into_fields().id_number, NIK_NOT_FOUND);
    }

    #[test]
    fn test_null_is_absent_and_numbers_become_text() {
        let data: ExtractedKtpData =
            parse_with_fallback(r#"{"NIK": 9171012345678901, "NAMA": null, "ALAMAT": true}"#);
        let fields = data.into_fields();
        assert_eq!(fields.id_number, "9171012345678901");
        assert_eq!(fields.full_name, "");
        assert_eq!(fields.address_text, "true");
    }

    #[test]
    fn test_key_match_is_exact() {
        let data: ExtractedKtpData = parse_with_fallback(r#"{"nik":"1","Kabupaten/Kota":"Nabire"}"#);
        let fields = data.into_fields();
        assert_eq!(fields.id_number, NIK_NOT_FOUND);
        assert_eq!(fields.region, "");
    }

    #[test]
    fn test_payload_cannot_set_success_flag() {
        let text = r#"{"NIK":"123","NAMA":"Budi","TTL":"Jayapura, 01-01-1990","ALAMAT":"Jl. Merdeka","KABUPATEN/KOTA":"Nabire","is_llm_success":false}"#;
        let data: ExtractedKtpData = parse_with_fallback(text);
        assert!(data.is_success());
        assert_eq!(data.raw_excerpt(), None);
        assert_eq!(data.into_fields().id_number, "123");

        let data: ExtractedKtpData =
            parse_with_fallback(r#"{"NIK":"456","is_llm_success":"ya"}"#);
        assert!(data.is_success());
        assert_eq!(data.into_fields().id_number, "456");
    }

    #[test]
    fn test_invalid_json_fills_error_sentinel() {
        let data: ExtractedKtpData = parse_with_fallback("not json at all");
        assert!(!data.is_success());
        assert_eq!(data.raw_excerpt(), Some("not json at all"));

        let fields = data.into_fields();
        for value in [
            &fields.id_number,
            &fields.full_name,
            &fields.birth_info,
            &fields.address_text,
            &fields.region,
        ] {
            assert_eq!(value, JSON_ERROR);
        }
    }

    #[test]
    fn test_non_object_json_is_parse_failure() {
        let data: ExtractedKtpData = parse_with_fallback(r#"["123", "Budi"]"#);
        assert!(!data.is_success());
    }
}
