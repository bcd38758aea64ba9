//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for the external services the pipeline
//! calls: Gemini vision inference and Nominatim geocoding.

pub mod gemini;
pub mod nominatim;
