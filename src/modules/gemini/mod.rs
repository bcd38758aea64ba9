mod client;

pub use client::{GeminiClient, VisionError, VisionModel};
