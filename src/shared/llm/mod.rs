mod parser;
mod response;

pub use parser::{excerpt, parse_with_fallback, ParseError};
pub use response::LlmResponse;
