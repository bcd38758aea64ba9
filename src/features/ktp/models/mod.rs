mod extracted_ktp;
mod identity_record;

pub use extracted_ktp::{ExtractedKtpData, KtpFields};
pub use identity_record::{round_to, Coordinates, IdentityRecord};
