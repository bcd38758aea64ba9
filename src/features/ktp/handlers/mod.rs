mod ktp_handler;

pub use ktp_handler::*;
