mod ktp_dto;

pub use ktp_dto::*;
