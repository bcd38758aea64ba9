pub mod ktp;
