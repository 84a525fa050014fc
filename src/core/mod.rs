// src/core/mod.rs
//! Service boundary: the HTTP client and the upload file it sends

pub mod service_client;
pub mod upload;

pub use service_client::{Routes, ServiceClient};
pub use upload::{UploadFile, UploadPolicy};
