// src/core/upload.rs
//! Résumé file handed to `POST /upload`, and the client-side filter applied before sending

use std::path::Path;
use tracing::warn;

use crate::config::AnalyzerConfig;
use crate::error::{ClientError, Result};
use crate::utils::{content_type_for, format_size, title_from_file_name, validate_file_extension};

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ClientError::InvalidUpload(format!("{} has no file name", path.display()))
            })?;

        Ok(Self::new(file_name, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn content_type(&self) -> Option<&'static str> {
        content_type_for(&self.file_name)
    }

    pub fn title(&self) -> String {
        title_from_file_name(&self.file_name)
    }
}

/// Advisory type/size filter; the service stays the authority.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPolicy {
    pub max_bytes: u64,
}

impl UploadPolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.max_upload_bytes)
    }

    pub fn check(&self, file: &UploadFile) -> Result<()> {
        if let Err(e) = validate_file_extension(&file.file_name, &ALLOWED_EXTENSIONS) {
            warn!("Rejecting upload: {}", e);
            return Err(ClientError::InvalidUpload(
                "Please upload a PDF, DOC, or DOCX file".to_string(),
            ));
        }

        if file.size() > self.max_bytes {
            warn!(
                "Rejecting upload {} of {} bytes (limit {})",
                file.file_name,
                file.size(),
                self.max_bytes
            );
            return Err(ClientError::InvalidUpload(format!(
                "File size exceeds the maximum limit of {}",
                format_size(self.max_bytes)
            )));
        }

        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_UPLOAD_BYTES)
    }
}
