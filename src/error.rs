// src/error.rs
//! Failure taxonomy for calls against the analysis service

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never completed (connect, timeout, body read).
    #[error("Transport error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("HTTP error! status: {status} ({endpoint})")]
    Http {
        status: StatusCode,
        endpoint: String,
        body: String,
    },

    /// The service answered 2xx but the body does not honor the contract.
    #[error("Contract violation on {endpoint}: {reason}")]
    ContractViolation { endpoint: String, reason: String },

    /// An action was asked for without the text it needs
    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    #[error("Upload rejected: {0}")]
    InvalidUpload(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create HTTP client: {0}")]
    ClientSetup(#[source] reqwest::Error),
}

impl ClientError {
    /// Numeric status for HTTP failures, `None` for everything else
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(status.as_u16()),
            ClientError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_contract_violation(&self) -> bool {
        matches!(self, ClientError::ContractViolation { .. })
    }

    pub(crate) fn contract(endpoint: &str, reason: impl Into<String>) -> Self {
        ClientError::ContractViolation {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}
