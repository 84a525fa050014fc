//! Client for the AI CV Analyzer service: upload a résumé, then score, rewrite,
//! and generate a cover letter and interview prep against a job description.

pub mod cli;
pub mod config;
pub mod core;
pub mod dashboard;
pub mod error;
pub mod router;
pub mod types;
pub mod utils;
pub mod workspace;

pub use config::AnalyzerConfig;
pub use crate::core::{Routes, ServiceClient, UploadFile, UploadPolicy};
pub use error::{ClientError, Result};
pub use types::{Analysis, Cv, CvAnalysis, InterviewPrep, ScoreResult};
pub use workspace::{ActionOutcome, ActionReport, CvAction, Workspace};
