// src/types/response.rs
//! Wire records exchanged with the analysis service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::types::cv_data::{Analysis, Cv, CvAnalysis, InterviewPrep, ScoreResult};
use crate::utils::title_from_file_name;

// ===== Requests =====

#[derive(Debug, Clone, Serialize)]
pub struct ScoreRequest<'a> {
    pub cv_id: &'a str,
    pub job_description: &'a str,
    pub cv_text: &'a str,
}

/// Body shared by rewrite, cover-letter and interview-questions
#[derive(Debug, Clone, Serialize)]
pub struct CvActionRequest<'a> {
    pub cv_id: &'a str,
    pub cv_text: &'a str,
    pub job_description: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateRequest<'a> {
    pub template_name: &'a str,
    pub cv_text: &'a str,
}

// ===== Responses =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub cv_id: String,
    pub extracted_text: String,
}

impl UploadResponse {
    pub fn validate(self, endpoint: &str) -> Result<Self> {
        if self.cv_id.trim().is_empty() {
            return Err(ClientError::contract(endpoint, "cv_id is empty"));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub ats_score: f64,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
}

impl ScoreResponse {
    pub fn into_result(self, endpoint: &str) -> Result<ScoreResult> {
        let result = ScoreResult {
            ats_score: self.ats_score,
            matched_keywords: self.matched_keywords,
            missing_keywords: self.missing_keywords,
        };
        result
            .check()
            .map_err(|reason| ClientError::contract(endpoint, reason))?;
        Ok(result)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteResponse {
    pub rewritten_cv: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewPrepResponse {
    pub technical_questions: Vec<String>,
    pub behavioral_questions: Vec<String>,
    pub tips: Vec<String>,
}

impl From<InterviewPrepResponse> for InterviewPrep {
    fn from(response: InterviewPrepResponse) -> Self {
        InterviewPrep {
            technical_questions: response.technical_questions,
            behavioral_questions: response.behavioral_questions,
            tips: response.tips,
        }
    }
}

/// `GET /templates` answers either `{"templates": [...]}` or a bare array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TemplateListResponse {
    Wrapped { templates: Vec<String> },
    Bare(Vec<String>),
}

impl TemplateListResponse {
    pub fn into_names(self) -> Vec<String> {
        match self {
            TemplateListResponse::Wrapped { templates } => templates,
            TemplateListResponse::Bare(templates) => templates,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub formatted_cv: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CvListResponse {
    pub cvs: Vec<CvRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// A CV as listed by the service, with every analysis field flattened and optional
#[derive(Debug, Clone, Deserialize)]
pub struct CvRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "fileName", alias = "filename")]
    pub file_name: Option<String>,
    #[serde(default, alias = "fileSize")]
    pub file_size: Option<u64>,
    #[serde(default, alias = "uploadDate")]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub extracted_text: String,
    #[serde(default)]
    pub ats_score: Option<f64>,
    #[serde(default)]
    pub matched_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub missing_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub rewritten_cv: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub interview_prep: Option<InterviewPrep>,
    #[serde(default)]
    pub analysis: Option<CvAnalysis>,
}

impl CvRecord {
    /// Convert into the in-memory record, enforcing the all-or-nothing score group
    pub fn into_cv(self, endpoint: &str) -> Result<Cv> {
        if self.id.trim().is_empty() {
            return Err(ClientError::contract(endpoint, "cv id is empty"));
        }

        let score = match (self.ats_score, self.matched_keywords, self.missing_keywords) {
            (Some(ats_score), Some(matched_keywords), Some(missing_keywords)) => {
                let result = ScoreResult {
                    ats_score,
                    matched_keywords,
                    missing_keywords,
                };
                result
                    .check()
                    .map_err(|reason| ClientError::contract(endpoint, reason))?;
                Analysis::Ready(result)
            }
            (None, None, None) => Analysis::NotComputed,
            _ => {
                return Err(ClientError::contract(
                    endpoint,
                    format!("cv {} has a partially populated score", self.id),
                ))
            }
        };

        if let Some(analysis) = &self.analysis {
            analysis
                .check()
                .map_err(|reason| ClientError::contract(endpoint, reason))?;
        }

        let file_name = self.file_name.unwrap_or_default();
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title_from_file_name(&file_name));

        Ok(Cv {
            id: self.id,
            title,
            file_name,
            file_size: self.file_size.unwrap_or(0),
            upload_date: self.upload_date.unwrap_or_else(Utc::now),
            content: self
                .content
                .unwrap_or_else(|| self.extracted_text.clone()),
            extracted_text: self.extracted_text,
            score,
            rewritten_cv: self.rewritten_cv.into(),
            cover_letter: self.cover_letter.into(),
            interview_prep: self.interview_prep.into(),
            analysis: self.analysis.into(),
        })
    }
}
