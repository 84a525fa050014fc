// src/types/cv_data.rs
//! CV record and the analysis artifacts attached to it as actions complete

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ===== Per-group completion state =====

/// A field group that arrives from its own service call.
///
/// Serialized as the inner value or `null`, which matches how the service
/// lists CVs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<T>", into = "Option<T>")]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de>"
))]
pub enum Analysis<T> {
    NotComputed,
    Ready(T),
}

impl<T> Analysis<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Analysis::Ready(_))
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Analysis::Ready(value) => Some(value),
            Analysis::NotComputed => None,
        }
    }

    /// Replace the group wholesale
    pub fn set(&mut self, value: T) {
        *self = Analysis::Ready(value);
    }
}

impl<T> Default for Analysis<T> {
    fn default() -> Self {
        Analysis::NotComputed
    }
}

impl<T> From<Option<T>> for Analysis<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Analysis::Ready(v),
            None => Analysis::NotComputed,
        }
    }
}

impl<T> From<Analysis<T>> for Option<T> {
    fn from(value: Analysis<T>) -> Self {
        match value {
            Analysis::Ready(v) => Some(v),
            Analysis::NotComputed => None,
        }
    }
}

// ===== Score group =====

/// ATS score plus both keyword sets; always populated together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub ats_score: f64,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
}

impl ScoreResult {
    /// Check the range and disjointness rules; returns the reason on failure
    pub fn check(&self) -> Result<(), String> {
        if !self.ats_score.is_finite() || !(0.0..=100.0).contains(&self.ats_score) {
            return Err(format!("ats_score {} is outside [0, 100]", self.ats_score));
        }

        let matched: HashSet<String> = self
            .matched_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();

        if let Some(overlap) = self
            .missing_keywords
            .iter()
            .find(|k| matched.contains(&k.to_lowercase()))
        {
            return Err(format!(
                "keyword '{}' is both matched and missing",
                overlap
            ));
        }

        Ok(())
    }
}

// ===== Interview prep bundle =====

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterviewPrep {
    pub technical_questions: Vec<String>,
    pub behavioral_questions: Vec<String>,
    pub tips: Vec<String>,
}

impl InterviewPrep {
    pub fn question_count(&self) -> usize {
        self.technical_questions.len() + self.behavioral_questions.len()
    }
}

// ===== Service-produced analysis summary =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvAnalysis {
    pub id: String,
    pub cv_id: String,
    pub overall_score: f64,
    pub sections: SectionScores,
    pub feedback: Feedback,
    pub ats_score: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionScores {
    pub personal_info: f64,
    pub experience: f64,
    pub education: f64,
    pub skills: f64,
    pub achievements: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Feedback {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
}

impl CvAnalysis {
    /// Every score, fractional or not, must lie in [0, 100]
    pub fn check(&self) -> Result<(), String> {
        let scores = [
            ("overallScore", self.overall_score),
            ("personalInfo", self.sections.personal_info),
            ("experience", self.sections.experience),
            ("education", self.sections.education),
            ("skills", self.sections.skills),
            ("achievements", self.sections.achievements),
            ("atsScore", self.ats_score),
        ];

        match scores
            .iter()
            .find(|(_, v)| !v.is_finite() || !(0.0..=100.0).contains(v))
        {
            Some((name, value)) => Err(format!("{} {} is outside [0, 100]", name, value)),
            None => Ok(()),
        }
    }
}

// ===== CV record =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cv {
    pub id: String,
    pub title: String,
    pub file_name: String,
    pub file_size: u64,
    pub upload_date: DateTime<Utc>,
    /// Working text; starts as the extraction and follows applied templates.
    pub content: String,
    pub extracted_text: String,
    #[serde(default)]
    pub score: Analysis<ScoreResult>,
    #[serde(default)]
    pub rewritten_cv: Analysis<String>,
    #[serde(default)]
    pub cover_letter: Analysis<String>,
    #[serde(default)]
    pub interview_prep: Analysis<InterviewPrep>,
    #[serde(default)]
    pub analysis: Analysis<CvAnalysis>,
}

impl Cv {
    /// Fresh record as created from an upload response
    pub fn new(
        id: String,
        title: String,
        file_name: String,
        file_size: u64,
        extracted_text: String,
    ) -> Self {
        Self {
            id,
            title,
            file_name,
            file_size,
            upload_date: Utc::now(),
            content: extracted_text.clone(),
            extracted_text,
            score: Analysis::NotComputed,
            rewritten_cv: Analysis::NotComputed,
            cover_letter: Analysis::NotComputed,
            interview_prep: Analysis::NotComputed,
            analysis: Analysis::NotComputed,
        }
    }

    pub fn ats_score(&self) -> Option<f64> {
        self.score.as_ready().map(|s| s.ats_score)
    }

    pub fn matched_keywords(&self) -> Option<&[String]> {
        self.score.as_ready().map(|s| s.matched_keywords.as_slice())
    }

    pub fn missing_keywords(&self) -> Option<&[String]> {
        self.score.as_ready().map(|s| s.missing_keywords.as_slice())
    }

    pub fn rewritten_cv(&self) -> Option<&str> {
        self.rewritten_cv.as_ready().map(String::as_str)
    }

    pub fn cover_letter(&self) -> Option<&str> {
        self.cover_letter.as_ready().map(String::as_str)
    }

    /// True once the service has attached an analysis summary
    pub fn is_analyzed(&self) -> bool {
        self.analysis.is_ready()
    }
}
