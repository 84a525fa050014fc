// src/dashboard.rs
//! Summaries over a CV listing: stats, search, score bands

use crate::types::cv_data::Cv;

pub const EXCELLENT_THRESHOLD: f64 = 80.0;
pub const GOOD_THRESHOLD: f64 = 60.0;
pub const RECENT_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreRating {
    Excellent,
    Good,
    NeedsImprovement,
}

impl ScoreRating {
    pub fn from_score(score: f64) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            ScoreRating::Excellent
        } else if score >= GOOD_THRESHOLD {
            ScoreRating::Good
        } else {
            ScoreRating::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreRating::Excellent => "Excellent",
            ScoreRating::Good => "Good",
            ScoreRating::NeedsImprovement => "Needs Improvement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_cvs: usize,
    pub analyzed_cvs: usize,
    /// Rounded mean of overall scores; CVs without analysis count as 0
    pub average_score: u32,
}

impl DashboardStats {
    pub fn from_cvs(cvs: &[Cv]) -> Self {
        if cvs.is_empty() {
            return Self::default();
        }

        let sum: f64 = cvs
            .iter()
            .map(|cv| cv.analysis.as_ready().map_or(0.0, |a| a.overall_score))
            .sum();

        Self {
            total_cvs: cvs.len(),
            analyzed_cvs: cvs.iter().filter(|cv| cv.is_analyzed()).count(),
            average_score: (sum / cvs.len() as f64).round() as u32,
        }
    }
}

/// Case-insensitive match on title or file name; an empty query keeps everything
pub fn search<'a>(cvs: &'a [Cv], query: &str) -> Vec<&'a Cv> {
    let query = query.to_lowercase();
    cvs.iter()
        .filter(|cv| {
            cv.title.to_lowercase().contains(&query)
                || cv.file_name.to_lowercase().contains(&query)
        })
        .collect()
}

pub fn recent(cvs: &[Cv]) -> &[Cv] {
    &cvs[..cvs.len().min(RECENT_LIMIT)]
}
