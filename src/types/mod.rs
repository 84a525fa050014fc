// src/types/mod.rs
pub mod cv_data;
pub mod response;

pub use cv_data::{
    Analysis, Cv, CvAnalysis, Feedback, InterviewPrep, ScoreResult, SectionScores,
};
