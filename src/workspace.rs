// src/workspace.rs
//! State of the CV detail view: one CV record plus the job description it is analyzed against.
//!
//! Each action writes only its own field group, so actions can be in flight
//! together and complete in any order.

use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt;
use tracing::{error, info};

use crate::core::{ServiceClient, UploadFile, UploadPolicy};
use crate::error::{ClientError, Result};
use crate::types::cv_data::{Cv, InterviewPrep, ScoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CvAction {
    Score,
    Rewrite,
    CoverLetter,
    InterviewPrep,
}

impl CvAction {
    pub const ALL: [CvAction; 4] = [
        CvAction::Score,
        CvAction::Rewrite,
        CvAction::CoverLetter,
        CvAction::InterviewPrep,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CvAction::Score => "score",
            CvAction::Rewrite => "rewrite",
            CvAction::CoverLetter => "cover letter",
            CvAction::InterviewPrep => "interview prep",
        }
    }
}

impl fmt::Display for CvAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A successful action result, tagged with the field group it fills
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Score(ScoreResult),
    Rewrite(String),
    CoverLetter(String),
    InterviewPrep(InterviewPrep),
}

impl ActionOutcome {
    pub fn action(&self) -> CvAction {
        match self {
            ActionOutcome::Score(_) => CvAction::Score,
            ActionOutcome::Rewrite(_) => CvAction::Rewrite,
            ActionOutcome::CoverLetter(_) => CvAction::CoverLetter,
            ActionOutcome::InterviewPrep(_) => CvAction::InterviewPrep,
        }
    }
}

#[derive(Debug)]
pub struct ActionReport {
    pub action: CvAction,
    pub result: Result<()>,
}

/// Issue one action against the service
pub async fn request_action(
    client: &ServiceClient,
    action: CvAction,
    cv_id: &str,
    cv_text: &str,
    job_description: &str,
) -> Result<ActionOutcome> {
    let outcome = match action {
        CvAction::Score => {
            ActionOutcome::Score(client.score(cv_id, cv_text, job_description).await?)
        }
        CvAction::Rewrite => {
            ActionOutcome::Rewrite(client.rewrite(cv_id, cv_text, job_description).await?)
        }
        CvAction::CoverLetter => ActionOutcome::CoverLetter(
            client.cover_letter(cv_id, cv_text, job_description).await?,
        ),
        CvAction::InterviewPrep => ActionOutcome::InterviewPrep(
            client
                .interview_prep(cv_id, cv_text, job_description)
                .await?,
        ),
    };
    Ok(outcome)
}

#[derive(Debug, Clone)]
pub struct Workspace {
    cv: Cv,
    job_description: String,
}

impl Workspace {
    pub fn new(cv: Cv) -> Self {
        Self {
            cv,
            job_description: String::new(),
        }
    }

    /// Filter, upload, and open a workspace on the record the service created
    pub async fn upload(
        client: &ServiceClient,
        policy: &UploadPolicy,
        file: &UploadFile,
    ) -> Result<Self> {
        policy.check(file)?;

        let response = client.upload_cv(file).await?;
        info!(
            "Uploaded {} as cv {} ({} chars extracted)",
            file.file_name,
            response.cv_id,
            response.extracted_text.chars().count()
        );

        Ok(Self::new(Cv::new(
            response.cv_id,
            file.title(),
            file.file_name.clone(),
            file.size(),
            response.extracted_text,
        )))
    }

    pub fn cv(&self) -> &Cv {
        &self.cv
    }

    pub fn into_cv(self) -> Cv {
        self.cv
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn set_job_description(&mut self, job_description: impl Into<String>) {
        self.job_description = job_description.into();
    }

    /// Owned copies of what every action sends: id, text, job description
    fn action_inputs(&self) -> Result<(String, String, String)> {
        if self.job_description.trim().is_empty() {
            return Err(ClientError::MissingInput("job description"));
        }
        if self.cv.extracted_text.trim().is_empty() {
            return Err(ClientError::MissingInput("cv text"));
        }
        Ok((
            self.cv.id.clone(),
            self.cv.extracted_text.clone(),
            self.job_description.clone(),
        ))
    }

    /// Write an outcome into its own field group, leaving the others as they are
    pub fn apply(&mut self, outcome: ActionOutcome) {
        match outcome {
            ActionOutcome::Score(score) => self.cv.score.set(score),
            ActionOutcome::Rewrite(text) => self.cv.rewritten_cv.set(text),
            ActionOutcome::CoverLetter(text) => self.cv.cover_letter.set(text),
            ActionOutcome::InterviewPrep(prep) => self.cv.interview_prep.set(prep),
        }
    }

    /// Run one action; on failure the record is left untouched
    pub async fn run(&mut self, client: &ServiceClient, action: CvAction) -> Result<()> {
        let (cv_id, cv_text, job_description) = self.action_inputs()?;

        match request_action(client, action, &cv_id, &cv_text, &job_description).await {
            Ok(outcome) => {
                self.apply(outcome);
                Ok(())
            }
            Err(e) => {
                error!("Failed to {} cv {}: {}", action, cv_id, e);
                Err(e)
            }
        }
    }

    /// Run several actions concurrently, applying each result as it arrives.
    ///
    /// Reports come back in completion order, one per requested action.
    pub async fn run_actions(
        &mut self,
        client: &ServiceClient,
        actions: &[CvAction],
    ) -> Vec<ActionReport> {
        let (cv_id, cv_text, job_description) = match self.action_inputs() {
            Ok(inputs) => inputs,
            Err(e) => {
                let reason = match e {
                    ClientError::MissingInput(what) => what,
                    _ => "action inputs",
                };
                return actions
                    .iter()
                    .map(|&action| ActionReport {
                        action,
                        result: Err(ClientError::MissingInput(reason)),
                    })
                    .collect();
            }
        };

        let mut pending: FuturesUnordered<_> = actions
            .iter()
            .map(|&action| {
                let (cv_id, cv_text, job_description) = (&cv_id, &cv_text, &job_description);
                async move {
                    let result =
                        request_action(client, action, cv_id, cv_text, job_description).await;
                    (action, result)
                }
            })
            .collect();

        let mut reports = Vec::with_capacity(actions.len());
        while let Some((action, result)) = pending.next().await {
            let result = match result {
                Ok(outcome) => {
                    info!("Completed {} for cv {}", action, cv_id);
                    self.apply(outcome);
                    Ok(())
                }
                Err(e) => {
                    error!("Failed to {} cv {}: {}", action, cv_id, e);
                    Err(e)
                }
            };
            reports.push(ActionReport { action, result });
        }

        reports
    }

    /// Format the extracted text with a named template and keep it as the working content
    pub async fn apply_template(
        &mut self,
        client: &ServiceClient,
        template_name: &str,
    ) -> Result<&str> {
        if self.cv.extracted_text.trim().is_empty() {
            return Err(ClientError::MissingInput("cv text"));
        }

        let formatted = client
            .apply_template(template_name, &self.cv.extracted_text)
            .await?;
        self.cv.content = formatted;
        Ok(self.cv.content.as_str())
    }
}
