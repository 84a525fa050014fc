// src/core/service_client.rs
//! HTTP client for the analysis service - JSON for every call except the multipart upload

use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::AnalyzerConfig;
use crate::core::upload::UploadFile;
use crate::error::{ClientError, Result};
use crate::types::cv_data::{Cv, InterviewPrep, ScoreResult};
use crate::types::response::{
    CoverLetterResponse, CvActionRequest, CvListResponse, CvRecord, DeleteResponse,
    InterviewPrepResponse, RewriteResponse, ScoreRequest, ScoreResponse, TemplateListResponse,
    TemplateRequest, TemplateResponse, UploadResponse,
};

const UPLOAD_ENDPOINT: &str = "/upload";
const SCORE_ENDPOINT: &str = "/score";
const REWRITE_ENDPOINT: &str = "/rewrite";
const COVER_LETTER_ENDPOINT: &str = "/cover-letter";
const INTERVIEW_QUESTIONS_ENDPOINT: &str = "/interview-questions";
const TEMPLATES_ENDPOINT: &str = "/templates";
const APPLY_TEMPLATE_ENDPOINT: &str = "/templates/apply";
const CVS_ENDPOINT: &str = "/cvs";

/// The CV collection lives under `/api` while the action routes do not
pub const DEFAULT_CVS_PREFIX: &str = "/api";

const UPLOAD_FIELD: &str = "file";
const FALLBACK_MIME: &str = "application/octet-stream";
const MAX_LOGGED_BODY: usize = 2048;

/// Every route the client calls. Action routes share `prefix`; the CV
/// collection sits under its own `cvs_prefix`.
#[derive(Debug, Clone, PartialEq)]
pub struct Routes {
    prefix: String,
    cvs_prefix: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self::new("")
    }
}

impl Routes {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            cvs_prefix: DEFAULT_CVS_PREFIX.to_string(),
        }
    }

    pub fn with_cvs_prefix(mut self, cvs_prefix: impl Into<String>) -> Self {
        self.cvs_prefix = cvs_prefix.into();
        self
    }

    fn join(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path)
    }

    pub fn upload(&self) -> String {
        self.join(UPLOAD_ENDPOINT)
    }

    pub fn score(&self) -> String {
        self.join(SCORE_ENDPOINT)
    }

    pub fn rewrite(&self) -> String {
        self.join(REWRITE_ENDPOINT)
    }

    pub fn cover_letter(&self) -> String {
        self.join(COVER_LETTER_ENDPOINT)
    }

    pub fn interview_questions(&self) -> String {
        self.join(INTERVIEW_QUESTIONS_ENDPOINT)
    }

    pub fn templates(&self) -> String {
        self.join(TEMPLATES_ENDPOINT)
    }

    pub fn apply_template(&self) -> String {
        self.join(APPLY_TEMPLATE_ENDPOINT)
    }

    pub fn cvs(&self) -> String {
        format!("{}{}", self.cvs_prefix, CVS_ENDPOINT)
    }

    pub fn cv(&self, cv_id: &str) -> String {
        format!("{}/{}", self.cvs(), urlencoding::encode(cv_id))
    }
}

#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    routes: Routes,
}

impl ServiceClient {
    /// Create a client; without a timeout the transport default applies
    pub fn new(base_url: String, timeout_seconds: Option<u64>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(format!("cv-analyzer/{}", env!("CARGO_PKG_VERSION")));

        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(ClientError::ClientSetup)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            routes: Routes::default(),
        })
    }

    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        Ok(Self::new(config.api_base_url.clone(), config.request_timeout_secs)?
            .with_routes(
                Routes::new(config.route_prefix.clone()).with_cvs_prefix(config.cvs_prefix.clone()),
            ))
    }

    pub fn with_routes(mut self, routes: Routes) -> Self {
        self.routes = routes;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    // ===== Generic verbs =====

    pub async fn get<R>(&self, endpoint: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let request = self.client.get(self.url(endpoint));
        self.execute("GET", endpoint, request).await
    }

    pub async fn post_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.post(self.url(endpoint)).json(payload);
        self.execute("POST", endpoint, request).await
    }

    pub async fn put_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.put(self.url(endpoint)).json(payload);
        self.execute("PUT", endpoint, request).await
    }

    pub async fn delete<R>(&self, endpoint: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let request = self.client.delete(self.url(endpoint));
        self.execute("DELETE", endpoint, request).await
    }

    /// Multipart upload: the file travels as form field `file`
    pub async fn upload_file<R>(&self, endpoint: &str, file: &UploadFile) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let mime = file.content_type().unwrap_or(FALLBACK_MIME);
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(mime)
            .map_err(|e| ClientError::InvalidUpload(e.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let request = self.client.post(self.url(endpoint)).multipart(form);
        self.execute("POST", endpoint, request).await
    }

    /// Send, check the status, then parse. A non-2xx body is never parsed.
    async fn execute<R>(&self, method: &str, endpoint: &str, request: RequestBuilder) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let span = info_span!(
            "service_call",
            request_id = %Uuid::new_v4(),
            method,
            endpoint
        );

        async move {
            info!("Calling analysis service: {} {}", method, endpoint);

            let response = request.send().await.map_err(|source| {
                error!("Request to {} failed: {}", endpoint, source);
                ClientError::Transport {
                    endpoint: endpoint.to_string(),
                    source,
                }
            })?;

            let status = response.status();
            debug!("Response status: {}", status);

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                error!(
                    "Service returned error status {}: {}",
                    status,
                    truncate(&body)
                );
                return Err(ClientError::Http {
                    status,
                    endpoint: endpoint.to_string(),
                    body,
                });
            }

            let text = response
                .text()
                .await
                .map_err(|source| ClientError::Transport {
                    endpoint: endpoint.to_string(),
                    source,
                })?;
            debug!("Raw response: {}", truncate(&text));

            let body = if text.trim().is_empty() { "null" } else { text.as_str() };
            serde_json::from_str::<R>(body).map_err(|e| {
                error!("Unexpected response shape from {}: {}", endpoint, e);
                ClientError::contract(endpoint, format!("unexpected response body: {}", e))
            })
        }
        .instrument(span)
        .await
    }

    // ===== Domain operations =====

    /// 1. Upload - sends the file, receives the id and extracted text
    pub async fn upload_cv(&self, file: &UploadFile) -> Result<UploadResponse> {
        let endpoint = self.routes.upload();
        let response: UploadResponse = self.upload_file(&endpoint, file).await?;
        response.validate(&endpoint)
    }

    /// 2. Score against a job description
    pub async fn score(
        &self,
        cv_id: &str,
        cv_text: &str,
        job_description: &str,
    ) -> Result<ScoreResult> {
        let endpoint = self.routes.score();
        let payload = ScoreRequest {
            cv_id,
            job_description,
            cv_text,
        };
        let response: ScoreResponse = self.post_json(&endpoint, &payload).await?;
        response.into_result(&endpoint)
    }

    /// 3. Rewrite tailored to a job description
    pub async fn rewrite(
        &self,
        cv_id: &str,
        cv_text: &str,
        job_description: &str,
    ) -> Result<String> {
        let payload = CvActionRequest {
            cv_id,
            cv_text,
            job_description,
        };
        let response: RewriteResponse = self.post_json(&self.routes.rewrite(), &payload).await?;
        Ok(response.rewritten_cv)
    }

    /// 4. Cover letter
    pub async fn cover_letter(
        &self,
        cv_id: &str,
        cv_text: &str,
        job_description: &str,
    ) -> Result<String> {
        let payload = CvActionRequest {
            cv_id,
            cv_text,
            job_description,
        };
        let response: CoverLetterResponse = self
            .post_json(&self.routes.cover_letter(), &payload)
            .await?;
        Ok(response.cover_letter)
    }

    /// 5. Interview questions and tips, as one bundle
    pub async fn interview_prep(
        &self,
        cv_id: &str,
        cv_text: &str,
        job_description: &str,
    ) -> Result<InterviewPrep> {
        let payload = CvActionRequest {
            cv_id,
            cv_text,
            job_description,
        };
        let response: InterviewPrepResponse = self
            .post_json(&self.routes.interview_questions(), &payload)
            .await?;
        Ok(response.into())
    }

    pub async fn list_templates(&self) -> Result<Vec<String>> {
        let response: TemplateListResponse = self.get(&self.routes.templates()).await?;
        Ok(response.into_names())
    }

    pub async fn apply_template(&self, template_name: &str, cv_text: &str) -> Result<String> {
        let payload = TemplateRequest {
            template_name,
            cv_text,
        };
        let response: TemplateResponse = self
            .post_json(&self.routes.apply_template(), &payload)
            .await?;
        Ok(response.formatted_cv)
    }

    pub async fn list_cvs(&self) -> Result<Vec<Cv>> {
        let endpoint = self.routes.cvs();
        let response: CvListResponse = self.get(&endpoint).await?;
        response
            .cvs
            .into_iter()
            .map(|record| record.into_cv(&endpoint))
            .collect()
    }

    pub async fn get_cv(&self, cv_id: &str) -> Result<Cv> {
        let endpoint = self.routes.cv(cv_id);
        let record: CvRecord = self.get(&endpoint).await?;
        record.into_cv(&endpoint)
    }

    /// Returns the service's confirmation message, if it sent one
    pub async fn delete_cv(&self, cv_id: &str) -> Result<Option<String>> {
        let response: Option<DeleteResponse> = self.delete(&self.routes.cv(cv_id)).await?;
        Ok(response.and_then(|r| r.message))
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_LOGGED_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
