//! In-process analysis service used by the integration tests.
//!
//! Scoring is a deterministic keyword match so repeated calls agree. Any route
//! can be forced to fail with a status, answer a fixed body, or hold its answer
//! until another route has answered.
#![allow(dead_code)]

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

const STOP_WORDS: [&str; 15] = [
    "the", "and", "is", "in", "at", "of", "a", "to", "for", "on", "with", "by", "an", "as", "be",
];

#[derive(Clone, Default)]
pub struct StubConfig {
    failures: HashMap<&'static str, u16>,
    bodies: HashMap<&'static str, Value>,
    holds: HashMap<&'static str, &'static str>,
}

impl StubConfig {
    pub fn fail(mut self, route: &'static str, status: u16) -> Self {
        self.failures.insert(route, status);
        self
    }

    pub fn body(mut self, route: &'static str, body: Value) -> Self {
        self.bodies.insert(route, body);
        self
    }

    /// `route` does not answer before `earlier` has answered
    pub fn hold_until(mut self, route: &'static str, earlier: &'static str) -> Self {
        self.holds.insert(route, earlier);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

#[derive(Default)]
pub struct StubState {
    config: StubConfig,
    pub uploads: Mutex<Vec<ReceivedUpload>>,
    pub requests: Mutex<Vec<(String, Value)>>,
    /// Routes in the order their handlers answered
    pub answered: Mutex<Vec<&'static str>>,
    signals: Mutex<HashMap<&'static str, Arc<Notify>>>,
    cvs: Mutex<Vec<Value>>,
}

impl StubState {
    fn signal(&self, route: &'static str) -> Arc<Notify> {
        self.signals
            .lock()
            .unwrap()
            .entry(route)
            .or_default()
            .clone()
    }

    /// Mark `route` as answered and release anything held behind it
    fn answer(&self, route: &'static str, response: Response) -> Response {
        self.answered.lock().unwrap().push(route);
        self.signal(route).notify_one();
        response
    }

    /// Forced status or body for `route`, after waiting on any configured hold
    async fn scripted(&self, route: &'static str) -> Option<Response> {
        if let Some(earlier) = self.config.holds.get(route) {
            self.signal(earlier).notified().await;
        }
        if let Some(status) = self.config.failures.get(route) {
            let status = StatusCode::from_u16(*status).unwrap();
            return Some((status, Json(json!({ "detail": "stub failure" }))).into_response());
        }
        self.config
            .bodies
            .get(route)
            .map(|body| Json(body.clone()).into_response())
    }

    fn record(&self, route: &str, body: &Value) {
        self.requests
            .lock()
            .unwrap()
            .push((route.to_string(), body.clone()));
    }

    pub fn requests_to(&self, route: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == route)
            .map(|(_, b)| b.clone())
            .collect()
    }
}

pub struct StubService {
    pub base_url: String,
    pub state: Arc<StubState>,
}

impl StubService {
    pub async fn start() -> Self {
        Self::start_with(StubConfig::default()).await
    }

    pub async fn start_with(config: StubConfig) -> Self {
        let state = Arc::new(StubState {
            config,
            ..StubState::default()
        });

        let app = Router::new()
            .route("/upload", post(upload))
            .route("/score", post(score))
            .route("/rewrite", post(rewrite))
            .route("/cover-letter", post(cover_letter))
            .route("/interview-questions", post(interview_questions))
            .route("/templates", get(templates))
            .route("/templates/apply", post(apply_template))
            .route("/api/cvs", get(list_cvs))
            .route("/api/cvs/:cv_id", get(get_cv).delete(delete_cv))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Seed the CV listing
    pub fn add_cv(&self, cv: Value) {
        self.state.cvs.lock().unwrap().push(cv);
    }
}

fn tokens(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| w.len() >= 3 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Deterministic keyword matcher standing in for the real scorer
pub fn keyword_score(cv_text: &str, job_description: &str) -> Value {
    let cv = tokens(cv_text);
    let jd = tokens(job_description);

    let matched: Vec<&String> = jd.intersection(&cv).collect();
    let missing: Vec<&String> = jd.difference(&cv).collect();
    let denom = jd.len().max(1) as f64;
    let score = (matched.len() as f64 / denom * 10000.0).round() / 100.0;

    json!({
        "ats_score": score,
        "matched_keywords": matched,
        "missing_keywords": missing,
    })
}

async fn upload(State(state): State<Arc<StubState>>, mut multipart: Multipart) -> Response {
    let mut text = String::new();
    let mut file_name = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let received = ReceivedUpload {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            size: 0,
        };
        let data = field.bytes().await.unwrap();
        text = String::from_utf8_lossy(&data).to_string();
        file_name = received.file_name.clone();
        state.uploads.lock().unwrap().push(ReceivedUpload {
            size: data.len(),
            ..received
        });
    }

    if let Some(response) = state.scripted("/upload").await {
        return response;
    }

    let cv_id = format!("cv-{}", state.uploads.lock().unwrap().len());
    state.cvs.lock().unwrap().push(json!({
        "id": cv_id,
        "filename": file_name,
        "extracted_text": text,
    }));
    Json(json!({ "cv_id": cv_id, "extracted_text": text })).into_response()
}

async fn score(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    state.record("/score", &body);
    let response = match state.scripted("/score").await {
        Some(response) => response,
        None => {
            let cv_text = body["cv_text"].as_str().unwrap_or_default();
            let job = body["job_description"].as_str().unwrap_or_default();
            if job.trim().is_empty() {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "detail": "Job description is required." })),
                )
                    .into_response()
            } else {
                Json(keyword_score(cv_text, job)).into_response()
            }
        }
    };
    state.answer("/score", response)
}

async fn rewrite(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    state.record("/rewrite", &body);
    let response = match state.scripted("/rewrite").await {
        Some(response) => response,
        None => {
            let cv_text = body["cv_text"].as_str().unwrap_or_default();
            Json(json!({ "rewritten_cv": format!("Tailored: {}", cv_text) })).into_response()
        }
    };
    state.answer("/rewrite", response)
}

async fn cover_letter(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    state.record("/cover-letter", &body);
    let response = match state.scripted("/cover-letter").await {
        Some(response) => response,
        None => Json(json!({ "cover_letter": "Dear Hiring Manager, ..." })).into_response(),
    };
    state.answer("/cover-letter", response)
}

async fn interview_questions(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Value>,
) -> Response {
    state.record("/interview-questions", &body);
    let response = match state.scripted("/interview-questions").await {
        Some(response) => response,
        None => Json(json!({
            "technical_questions": ["Explain ownership in Rust."],
            "behavioral_questions": ["Describe a conflict you resolved."],
            "tips": ["Quantify your impact."],
        }))
        .into_response(),
    };
    state.answer("/interview-questions", response)
}

async fn templates(State(state): State<Arc<StubState>>) -> Response {
    if let Some(response) = state.scripted("/templates").await {
        return response;
    }
    Json(json!({ "templates": ["classic", "modern", "compact"] })).into_response()
}

async fn apply_template(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    state.record("/templates/apply", &body);
    if let Some(response) = state.scripted("/templates/apply").await {
        return response;
    }
    let text = body["cv_text"].as_str().unwrap_or_default();
    let formatted = match body["template_name"].as_str() {
        Some("classic") => format!("--- Classic Resume Format ---\n\n{}", text),
        Some("modern") => format!("*** Modern Resume Format ***\n\n{}", text),
        Some("compact") => format!(":: Compact CV ::\n\n{}", text),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Template not found" })),
            )
                .into_response()
        }
    };
    Json(json!({ "formatted_cv": formatted })).into_response()
}

async fn list_cvs(State(state): State<Arc<StubState>>) -> Response {
    if let Some(response) = state.scripted("/api/cvs").await {
        return response;
    }
    let cvs = state.cvs.lock().unwrap().clone();
    Json(json!({ "cvs": cvs })).into_response()
}

async fn get_cv(State(state): State<Arc<StubState>>, Path(cv_id): Path<String>) -> Response {
    let cvs = state.cvs.lock().unwrap().clone();
    match cvs.into_iter().find(|cv| cv["id"] == cv_id.as_str()) {
        Some(cv) => Json(cv).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "CV not found." })),
        )
            .into_response(),
    }
}

async fn delete_cv(State(state): State<Arc<StubState>>, Path(cv_id): Path<String>) -> Response {
    let mut cvs = state.cvs.lock().unwrap();
    let before = cvs.len();
    cvs.retain(|cv| cv["id"] != cv_id.as_str());
    if cvs.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "CV not found." })),
        )
            .into_response();
    }
    Json(json!({ "message": format!("CV with ID {} deleted successfully.", cv_id) }))
        .into_response()
}
