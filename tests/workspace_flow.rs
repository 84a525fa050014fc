mod support;

use cv_analyzer::{ClientError, CvAction, ServiceClient, UploadFile, UploadPolicy, Workspace};
use serde_json::json;
use support::{StubConfig, StubService};

fn client_for(stub: &StubService) -> ServiceClient {
    ServiceClient::new(stub.base_url.clone(), Some(10)).unwrap()
}

async fn uploaded(stub: &StubService, client: &ServiceClient) -> Workspace {
    let file = UploadFile::new("resume.pdf", vec![b'x'; 10 * 1024]);
    let mut workspace = Workspace::upload(client, &UploadPolicy::default(), &file)
        .await
        .unwrap();
    workspace.set_job_description("Python Kubernetes");
    assert_eq!(stub.state.uploads.lock().unwrap().len(), 1);
    workspace
}

#[tokio::test]
async fn test_upload_creates_cv_without_score() {
    let stub = StubService::start_with(StubConfig::default().body(
        "/upload",
        json!({ "cv_id": "abc", "extracted_text": "Jane Doe..." }),
    ))
    .await;
    let client = client_for(&stub);

    let file = UploadFile::new("resume.pdf", vec![0u8; 10 * 1024]);
    let workspace = Workspace::upload(&client, &UploadPolicy::default(), &file)
        .await
        .unwrap();

    let cv = workspace.cv();
    assert_eq!(cv.id, "abc");
    assert_eq!(cv.extracted_text, "Jane Doe...");
    assert_eq!(cv.file_name, "resume.pdf");
    assert_eq!(cv.file_size, 10 * 1024);
    assert_eq!(cv.title, "resume");
    assert_eq!(cv.ats_score(), None);
    assert_eq!(cv.matched_keywords(), None);
    assert_eq!(cv.missing_keywords(), None);
}

#[tokio::test]
async fn test_score_populates_the_score_group() {
    let stub = StubService::start_with(
        StubConfig::default()
            .body(
                "/upload",
                json!({ "cv_id": "abc", "extracted_text": "Jane Doe, Python" }),
            )
            .body(
                "/score",
                json!({
                    "ats_score": 72,
                    "matched_keywords": ["Python"],
                    "missing_keywords": ["Kubernetes"],
                }),
            ),
    )
    .await;
    let client = client_for(&stub);
    let mut workspace = uploaded(&stub, &client).await;

    workspace.run(&client, CvAction::Score).await.unwrap();

    let cv = workspace.cv();
    assert_eq!(cv.ats_score(), Some(72.0));
    assert_eq!(cv.matched_keywords().unwrap(), ["Python".to_string()]);
    assert_eq!(cv.missing_keywords().unwrap(), ["Kubernetes".to_string()]);
    assert_eq!(cv.rewritten_cv(), None);
}

#[tokio::test]
async fn test_failed_rewrite_leaves_rewritten_cv_unset() {
    let stub = StubService::start_with(StubConfig::default().fail("/rewrite", 500)).await;
    let client = client_for(&stub);
    let mut workspace = uploaded(&stub, &client).await;

    let err = workspace.run(&client, CvAction::Rewrite).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(workspace.cv().rewritten_cv(), None);
    assert!(!workspace.cv().rewritten_cv.is_ready());
}

#[tokio::test]
async fn test_concurrent_score_and_rewrite_keep_both_results() {
    // Score is requested first but cannot answer until rewrite has
    let stub =
        StubService::start_with(StubConfig::default().hold_until("/score", "/rewrite")).await;
    let client = client_for(&stub);
    let mut workspace = uploaded(&stub, &client).await;

    let reports = workspace
        .run_actions(&client, &[CvAction::Score, CvAction::Rewrite])
        .await;

    assert_eq!(*stub.state.answered.lock().unwrap(), ["/rewrite", "/score"]);

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().any(|r| r.action == CvAction::Score));
    assert!(reports.iter().any(|r| r.action == CvAction::Rewrite));
    assert!(reports.iter().all(|r| r.result.is_ok()));

    let cv = workspace.cv();
    assert!(cv.ats_score().is_some());
    assert!(cv.rewritten_cv().unwrap().starts_with("Tailored: "));
}

#[tokio::test]
async fn test_failure_answered_last_keeps_earlier_success() {
    let stub = StubService::start_with(
        StubConfig::default()
            .fail("/rewrite", 500)
            .hold_until("/rewrite", "/score"),
    )
    .await;
    let client = client_for(&stub);
    let mut workspace = uploaded(&stub, &client).await;

    let reports = workspace
        .run_actions(&client, &[CvAction::Rewrite, CvAction::Score])
        .await;

    assert_eq!(*stub.state.answered.lock().unwrap(), ["/score", "/rewrite"]);
    let rewrite = reports
        .iter()
        .find(|r| r.action == CvAction::Rewrite)
        .unwrap();
    assert_eq!(rewrite.result.as_ref().unwrap_err().status(), Some(500));

    assert!(workspace.cv().ats_score().is_some());
    assert_eq!(workspace.cv().rewritten_cv(), None);
}

#[tokio::test]
async fn test_later_failure_does_not_clobber_earlier_result() {
    let stub = StubService::start_with(StubConfig::default().fail("/rewrite", 500)).await;
    let client = client_for(&stub);
    let mut workspace = uploaded(&stub, &client).await;

    workspace.run(&client, CvAction::Score).await.unwrap();
    let score_before = workspace.cv().score.clone();

    let reports = workspace
        .run_actions(&client, &[CvAction::Rewrite, CvAction::CoverLetter])
        .await;

    let rewrite = reports
        .iter()
        .find(|r| r.action == CvAction::Rewrite)
        .unwrap();
    assert_eq!(rewrite.result.as_ref().unwrap_err().status(), Some(500));

    let cv = workspace.cv();
    assert_eq!(cv.score, score_before);
    assert_eq!(cv.rewritten_cv(), None);
    assert_eq!(cv.cover_letter(), Some("Dear Hiring Manager, ..."));
}

#[tokio::test]
async fn test_all_actions_fill_every_group() {
    let stub = StubService::start().await;
    let client = client_for(&stub);
    let mut workspace = uploaded(&stub, &client).await;

    let reports = workspace.run_actions(&client, &CvAction::ALL).await;
    assert_eq!(reports.len(), 4);
    assert!(reports.iter().all(|r| r.result.is_ok()));

    let cv = workspace.cv();
    assert!(cv.score.is_ready());
    assert!(cv.rewritten_cv.is_ready());
    assert!(cv.cover_letter.is_ready());
    assert_eq!(cv.interview_prep.as_ready().unwrap().question_count(), 2);
}

#[tokio::test]
async fn test_actions_send_extracted_text() {
    let stub = StubService::start().await;
    let client = client_for(&stub);
    let mut workspace = uploaded(&stub, &client).await;

    workspace.run(&client, CvAction::CoverLetter).await.unwrap();

    let sent = stub.state.requests_to("/cover-letter");
    assert_eq!(sent[0]["cv_id"], workspace.cv().id.as_str());
    assert_eq!(sent[0]["cv_text"], workspace.cv().extracted_text.as_str());
    assert_eq!(sent[0]["job_description"], "Python Kubernetes");
}

#[tokio::test]
async fn test_apply_template_updates_working_content() {
    let stub = StubService::start().await;
    let client = client_for(&stub);
    let mut workspace = uploaded(&stub, &client).await;

    let formatted = workspace
        .apply_template(&client, "classic")
        .await
        .unwrap()
        .to_string();
    assert!(formatted.starts_with("--- Classic Resume Format ---"));
    assert_eq!(workspace.cv().content, formatted);
    assert_ne!(workspace.cv().content, workspace.cv().extracted_text);
}

#[tokio::test]
async fn test_policy_rejects_before_any_request() {
    let stub = StubService::start().await;
    let client = client_for(&stub);

    let too_big = UploadFile::new("resume.pdf", vec![0; 2048]);
    let err = Workspace::upload(&client, &UploadPolicy::new(1024), &too_big)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidUpload(_)));

    let wrong_type = UploadFile::new("resume.txt", vec![0; 10]);
    assert!(Workspace::upload(&client, &UploadPolicy::default(), &wrong_type)
        .await
        .is_err());

    assert!(stub.state.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_extracted_text_blocks_actions() {
    let stub = StubService::start_with(
        StubConfig::default().body("/upload", json!({ "cv_id": "abc", "extracted_text": "" })),
    )
    .await;
    let client = client_for(&stub);
    let mut workspace = uploaded(&stub, &client).await;

    let err = workspace.run(&client, CvAction::Score).await.unwrap_err();
    assert!(matches!(err, ClientError::MissingInput("cv text")));
    assert!(stub.state.requests_to("/score").is_empty());
}
