// src/cli.rs
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::AnalyzerConfig;
use crate::core::{ServiceClient, UploadFile, UploadPolicy};
use crate::dashboard::{self, DashboardStats, ScoreRating};
use crate::types::cv_data::Cv;
use crate::utils::format_size;
use crate::workspace::{CvAction, Workspace};

#[derive(Parser)]
#[command(name = "cv-analyzer")]
#[command(about = "Upload a CV and analyze it against a job description", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Analysis service base URL (overrides config and CV_ANALYZER_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

/// Inputs shared by every job-description action
#[derive(Args)]
pub struct ActionArgs {
    /// CV id returned by `upload`
    #[arg(long)]
    pub cv_id: String,
    /// File holding the CV text
    #[arg(long)]
    pub cv_text: PathBuf,
    /// File holding the job description
    #[arg(long)]
    pub job: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload a PDF/DOC/DOCX file and show the extracted text
    Upload { file: PathBuf },
    /// ATS score and keyword match against a job description
    Score(ActionArgs),
    /// Rewrite the CV for a job description
    Rewrite(ActionArgs),
    /// Generate a cover letter
    CoverLetter(ActionArgs),
    /// Generate interview questions and tips
    InterviewPrep(ActionArgs),
    /// List available formatting templates
    Templates,
    /// Format CV text with a template
    ApplyTemplate {
        template_name: String,
        #[arg(long)]
        cv_text: PathBuf,
    },
    /// List uploaded CVs with dashboard stats
    List {
        /// Keep only CVs whose title or file name contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one CV
    Show { cv_id: String },
    /// Delete one CV
    Delete { cv_id: String },
    /// Upload a file and run every analysis concurrently
    Analyze {
        file: PathBuf,
        #[arg(long)]
        job: PathBuf,
        /// Also format the extracted text with this template
        #[arg(long)]
        template: Option<String>,
    },
}

pub async fn handle_command(cli: Cli, mut config: AnalyzerConfig) -> Result<()> {
    if let Some(url) = cli.api_url {
        config = config.with_api_base_url(url);
    }

    let client = ServiceClient::from_config(&config)?;
    let policy = UploadPolicy::from_config(&config);
    let json = cli.json;

    info!("Using analysis service at {}", client.base_url());

    match cli.command {
        Command::Upload { file } => {
            let upload = UploadFile::from_path(&file).await?;
            let workspace = Workspace::upload(&client, &policy, &upload)
                .await
                .context("Failed to upload file. Please try again.")?;
            print_cv(workspace.cv(), json)?;
        }

        Command::Score(args) => run_single(&client, args, CvAction::Score, json).await?,
        Command::Rewrite(args) => run_single(&client, args, CvAction::Rewrite, json).await?,
        Command::CoverLetter(args) => {
            run_single(&client, args, CvAction::CoverLetter, json).await?
        }
        Command::InterviewPrep(args) => {
            run_single(&client, args, CvAction::InterviewPrep, json).await?
        }

        Command::Templates => {
            let templates = client.list_templates().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&templates)?);
            } else if templates.is_empty() {
                println!("No templates available.");
            } else {
                for name in templates {
                    println!("{}", name);
                }
            }
        }

        Command::ApplyTemplate {
            template_name,
            cv_text,
        } => {
            let text = read_text(&cv_text).await?;
            let formatted = client.apply_template(&template_name, &text).await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "formatted_cv": formatted }))?
                );
            } else {
                println!("{}", formatted);
            }
        }

        Command::List { search } => {
            let cvs = client.list_cvs().await?;
            let shown: Vec<&Cv> = match &search {
                Some(query) => dashboard::search(&cvs, query),
                None => cvs.iter().collect(),
            };
            print_listing(&cvs, &shown, json)?;
        }

        Command::Show { cv_id } => {
            let cv = client.get_cv(&cv_id).await?;
            print_cv(&cv, json)?;
        }

        Command::Delete { cv_id } => {
            let message = client.delete_cv(&cv_id).await?;
            println!(
                "{}",
                message.unwrap_or_else(|| format!("CV with ID {} deleted successfully.", cv_id))
            );
        }

        Command::Analyze {
            file,
            job,
            template,
        } => {
            let upload = UploadFile::from_path(&file).await?;
            let job_description = read_text(&job).await?;

            let mut workspace = Workspace::upload(&client, &policy, &upload)
                .await
                .context("Failed to upload file. Please try again.")?;
            workspace.set_job_description(job_description);

            let reports = workspace.run_actions(&client, &CvAction::ALL).await;

            if let Some(name) = template {
                if let Err(e) = workspace.apply_template(&client, &name).await {
                    eprintln!("⚠️  Template '{}' not applied: {}", name, e);
                }
            }

            print_cv(workspace.cv(), json)?;

            let failed: Vec<_> = reports.iter().filter(|r| r.result.is_err()).collect();
            for report in &failed {
                if let Err(e) = &report.result {
                    eprintln!("❌ {} failed: {}", report.action, e);
                }
            }
            if !failed.is_empty() {
                anyhow::bail!("{} of {} analyses failed", failed.len(), reports.len());
            }
        }
    }

    Ok(())
}

async fn run_single(
    client: &ServiceClient,
    args: ActionArgs,
    action: CvAction,
    json: bool,
) -> Result<()> {
    let cv_text = read_text(&args.cv_text).await?;
    let job_description = read_text(&args.job).await?;

    let mut workspace = Workspace::new(Cv::new(
        args.cv_id.clone(),
        args.cv_id,
        String::new(),
        0,
        cv_text,
    ));
    workspace.set_job_description(job_description);
    workspace
        .run(client, action)
        .await
        .with_context(|| format!("Failed to {} CV", action))?;

    print_cv(workspace.cv(), json)
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

fn print_cv(cv: &Cv, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(cv)?);
        return Ok(());
    }

    println!("📄 {} ({})", cv.title, cv.id);
    if !cv.file_name.is_empty() {
        println!("   File: {} ({})", cv.file_name, format_size(cv.file_size));
    }
    println!("   Uploaded: {}", cv.upload_date.format("%Y-%m-%d %H:%M"));

    if let Some(score) = cv.score.as_ready() {
        println!(
            "\n🎯 ATS Score: {}% ({})",
            score.ats_score,
            ScoreRating::from_score(score.ats_score).label()
        );
        println!("   Matched: {}", score.matched_keywords.join(", "));
        println!("   Missing: {}", score.missing_keywords.join(", "));
    }

    if let Some(analysis) = cv.analysis.as_ready() {
        println!("\n📊 Overall score: {}%", analysis.overall_score);
        print_list("Strengths", &analysis.feedback.strengths);
        print_list("Improvements", &analysis.feedback.improvements);
        print_list("Suggestions", &analysis.feedback.suggestions);
    }

    if let Some(text) = cv.rewritten_cv() {
        println!("\n✏️  Rewritten CV:\n{}", text);
    }

    if let Some(text) = cv.cover_letter() {
        println!("\n✉️  Cover letter:\n{}", text);
    }

    if let Some(prep) = cv.interview_prep.as_ready() {
        println!("\n🎤 Interview prep ({} questions)", prep.question_count());
        print_list("Technical", &prep.technical_questions);
        print_list("Behavioral", &prep.behavioral_questions);
        print_list("Tips", &prep.tips);
    }

    if cv.content != cv.extracted_text {
        println!("\n📝 Formatted CV:\n{}", cv.content);
    } else if !cv.score.is_ready() && !cv.rewritten_cv.is_ready() {
        println!("\n{}", cv.extracted_text);
    }

    Ok(())
}

fn print_list(heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("   {}:", heading);
    for item in items {
        println!("   • {}", item);
    }
}

fn print_listing(all: &[Cv], shown: &[&Cv], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    let stats = DashboardStats::from_cvs(all);
    println!(
        "Total CVs: {}  Analyzed: {}  Avg Score: {}%",
        stats.total_cvs, stats.analyzed_cvs, stats.average_score
    );

    let latest: Vec<&str> = dashboard::recent(all)
        .iter()
        .map(|cv| cv.title.as_str())
        .collect();
    if !latest.is_empty() {
        println!("Recent: {}", latest.join(", "));
    }

    if shown.is_empty() {
        println!("No CVs found.");
        return Ok(());
    }

    println!("{:<38} {:<30} {:<25} {:>6}", "ID", "Title", "File", "ATS");
    println!("{}", "-".repeat(102));
    for cv in shown {
        let ats = cv
            .ats_score()
            .map(|s| format!("{}%", s))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<38} {:<30} {:<25} {:>6}",
            cv.id, cv.title, cv.file_name, ats
        );
    }

    Ok(())
}
