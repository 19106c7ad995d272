//! lxp-feedback - operator tool for learner feedback
//!
//! Opens the LXP database under the resolved root folder and drives the
//! feedback service:
//! - `submit-quiz` / `submit-topic`: submit a JSON array of responses
//!   (fail-fast: stops at the first rejected item)
//! - `quiz-status` / `topic-status`: print a learner's completion status

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lxp_common::config::{RootFolderInitializer, RootFolderResolver};
use lxp_feedback::{
    FeedbackResponseService, QuizFeedbackSubmission, SqliteFeedbackRepository, Submission,
    TopicFeedbackSubmission,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const MODULE_NAME: &str = "feedback";

#[derive(Parser)]
#[command(name = "lxp-feedback", version, about = "Submit and inspect learner feedback")]
struct Cli {
    /// Root folder holding lxp.db (overrides LXP_ROOT_FOLDER and config file)
    #[arg(long)]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit quiz feedback responses from a JSON array file
    SubmitQuiz {
        #[arg(long)]
        file: PathBuf,
    },
    /// Submit topic feedback responses from a JSON array file
    SubmitTopic {
        #[arg(long)]
        file: PathBuf,
    },
    /// Show whether a learner completed a quiz's feedback
    QuizStatus {
        #[arg(long)]
        learner: Uuid,
        #[arg(long)]
        quiz: Uuid,
    },
    /// Show whether a learner completed a topic's feedback
    TopicStatus {
        #[arg(long)]
        learner: Uuid,
        #[arg(long)]
        topic: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolver = RootFolderResolver::new(MODULE_NAME).with_cli_arg(cli.root_folder.clone());
    let config = resolver.load_config();

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting LXP feedback tool (lxp-feedback) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let initializer = RootFolderInitializer::new(resolver.resolve_with_config(&config));
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = lxp_common::db::init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let service = FeedbackResponseService::with_settings(
        SqliteFeedbackRepository::new(pool),
        &config.feedback,
    );

    match cli.command {
        Command::SubmitQuiz { file } => {
            let mut submissions: Vec<QuizFeedbackSubmission> = read_submissions(&file)?;
            let result = service.submit_quiz_feedback_batch(&mut submissions).await;
            report_batch(&submissions, result)
        }
        Command::SubmitTopic { file } => {
            let mut submissions: Vec<TopicFeedbackSubmission> = read_submissions(&file)?;
            let result = service.submit_topic_feedback_batch(&mut submissions).await;
            report_batch(&submissions, result)
        }
        Command::QuizStatus { learner, quiz } => {
            let status = service.quiz_feedback_status(learner, quiz).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Command::TopicStatus { learner, topic } => {
            let status = service.topic_feedback_status(learner, topic).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
    }
}

fn read_submissions<S: DeserializeOwned>(path: &Path) -> Result<Vec<S>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse submissions in {}", path.display()))
}

/// Print the submissions (with resolved container ids) and the outcome
fn report_batch<S: Submission + Serialize>(
    submissions: &[S],
    result: lxp_feedback::FeedbackResult<()>,
) -> Result<()> {
    let accepted = submissions
        .iter()
        .take_while(|s| s.container_id().is_some())
        .count();

    println!("{}", serde_json::to_string_pretty(&submissions[..accepted])?);

    match result {
        Ok(()) => {
            info!("Submitted {} feedback response(s)", accepted);
            Ok(())
        }
        Err(e) => {
            error!(
                "Stopped after {} of {} response(s): {}",
                accepted,
                submissions.len(),
                e
            );
            Err(e.into())
        }
    }
}
