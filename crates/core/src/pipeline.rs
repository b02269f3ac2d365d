//! Orchestrates the list → fetch → classify → generate → commit loop.

use crate::classifier::{self, Classification};
use crate::config::AppConfig;
use crate::naming;
use anyhow::Context;
use providers::anthropic::{AnthropicClient, AnthropicConfig};
use providers::drive::{DriveClient, DriveConfig};
use providers::github::{GitHubClient, GitHubConfig};
use providers::{CodeGenerator, FileStore, GenerateRequest, RemoteFile, RepoWriter};
use serde::Serialize;
use tracing::{info, warn};

/// Parameters for one conversion run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub folder_id: String,
    pub repository: String,
    pub target_dir: String,
    pub instruction: String,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct PipelineSummary {
    pub found: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Callback receiving human-readable progress lines. Fire-and-forget; the
/// pipeline never waits on it.
pub type LogSink = dyn Fn(&str) + Send + Sync;

/// Assemble the concrete clients from configuration and run the pipeline.
pub async fn run(
    cfg: &AppConfig,
    request: &RunRequest,
    sink: &LogSink,
) -> anyhow::Result<PipelineSummary> {
    let store = build_store(cfg);
    let generator = build_generator(cfg);
    let repo = build_repo(cfg);
    run_with_clients(&store, &generator, &repo, request, sink).await
}

/// Process every listed file sequentially. A listing failure aborts the
/// run; a failure on an individual file is reported through the sink and
/// does not stop the remaining files from being attempted.
pub async fn run_with_clients(
    store: &dyn FileStore,
    generator: &dyn CodeGenerator,
    repo: &dyn RepoWriter,
    request: &RunRequest,
    sink: &LogSink,
) -> anyhow::Result<PipelineSummary> {
    let files = store
        .list_eligible_files(&request.folder_id)
        .await
        .context("listing folder tree")?;

    let mut summary = PipelineSummary {
        found: files.len(),
        ..Default::default()
    };
    info!(count = files.len(), folder = %request.folder_id, "Listing complete");
    sink(&format!("Found {} files to process.", files.len()));

    for file in &files {
        sink(&format!("Processing {}...", file.name));
        match convert_one(store, generator, repo, request, file).await {
            Ok(Outcome::Committed(path)) => {
                summary.converted += 1;
                sink(&format!(
                    "{path} converted and pushed to {}.",
                    request.repository
                ));
            }
            Ok(Outcome::Skipped) => {
                summary.skipped += 1;
                sink(&format!(
                    "{} is not a recognized image or text file, skipping.",
                    file.name
                ));
            }
            Err(err) => {
                summary.failed += 1;
                warn!(file = %file.name, error = %err, "Conversion failed");
                sink(&format!("Failed to process {}: {err:#}", file.name));
            }
        }
    }

    sink(&format!(
        "Run complete: {} converted, {} skipped, {} failed.",
        summary.converted, summary.skipped, summary.failed
    ));
    Ok(summary)
}

enum Outcome {
    Committed(String),
    Skipped,
}

async fn convert_one(
    store: &dyn FileStore,
    generator: &dyn CodeGenerator,
    repo: &dyn RepoWriter,
    request: &RunRequest,
    file: &RemoteFile,
) -> anyhow::Result<Outcome> {
    let content = store.download(&file.id).await.context("downloading file")?;

    let classification = classifier::classify(&content);
    if classification == Classification::Unknown {
        return Ok(Outcome::Skipped);
    }

    let source = generator
        .generate(GenerateRequest {
            file_name: &file.name,
            instruction: &request.instruction,
            content: &content,
            image_media_type: classification.image_media_type(),
        })
        .await
        .context("generating component")?;

    let path = naming::destination_path(&request.target_dir, &file.name);
    repo.commit_file(&request.repository, &path, &source)
        .await
        .context("committing to repository")?;
    Ok(Outcome::Committed(path))
}

pub fn build_store(cfg: &AppConfig) -> DriveClient {
    DriveClient::new(DriveConfig {
        access_token: cfg.storage.access_token.clone(),
        base_url: cfg.storage.base_url.clone(),
    })
}

pub fn build_generator(cfg: &AppConfig) -> AnthropicClient {
    AnthropicClient::new(AnthropicConfig {
        api_key: cfg.ai.api_key.clone(),
        base_url: cfg.ai.base_url.clone(),
        model: cfg.ai.model.clone(),
        max_tokens: cfg.ai.max_tokens,
    })
}

pub fn build_repo(cfg: &AppConfig) -> GitHubClient {
    GitHubClient::new(GitHubConfig {
        token: cfg.repo.token.clone(),
        owner: cfg.repo.owner.clone(),
        base_url: cfg.repo.base_url.clone(),
    })
}
