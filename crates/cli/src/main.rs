use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use converter_core::config::{self, AppConfig};
use converter_core::pipeline::{self, RunRequest};
use providers::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            folder_id,
            repo,
            dir,
            instruction,
            json,
        } => run_pipeline(cfg, folder_id, repo, dir, instruction, json).await,
        Commands::List { folder_id } => run_list(cfg, folder_id).await,
    }
}

#[derive(Parser)]
#[command(name = "drive-converter")]
#[command(about = "Convert Drive mockups into Next.js components pushed to GitHub", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every eligible file in the folder tree and push the results
    Run {
        /// Source folder id (overrides config)
        #[arg(long)]
        folder_id: Option<String>,
        /// Target repository name (overrides config)
        #[arg(long)]
        repo: Option<String>,
        /// Directory inside the repository for generated files
        #[arg(long)]
        dir: Option<String>,
        /// Instruction text sent to the model
        #[arg(long)]
        instruction: Option<String>,
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// List the eligible files in the folder tree without converting
    List {
        /// Source folder id (overrides config)
        #[arg(long)]
        folder_id: Option<String>,
    },
}

async fn run_pipeline(
    cfg: AppConfig,
    folder_id: Option<String>,
    repo: Option<String>,
    dir: Option<String>,
    instruction: Option<String>,
    json: bool,
) -> Result<()> {
    let request = build_request(&cfg, folder_id, repo, dir, instruction)?;
    let sink = |line: &str| println!("{line}");
    let summary = pipeline::run(&cfg, &request, &sink).await?;

    if json {
        let summary_json = serde_json::json!({
            "status": "ok",
            "found": summary.found,
            "converted": summary.converted,
            "skipped": summary.skipped,
            "failed": summary.failed,
        });
        println!("{}", serde_json::to_string_pretty(&summary_json)?);
    }
    Ok(())
}

async fn run_list(cfg: AppConfig, folder_id: Option<String>) -> Result<()> {
    let Some(folder_id) = folder_id.or_else(|| cfg.run.folder_id.clone()) else {
        bail!("no folder id given (--folder-id or run.folder_id in config)");
    };

    let store = pipeline::build_store(&cfg);
    let files = store.list_eligible_files(&folder_id).await?;
    println!("{} eligible files", files.len());
    for file in &files {
        println!("{}\t{}\t{}", file.id, file.mime_type, file.name);
    }
    Ok(())
}

fn build_request(
    cfg: &AppConfig,
    folder_id: Option<String>,
    repo: Option<String>,
    dir: Option<String>,
    instruction: Option<String>,
) -> Result<RunRequest> {
    let Some(folder_id) = folder_id.or_else(|| cfg.run.folder_id.clone()) else {
        bail!("no folder id given (--folder-id or run.folder_id in config)");
    };
    let Some(repository) = repo.or_else(|| cfg.run.repository.clone()) else {
        bail!("no repository given (--repo or run.repository in config)");
    };
    let target_dir = dir.or_else(|| cfg.run.target_dir.clone()).unwrap_or_default();
    let instruction = instruction
        .or_else(|| cfg.run.instruction.clone())
        .unwrap_or_default();

    Ok(RunRequest {
        folder_id,
        repository,
        target_dir,
        instruction,
    })
}
