use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use ranker_core::{DashboardView, StageStatus, UploadFile};
use ranker_engine::{CredentialSource, Orchestrator, ReqwestJobService, StaticCredentials};
use ranker_logging::{ranker_info, ranker_warn};

use crate::cli::Cli;
use crate::config::{self, FileConfig, Overrides};
use crate::render;

/// How the ranking session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ranked,
    Failed,
}

async fn read_upload(path: &Path) -> Result<UploadFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    Ok(UploadFile::new(name, bytes))
}

fn batch_settled(view: &DashboardView) -> bool {
    match view.batch.status {
        StageStatus::Failed => true,
        // The first page fetch always ends in a banner, loaded or failed.
        StageStatus::Ready => view.banner.is_some(),
        _ => false,
    }
}

fn print(view: &DashboardView, page_size: usize) {
    print!("{}", render::render(view, page_size, &Local::now()));
}

pub async fn run(cli: Cli) -> Result<Outcome> {
    let file_config = FileConfig::load(&cli.config)?;
    let (service_settings, orchestrator_settings) = config::resolve(
        &file_config,
        Overrides {
            cli_api_url: cli.api_url.clone(),
            env_api_url: env::var(config::API_URL_ENV).ok(),
            poll_interval_secs: cli.poll_interval_secs,
        },
    )?;

    let credentials = Arc::new(StaticCredentials::new(env::var(config::TOKEN_ENV).ok()));
    if !credentials.is_authorized() {
        bail!(
            "not signed in: set {} to a bearer token for the job service",
            config::TOKEN_ENV
        );
    }

    let requirement = read_upload(&cli.requirements).await?;
    let batch = read_upload(&cli.batch).await?;

    ranker_info!("using job service at {}", service_settings.base_url);
    let service = ReqwestJobService::new(service_settings, credentials)
        .context("failed to build job service client")?;
    let orchestrator = Orchestrator::spawn(Arc::new(service), orchestrator_settings);

    let outcome = drive(&orchestrator, requirement, batch, cli.page).await;
    orchestrator.shutdown().await;
    Ok(outcome)
}

async fn drive(
    orchestrator: &Orchestrator,
    requirement: UploadFile,
    batch: UploadFile,
    page: u32,
) -> Outcome {
    orchestrator.submit_requirement(requirement);
    let view = orchestrator
        .wait_until(|view| view.requirement.status.is_terminal())
        .await;
    if view.requirement.status != StageStatus::Ready {
        print(&view, 0);
        return Outcome::Failed;
    }
    ranker_info!(
        "requirement ready: {}",
        view.title.as_deref().unwrap_or_default()
    );

    orchestrator.submit_batch(batch);
    let view = orchestrator.wait_until(batch_settled).await;
    if view.batch.status != StageStatus::Ready
        || view.banner.as_ref().is_some_and(|banner| banner.is_error())
    {
        print(&view, 0);
        return Outcome::Failed;
    }

    // Page 1 is fetched on completion; its length is the page size.
    let page_size = view.results.len().max(1);
    if page <= 1 {
        print(&view, page_size);
        return Outcome::Ranked;
    }

    orchestrator.request_page(page);
    let view = orchestrator
        .wait_until(|view| {
            view.current_page == page
                || view.banner.as_ref().is_some_and(|banner| banner.is_error())
        })
        .await;
    print(&view, page_size);
    if view.current_page == page {
        Outcome::Ranked
    } else {
        ranker_warn!("page {} could not be loaded", page);
        Outcome::Failed
    }
}
