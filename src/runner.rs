use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::bulk::{self, ExecuteOptions};
use crate::config::AppConfig;
use crate::error::Result;
use crate::report::{self, RunSummary};
use crate::spacelift::graphql::GraphQlClient;
use crate::spacelift::{Session, StackApi};

/// Authenticate, list, update every Terraform stack and summarize.
///
/// Configuration, authentication and listing errors abort the run. Update
/// failures only show up in the returned summary.
pub async fn run(config: &AppConfig, dry_run: bool) -> Result<RunSummary> {
    let started_at = Utc::now();
    let clock = Instant::now();

    let client = GraphQlClient::new(
        &config.spacelift.endpoint(),
        Duration::from_secs(config.execution.request_timeout_secs),
    )?;

    tracing::info!(endpoint = %client.endpoint(), "Authenticating with Spacelift");
    let session = Session::authenticate(
        client,
        &config.spacelift.api_key_id,
        config.api_key_secret(),
    )
    .await?;
    tracing::info!("Authentication successful");

    let options = ExecuteOptions {
        max_concurrency: config.execution.max_concurrency,
        dry_run,
    };

    update_all(Arc::new(session), config, options, started_at, clock).await
}

/// List stacks through `api` and update the eligible ones.
///
/// `started_at` and `clock` mark the beginning of the run; the summary's
/// elapsed time is measured from `clock`.
pub async fn update_all(
    api: Arc<dyn StackApi>,
    config: &AppConfig,
    options: ExecuteOptions,
    started_at: DateTime<Utc>,
    clock: Instant,
) -> Result<RunSummary> {
    tracing::info!("Retrieving all stacks");
    let stacks = api.list_stacks().await?;
    let eligible = stacks.iter().filter(|s| bulk::is_terraform(s)).count();
    tracing::info!(
        stacks = stacks.len(),
        eligible = eligible,
        "Retrieved stacks"
    );

    if config.overlay.is_empty() {
        tracing::warn!("No overrides configured; stacks will be re-submitted unchanged");
    }

    let overlay = Arc::new(config.overlay.clone());
    let outcomes = bulk::execute(stacks, bulk::is_terraform, overlay, api, options).await;

    let mut summary = report::aggregate(outcomes, started_at, clock.elapsed());
    summary.dry_run = options.dry_run;

    if summary.has_failures() {
        tracing::warn!(
            failed = summary.failure_count,
            "Some stacks failed to update"
        );
    }

    Ok(summary)
}
