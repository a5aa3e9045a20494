use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stackbulk::config::{validate_max_concurrency, AppConfig};

#[derive(Parser)]
#[command(name = "stackbulk", about = "Bulk-update Spacelift Terraform stacks")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Log the planned update for each stack without sending it
    #[arg(long)]
    dry_run: bool,

    /// Maximum number of updates in flight (default: unbounded)
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Exit with an error when any stack failed to update
    #[arg(long)]
    fail_on_error: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(limit) = cli.max_concurrency {
        config.execution.max_concurrency = Some(validate_max_concurrency(limit)?);
    }

    tracing::info!(
        domain = %config.spacelift.domain,
        overlay = ?config.overlay,
        "Starting bulk update"
    );

    let summary = stackbulk::runner::run(&config, cli.dry_run).await?;

    println!("\n{summary}");

    if cli.fail_on_error && summary.has_failures() {
        anyhow::bail!("{} stacks failed to update", summary.failure_count);
    }

    Ok(())
}
