use anyhow::Context;
use dashboard_core::DashboardConfig;
use std::io;
use store_client::Fetcher;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};
use views::{DashboardShell, JsonSurface};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG wins over the config file's filter
    let filter_from_env = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    let initial = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DashboardConfig::default().log_filter));
    let (filter, filter_handle) = reload::Layer::new(initial);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let config = DashboardConfig::load().context("failed to load dashboard configuration")?;
    if !filter_from_env {
        filter_handle
            .reload(EnvFilter::new(&config.log_filter))
            .context("failed to apply configured log filter")?;
    }

    tracing::info!("Starting scraper dashboard");

    let source = store_client::connect(&config.store).context("failed to set up data source")?;
    let fetcher = Fetcher::new(source);
    let shell = DashboardShell::from_config(fetcher.clone(), &config);

    let mut surface = JsonSurface::new(io::stdout().lock());
    shell.show_all(&mut surface).await?;

    let metrics = fetcher.metrics().get_metrics().await;
    tracing::info!(
        "Rendered all views with {} fetches ({} failed, {} rows)",
        metrics.total_fetches,
        metrics.failed_fetches,
        metrics.rows_fetched
    );

    Ok(())
}
