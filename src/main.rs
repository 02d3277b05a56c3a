use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use proxy_harvest::{
    proxy::checker::validate_test_url, CheckerConfig, Config, CrawlerConfig, Pipeline,
    PipelineConfig, ProxyChecker, ProxyCrawler, ReportFormat, ReportWriter, Result,
    SourceCatalog, UserAgentPool,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Scrape proxy listings, check every proxy live and classify its anonymity
#[derive(Parser)]
#[command(name = "proxy-harvest")]
#[command(about = "Scrape proxy listings, check every proxy live and classify its anonymity")]
struct Cli {
    /// File with one user agent per line
    #[arg(short = 'a', long, default_value = "useragents.txt")]
    user_agents: String,
    /// JSON file mapping source names to listing URLs
    #[arg(short, long, default_value = "ProxyList.json")]
    sources: String,
    /// Report output file
    #[arg(short, long, default_value = "validated_proxies.txt")]
    output: String,
    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
    /// Maximum number of proxies validated at once
    #[arg(short = 'n', long, default_value = "64")]
    max_in_flight: usize,
    /// Timeout in seconds for fetching a listing page
    #[arg(long, default_value = "15")]
    fetch_timeout: u64,
    /// Timeout in seconds for validating a proxy
    #[arg(long, default_value = "5")]
    validate_timeout: u64,
    /// URL requested through each proxy; should echo request headers
    #[arg(long, default_value = "http://httpbin.org/headers")]
    test_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("proxy_harvest", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let config = Config {
        user_agents_path: cli.user_agents,
        sources_path: cli.sources,
        output_path: cli.output,
        report_format: cli.format,
    };

    let user_agents = UserAgentPool::load(&config.user_agents_path)
        .context("Error loading user agents")?;
    if user_agents.is_empty() {
        warn!("User agent list {} is empty", config.user_agents_path);
    }
    let catalog = SourceCatalog::load(&config.sources_path).context("Error loading proxy sources")?;
    validate_test_url(&cli.test_url)?;
    info!(
        "Loaded {} user agents and {} sources",
        user_agents.len(),
        catalog.len()
    );

    let user_agents = Arc::new(user_agents);
    let crawler = ProxyCrawler::with_config(
        CrawlerConfig::new().with_timeout(Duration::from_secs(cli.fetch_timeout)),
        Arc::clone(&user_agents),
    )?;
    let checker = ProxyChecker::with_config(
        CheckerConfig::new()
            .with_timeout(Duration::from_secs(cli.validate_timeout))
            .with_test_url(cli.test_url),
        user_agents,
    );
    let pipeline = Pipeline::new(
        PipelineConfig::new().with_max_in_flight(cli.max_in_flight),
        Arc::new(catalog),
        crawler,
        checker,
    );

    let mut report = ReportWriter::create(&config.output_path, config.report_format)
        .await
        .with_context(|| format!("Failed to create output file {}", config.output_path))?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing proxies already being checked");
            let _ = cancel_tx.send(true);
        }
    });

    let summary = pipeline.run(&mut report, cancel_rx).await?;

    println!(
        "Checked {} proxies: {} alive, {} dead. Report written to {}",
        summary.validated(),
        summary.alive,
        summary.dead,
        config.output_path
    );

    Ok(())
}
