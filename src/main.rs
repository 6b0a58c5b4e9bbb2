use anyhow::Context;
use clap::Parser;
use seace_scraper::api::{self, AppState};
use seace_scraper::utils::{logger, validation::Validate};
use seace_scraper::{build_engine, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let settings = match cli.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_logger(cli.verbose, settings.log_format);
    tracing::info!("Starting seace-scraper {}", env!("CARGO_PKG_VERSION"));
    if cli.verbose {
        tracing::debug!("Resolved settings: {:?}", settings);
    }

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if settings.monitoring {
        tracing::info!("🔍 System monitoring enabled");
    }

    let engine = build_engine(&settings).context("failed to initialise scrape engine")?;
    let router = api::create_router(AppState::new(engine));

    let addr = settings.bind_address();
    api::serve(router, &addr, api::shutdown_signal())
        .await
        .with_context(|| format!("server on {} failed", addr))?;

    tracing::info!("Server stopped");
    Ok(())
}
