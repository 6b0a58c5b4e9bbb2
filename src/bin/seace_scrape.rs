use clap::Parser;
use seace_scraper::core::export::{ExportFormat, ResultExporter, SUPPORTED_FORMATS};
use seace_scraper::domain::model::{ScrapeRequest, TenderQuery, DEFAULT_MAX_RESULTS};
use seace_scraper::utils::error::{ErrorSeverity, ScrapeError};
use seace_scraper::utils::validation::{validate_output_formats, validate_path, Validate};
use seace_scraper::utils::logger;
use seace_scraper::{build_engine, LocalStorage, Settings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seace-scrape")]
#[command(about = "Run one SEACE scrape and write the results to disk")]
struct Args {
    /// First publication date, dd/mm/yyyy
    #[arg(long)]
    from: String,

    /// Last publication date, dd/mm/yyyy
    #[arg(long)]
    to: String,

    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// Visit each tender's detail page for its CUBSO code
    #[arg(long)]
    cubso: bool,

    #[arg(short, long, env = "SEACE_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    #[arg(long, value_delimiter = ',', default_value = "json,csv")]
    formats: Vec<String>,

    #[arg(long, env = "SEACE_CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    monitor: bool,

    /// Show what would be scraped without launching a browser
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    if let Some(path) = &args.chrome_path {
        settings.browser.chrome_path = Some(path.clone());
    }
    if args.monitor {
        settings.monitoring = true;
    }
    // One-shot runs never need more than one browser
    settings.server.max_concurrent_scrapes = 1;

    logger::init_logger(args.verbose, settings.log_format);

    let prepared = prepare(&args, &settings);
    let (query, formats) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!("❌ Invalid arguments: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    display_summary(&args, &query, &settings);

    if args.dry_run {
        println!("🔍 Dry run: no browser launched, nothing written.");
        return Ok(());
    }

    let engine = build_engine(&settings)?;
    let exporter = ResultExporter::new(LocalStorage::new(args.output_dir.clone()));

    let outcome = match engine.run(&query).await {
        Ok(tenders) => exporter
            .export(&tenders, &formats)
            .await
            .map(|files| (tenders.len(), files)),
        Err(e) => Err(e),
    };

    match outcome {
        Ok((count, files)) => {
            tracing::info!("✅ Scrape completed with {} tenders", count);
            println!("✅ Scrape completed with {} tenders", count);
            for file in files {
                println!("📁 {}/{}", args.output_dir, file);
            }
        }
        Err(e) => {
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    }

    Ok(())
}

fn prepare(args: &Args, settings: &Settings) -> Result<(TenderQuery, Vec<ExportFormat>), ScrapeError> {
    settings.validate()?;
    validate_path("output_dir", &args.output_dir)?;
    validate_output_formats("formats", &args.formats, &SUPPORTED_FORMATS)?;

    let request = ScrapeRequest {
        start_date: args.from.clone(),
        end_date: args.to.clone(),
        max_results: args.max_results,
        include_cubso: args.cubso,
    };
    let query = request.to_query()?;

    let formats = args
        .formats
        .iter()
        .map(|f| f.parse::<ExportFormat>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok((query, formats))
}

fn exit_code(e: &ScrapeError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn display_summary(args: &Args, query: &TenderQuery, settings: &Settings) {
    println!("📋 Scrape Summary:");
    println!("  Source: {}", settings.scraper.base_url);
    println!("  Date range: {}", query.range);
    println!("  Max results: {}", query.max_results);
    println!("  CUBSO lookup: {}", query.include_cubso);
    println!("  Max pages: {}", settings.scraper.max_pages);
    println!("  Output: {} ({})", args.output_dir, args.formats.join(", "));
    match &settings.browser.chrome_path {
        Some(path) => println!("  Browser: {}", path.display()),
        None => println!("  Browser: auto-detect"),
    }
    println!();
}
