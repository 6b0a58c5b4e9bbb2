use clap::Parser;
use seace_scraper::adapters::http::probe_health;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "seace-healthcheck")]
#[command(about = "Exit 0 when the scraper API answers GET / with status ok")]
struct Args {
    #[arg(long, env = "SEACE_HEALTHCHECK_URL", default_value = "http://127.0.0.1:8000/")]
    url: String,

    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    match probe_health(&args.url, Duration::from_secs(args.timeout_secs)).await {
        Ok(()) => println!("ok"),
        Err(e) => {
            eprintln!("unhealthy: {}", e);
            std::process::exit(1);
        }
    }
}
