pub mod settings;
pub mod toml_config;

use crate::utils::logger::LogFormat;
use clap::Parser;
use settings::Settings;
use std::path::PathBuf;

/// Command-line and environment options of the HTTP service.
///
/// Every option is optional so that an unset flag never overrides a value
/// from the configuration file.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "seace-scraper")]
#[command(about = "HTTP API that scrapes SEACE procurement listings")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(long, env = "SEACE_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "SEACE_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Chromium/Chrome executable; auto-detected when unset
    #[arg(long, env = "SEACE_CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    #[arg(long, env = "SEACE_MAX_CONCURRENT_SCRAPES")]
    pub max_concurrent_scrapes: Option<usize>,

    #[arg(long, env = "SEACE_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per scrape phase")]
    pub monitor: bool,
}

impl CliConfig {
    /// Loads the configuration file (if any) and applies CLI/env overrides on top.
    pub fn resolve(&self) -> crate::utils::error::Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        self.apply_to(&mut settings);
        Ok(settings)
    }

    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(host) = &self.host {
            settings.server.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(path) = &self.chrome_path {
            settings.browser.chrome_path = Some(path.clone());
        }
        if let Some(max) = self.max_concurrent_scrapes {
            settings.server.max_concurrent_scrapes = max;
        }
        if let Some(format) = self.log_format {
            settings.log_format = format;
        }
        if self.monitor {
            settings.monitoring = true;
        }
    }
}
