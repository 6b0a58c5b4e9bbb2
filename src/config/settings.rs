use crate::config::toml_config::FileConfig;
use crate::core::listing::SEACE_URL;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_concurrent_scrapes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_concurrent_scrapes: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowserSettings {
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub no_sandbox: bool,
    pub extra_args: Vec<String>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub user_agent: String,
    /// Upper bound for a single CDP command
    pub request_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            no_sandbox: true,
            extra_args: vec![
                "--disable-gpu".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
            viewport_width: 1920,
            viewport_height: 1080,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(90),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScraperSettings {
    pub base_url: String,
    pub max_pages: usize,
    pub page_size: u32,
    pub navigation_timeout: Duration,
    pub results_timeout: Duration,
    pub page_size_timeout: Duration,
    pub next_page_timeout: Duration,
    pub detail_navigation_timeout: Duration,
    pub detail_ready_timeout: Duration,
    pub page_delay: Duration,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: SEACE_URL.to_string(),
            max_pages: 50,
            page_size: 100,
            navigation_timeout: Duration::from_secs(90),
            results_timeout: Duration::from_secs(60),
            page_size_timeout: Duration::from_secs(30),
            next_page_timeout: Duration::from_secs(45),
            detail_navigation_timeout: Duration::from_secs(25),
            detail_ready_timeout: Duration::from_secs(10),
            page_delay: Duration::from_millis(1500),
        }
    }
}

/// Fully resolved configuration: defaults, then the TOML file, then CLI/env.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub browser: BrowserSettings,
    pub scraper: ScraperSettings,
    pub monitoring: bool,
    pub log_format: LogFormat,
}

impl Settings {
    /// Defaults overlaid with the optional TOML file.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut settings = Settings::default();
        if let Some(path) = config_path {
            let file = FileConfig::from_file(path)?;
            settings.apply_file(&file);
        }
        Ok(settings)
    }

    pub fn apply_file(&mut self, file: &FileConfig) {
        if let Some(server) = &file.server {
            set(&mut self.server.host, server.host.clone());
            set(&mut self.server.port, server.port);
            set(&mut self.server.max_concurrent_scrapes, server.max_concurrent_scrapes);
        }

        if let Some(browser) = &file.browser {
            if browser.chrome_path.is_some() {
                self.browser.chrome_path = browser.chrome_path.clone();
            }
            set(&mut self.browser.headless, browser.headless);
            set(&mut self.browser.no_sandbox, browser.no_sandbox);
            set(&mut self.browser.extra_args, browser.extra_args.clone());
            set(&mut self.browser.viewport_width, browser.viewport_width);
            set(&mut self.browser.viewport_height, browser.viewport_height);
            set(&mut self.browser.user_agent, browser.user_agent.clone());
            set(&mut self.browser.request_timeout, browser.request_timeout_secs.map(Duration::from_secs));
        }

        if let Some(scraper) = &file.scraper {
            let s = &mut self.scraper;
            set(&mut s.base_url, scraper.base_url.clone());
            set(&mut s.max_pages, scraper.max_pages);
            set(&mut s.page_size, scraper.page_size);
            set(&mut s.navigation_timeout, scraper.navigation_timeout_secs.map(Duration::from_secs));
            set(&mut s.results_timeout, scraper.results_timeout_secs.map(Duration::from_secs));
            set(&mut s.page_size_timeout, scraper.page_size_timeout_secs.map(Duration::from_secs));
            set(&mut s.next_page_timeout, scraper.next_page_timeout_secs.map(Duration::from_secs));
            set(
                &mut s.detail_navigation_timeout,
                scraper.detail_navigation_timeout_secs.map(Duration::from_secs),
            );
            set(
                &mut s.detail_ready_timeout,
                scraper.detail_ready_timeout_secs.map(Duration::from_secs),
            );
            set(&mut s.page_delay, scraper.page_delay_ms.map(Duration::from_millis));
        }

        if let Some(monitoring) = &file.monitoring {
            set(&mut self.monitoring, monitoring.enabled);
            set(&mut self.log_format, monitoring.log_format);
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_positive_number(
            "server.max_concurrent_scrapes",
            self.server.max_concurrent_scrapes,
            1,
        )?;

        validate_range("browser.viewport_width", self.browser.viewport_width, 320, 7680)?;
        validate_range("browser.viewport_height", self.browser.viewport_height, 240, 4320)?;
        validate_non_empty_string("browser.user_agent", &self.browser.user_agent)?;
        if let Some(path) = &self.browser.chrome_path {
            crate::utils::validation::validate_path(
                "browser.chrome_path",
                &path.to_string_lossy(),
            )?;
        }

        validate_url("scraper.base_url", &self.scraper.base_url)?;
        validate_positive_number("scraper.max_pages", self.scraper.max_pages, 1)?;
        validate_range("scraper.page_size", self.scraper.page_size, 1, 1000)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_seace_behaviour() {
        let settings = Settings::default();
        assert_eq!(settings.bind_address(), "0.0.0.0:8000");
        assert_eq!(settings.scraper.max_pages, 50);
        assert_eq!(settings.scraper.page_size, 100);
        assert_eq!(settings.scraper.page_delay, Duration::from_millis(1500));
        assert!(settings.browser.headless);
        assert!(settings.browser.no_sandbox);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_only_present_fields() {
        let file = FileConfig::from_toml_str(
            r#"
[server]
port = 9000

[scraper]
max_pages = 3
page_delay_ms = 0

[monitoring]
enabled = true
log_format = "json"
"#,
        )
        .unwrap();

        let mut settings = Settings::default();
        settings.apply_file(&file);

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.scraper.max_pages, 3);
        assert_eq!(settings.scraper.page_delay, Duration::ZERO);
        assert_eq!(settings.scraper.results_timeout, Duration::from_secs(60));
        assert!(settings.monitoring);
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn test_validation_rejects_zero_pages() {
        let mut settings = Settings::default();
        settings.scraper.max_pages = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_http_base_url() {
        let mut settings = Settings::default();
        settings.scraper.base_url = "file:///tmp/seace.html".to_string();
        assert!(settings.validate().is_err());
    }
}
