use crate::utils::error::{Result, ScrapeError};
use crate::utils::logger::LogFormat;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"));

/// On-disk configuration. Every section and key is optional; missing values
/// keep their built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub server: Option<ServerSection>,
    pub browser: Option<BrowserSection>,
    pub scraper: Option<ScraperSection>,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_concurrent_scrapes: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrowserSection {
    pub chrome_path: Option<PathBuf>,
    pub headless: Option<bool>,
    pub no_sandbox: Option<bool>,
    pub extra_args: Option<Vec<String>>,
    pub viewport_width: Option<u32>,
    pub viewport_height: Option<u32>,
    pub user_agent: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScraperSection {
    pub base_url: Option<String>,
    pub max_pages: Option<usize>,
    pub page_size: Option<u32>,
    pub navigation_timeout_secs: Option<u64>,
    pub results_timeout_secs: Option<u64>,
    pub page_size_timeout_secs: Option<u64>,
    pub next_page_timeout_secs: Option<u64>,
    pub detail_navigation_timeout_secs: Option<u64>,
    pub detail_ready_timeout_secs: Option<u64>,
    pub page_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitoringSection {
    pub enabled: Option<bool>,
    pub log_format: Option<LogFormat>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ScrapeError::ConfigError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| ScrapeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}

/// Replaces `${VAR}` with the variable's value; unset variables stay verbatim.
fn substitute_env_vars(content: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let config = FileConfig::from_toml_str(
            r#"
[server]
host = "127.0.0.1"
port = 8080
max_concurrent_scrapes = 1

[browser]
chrome_path = "/usr/local/bin/chromium"
headless = true
extra_args = ["--disable-gpu"]
request_timeout_secs = 60

[scraper]
base_url = "https://prod6.seace.gob.pe/buscador-publico/contrataciones"
max_pages = 10
page_delay_ms = 500

[monitoring]
enabled = true
log_format = "compact"
"#,
        )
        .unwrap();

        let server = config.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(8080));
        let browser = config.browser.unwrap();
        assert_eq!(
            browser.chrome_path,
            Some(PathBuf::from("/usr/local/bin/chromium"))
        );
        assert_eq!(config.scraper.unwrap().max_pages, Some(10));
        assert_eq!(config.monitoring.unwrap().log_format, Some(LogFormat::Compact));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = FileConfig::from_toml_str("").unwrap();
        assert!(config.server.is_none());
        assert!(config.scraper.is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SEACE_TEST_CHROME_PATH", "/opt/chrome/chrome");

        let config = FileConfig::from_toml_str(
            r#"
[browser]
chrome_path = "${SEACE_TEST_CHROME_PATH}"
user_agent = "${SEACE_TEST_UNSET_VARIABLE}"
"#,
        )
        .unwrap();

        let browser = config.browser.unwrap();
        assert_eq!(browser.chrome_path, Some(PathBuf::from("/opt/chrome/chrome")));
        assert_eq!(
            browser.user_agent.as_deref(),
            Some("${SEACE_TEST_UNSET_VARIABLE}")
        );

        std::env::remove_var("SEACE_TEST_CHROME_PATH");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = FileConfig::from_toml_str("[scraper]\nmax_paginas = 3\n").unwrap_err();
        assert!(matches!(err, ScrapeError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 8123\n")
            .unwrap();

        let config = FileConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.unwrap().port, Some(8123));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = FileConfig::from_file("/nonexistent/seace.toml").unwrap_err();
        assert!(matches!(err, ScrapeError::ConfigError { .. }));
    }
}
