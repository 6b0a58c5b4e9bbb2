use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Browser launch failed: {message}")]
    BrowserLaunchError { message: String },

    #[error("Browser error: {0}")]
    BrowserError(#[from] chromiumoxide::error::CdpError),

    #[error("Timed out after {seconds}s waiting for {target}")]
    TimeoutError { target: String, seconds: u64 },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Health check failed: {message}")]
    HealthCheckError { message: String },

    #[error("Scraper unavailable: {message}")]
    UnavailableError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Browser,
    Network,
    Configuration,
    Validation,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScrapeError {
    pub fn timeout(target: impl Into<String>, duration: std::time::Duration) -> Self {
        ScrapeError::TimeoutError {
            target: target.into(),
            seconds: duration.as_secs(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ScrapeError::BrowserLaunchError { .. } | ScrapeError::BrowserError(_) => {
                ErrorCategory::Browser
            }
            ScrapeError::TimeoutError { .. }
            | ScrapeError::HttpError(_)
            | ScrapeError::HealthCheckError { .. } => ErrorCategory::Network,
            ScrapeError::ConfigError { .. }
            | ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ScrapeError::ValidationError { .. } | ScrapeError::UrlError(_) => {
                ErrorCategory::Validation
            }
            ScrapeError::CsvError(_) | ScrapeError::SerializationError(_) => ErrorCategory::Data,
            ScrapeError::IoError(_) | ScrapeError::UnavailableError { .. } => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Browser | ErrorCategory::Data | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScrapeError::BrowserLaunchError { .. } => {
                "Check that Chromium is installed or set SEACE_CHROME_PATH to the browser binary"
            }
            ScrapeError::BrowserError(_) => {
                "The browser connection dropped; retry the request"
            }
            ScrapeError::TimeoutError { .. } => {
                "SEACE is slow or unreachable; retry later or raise the scraper timeouts"
            }
            ScrapeError::HttpError(_) | ScrapeError::HealthCheckError { .. } => {
                "Check that the service is running and reachable"
            }
            ScrapeError::ConfigError { .. }
            | ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::MissingConfigError { .. } => {
                "Review the configuration file and command-line flags"
            }
            ScrapeError::ValidationError { .. } | ScrapeError::UrlError(_) => {
                "Dates must use the dd/mm/yyyy format"
            }
            ScrapeError::CsvError(_) | ScrapeError::SerializationError(_) => {
                "The scraped data could not be encoded; report the failing date range"
            }
            ScrapeError::IoError(_) => "Check file permissions and free disk space",
            ScrapeError::UnavailableError { .. } => "Restart the service",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Browser => format!("Could not drive the browser: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Validation => format!("Invalid input: {}", self),
            ErrorCategory::Data => format!("Could not process data: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
