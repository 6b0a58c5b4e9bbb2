use crate::utils::error::{Result, ScrapeError};
use chrono::NaiveDate;
use url::Url;

/// Message returned to API clients for any malformed date.
pub const DATE_FORMAT_MESSAGE: &str = "Las fechas deben tener formato dd/mm/yyyy";

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> ScrapeError {
    ScrapeError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Accepts absolute http(s) URLs only.
pub fn validate_url(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(field, value, "URL cannot be empty"));
    }

    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Invalid URL format: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(field, value, format!("Unsupported URL scheme: {}", scheme))),
    }
}

pub fn validate_path(field: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }
    Ok(())
}

pub fn validate_positive_number(field: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(field, value, format!("Value must be at least {}", min_value)));
    }
    Ok(())
}

pub fn validate_non_empty_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(field, value, format!("Value must be between {} and {}", min, max)));
    }
    Ok(())
}

pub fn validate_output_formats(field: &str, formats: &[String], allowed: &[&str]) -> Result<()> {
    if formats.is_empty() {
        return Err(invalid(field, "", "At least one output format is required"));
    }

    let supported = |format: &str| allowed.iter().any(|a| a.eq_ignore_ascii_case(format.trim()));
    match formats.iter().find(|f| !supported(f.as_str())) {
        Some(format) => Err(invalid(
            field,
            format,
            format!("Unsupported format. Valid formats: {}", allowed.join(", ")),
        )),
        None => Ok(()),
    }
}

/// Parses a `dd/mm/yyyy` date.
///
/// The shape check (ASCII digits everywhere except slashes at positions 2
/// and 5) runs before chrono, whose numeric fields also accept padding and
/// signs such as ` 2/10/2025` or `02/10/+025`.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'/',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(ScrapeError::ValidationError {
            message: DATE_FORMAT_MESSAGE.to_string(),
        });
    }

    NaiveDate::parse_from_str(value, "%d/%m/%Y").map_err(|_| ScrapeError::ValidationError {
        message: DATE_FORMAT_MESSAGE.to_string(),
    })
}
