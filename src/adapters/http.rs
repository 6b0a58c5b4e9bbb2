use crate::utils::error::{Result, ScrapeError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
}

/// Probes the service root and succeeds only on a 2xx `{"status": "ok"}` reply.
pub async fn probe_health(url: &str, timeout: Duration) -> Result<()> {
    let client = Client::builder().timeout(timeout).build()?;

    tracing::debug!("Probing {}", url);
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::HealthCheckError {
            message: format!("{} returned HTTP {}", url, status.as_u16()),
        });
    }

    let body: StatusBody = response.json().await?;
    if body.status != "ok" {
        return Err(ScrapeError::HealthCheckError {
            message: format!("{} reported status '{}'", url, body.status),
        });
    }
    Ok(())
}
