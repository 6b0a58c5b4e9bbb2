pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::browser::ChromiumLauncher;
pub use adapters::storage::LocalStorage;
pub use config::{settings::Settings, CliConfig};
pub use core::{engine::ScrapeEngine, pipeline::SeacePipeline};
pub use utils::error::{Result, ScrapeError};

use std::sync::Arc;

/// Wires the Chromium launcher and SEACE pipeline into an engine.
pub fn build_engine(settings: &Settings) -> Result<Arc<ScrapeEngine<ChromiumLauncher, SeacePipeline>>> {
    let launcher = ChromiumLauncher::new(settings.browser.clone());
    let pipeline = SeacePipeline::new(settings.scraper.clone())?;
    let engine = ScrapeEngine::new(launcher, pipeline, settings.server.max_concurrent_scrapes)
        .with_monitoring(settings.monitoring);
    Ok(Arc::new(engine))
}
