pub mod cubso;
pub mod engine;
pub mod export;
pub mod listing;
pub mod pipeline;

pub use crate::domain::model::{Tender, TenderQuery};
pub use crate::domain::ports::{BrowserLauncher, BrowserPage, Pipeline, Storage, TenderSource};
pub use crate::utils::error::Result;
