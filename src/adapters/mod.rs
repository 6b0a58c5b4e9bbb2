// Adapters layer: concrete implementations for external systems (browser, storage, http).

pub mod browser;
pub mod http;
pub mod storage;
