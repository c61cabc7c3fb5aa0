pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::core::runner::{BatchRunner, ErrorPolicy, RunReport};
pub use adapters::{http::HttpDispatcher, storage::LocalStorage};
pub use config::{catalog::Catalog, runtime::RuntimeConfig};
pub use utils::error::{ReplayError, Result};
