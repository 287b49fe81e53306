//! Configuration loading for the church ledger.
//!
//! This module loads server settings and optional seed data from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use church_ledger::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Log level: {}", config.settings().logging.level);
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_DIR_ENV, ConfigLoader, DEFAULT_CONFIG_DIR};
pub use types::{
    LoggingSettings, SeedCatalogEntry, SeedCategory, SeedData, SeedEmployee, SeedSummary,
    ServerSettings, Settings,
};
