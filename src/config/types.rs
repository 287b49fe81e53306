//! Configuration types for the church ledger.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::OrgUnit;

/// Server settings from settings.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Where the HTTP server listens.
    #[serde(default)]
    pub server: ServerSettings,
    /// Log level used when `RUST_LOG` is unset.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Listen address for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    /// The `host:port` string passed to the listener.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive such as `info` or `church_ledger=debug`.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_level() -> String {
    "info".to_string()
}

/// Reference data from seed.yaml, loaded into the store for one org unit.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    /// The org unit that owns every seeded row.
    pub org_unit: OrgUnit,
    /// Employees to register.
    #[serde(default)]
    pub employees: Vec<SeedEmployee>,
    /// Subsidy catalog entries.
    #[serde(default)]
    pub subsidies: Vec<SeedCatalogEntry>,
    /// Discount catalog entries.
    #[serde(default)]
    pub discounts: Vec<SeedCatalogEntry>,
    /// Expense categories.
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
}

/// A seeded employee.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEmployee {
    /// Optional church member reference.
    #[serde(default)]
    pub member_ref: Option<u64>,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Defaults to active.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// A seeded subsidy or discount.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCatalogEntry {
    /// Display name.
    pub name: String,
    /// Fixed amount.
    pub amount: Decimal,
    /// Defaults to active.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// A seeded expense category.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCategory {
    /// Category name, unique within the org unit.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Counts of rows created by [`ConfigLoader::apply_seed`](super::ConfigLoader::apply_seed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Employees created.
    pub employees: usize,
    /// Subsidies created.
    pub subsidies: usize,
    /// Discounts created.
    pub discounts: usize,
    /// Categories created.
    pub categories: usize,
}
