//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading server settings
//! and seed data from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::AdjustmentKind;
use crate::services::{CatalogInput, CatalogService, CategoryInput, EmployeeInput, ExpenseService};

use super::types::{SeedData, SeedSummary, Settings};

/// Environment variable naming the configuration directory.
pub const CONFIG_DIR_ENV: &str = "CHURCH_LEDGER_CONFIG";

/// Directory used when [`CONFIG_DIR_ENV`] is unset.
pub const DEFAULT_CONFIG_DIR: &str = "./config/default";

/// Loads and provides access to the ledger configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── settings.yaml   # Server and logging settings
/// └── seed.yaml       # Optional reference data for one org unit
/// ```
///
/// # Example
///
/// ```no_run
/// use church_ledger::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Listening on {}", loader.settings().server.socket_addr());
/// # Ok::<(), church_ledger::error::LedgerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    settings: Settings,
    seed: Option<SeedData>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// `settings.yaml` is required; `seed.yaml` is read only when present.
    ///
    /// # Errors
    ///
    /// - `ConfigNotFound` if `settings.yaml` is missing
    /// - `ConfigParseError` if either file contains invalid YAML
    pub fn load<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<Settings>(&path.join("settings.yaml"))?;

        let seed_path = path.join("seed.yaml");
        let seed = if seed_path.exists() {
            Some(Self::load_yaml::<SeedData>(&seed_path)?)
        } else {
            None
        };

        Ok(Self { settings, seed })
    }

    /// Loads from `CHURCH_LEDGER_CONFIG`, falling back to `./config/default`.
    pub fn from_env() -> LedgerResult<Self> {
        let dir = std::env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
        Self::load(dir)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> LedgerResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| LedgerError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| LedgerError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the server and logging settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the seed data, if a seed file was present.
    pub fn seed(&self) -> Option<&SeedData> {
        self.seed.as_ref()
    }

    /// Writes the seed data through the services, so seeded rows go through
    /// the same validation as API requests.
    ///
    /// A category that already exists is reported as `DuplicateCategory`.
    pub fn apply_seed(
        &self,
        catalog: &CatalogService,
        expenses: &ExpenseService,
    ) -> LedgerResult<SeedSummary> {
        let Some(seed) = &self.seed else {
            return Ok(SeedSummary::default());
        };
        let org = seed.org_unit;
        let mut summary = SeedSummary::default();

        for employee in &seed.employees {
            catalog.create_employee(
                org,
                EmployeeInput {
                    member_ref: employee.member_ref,
                    base_salary: employee.base_salary,
                    active: Some(employee.active),
                },
            )?;
            summary.employees += 1;
        }

        for (kind, entries) in [
            (AdjustmentKind::Subsidy, &seed.subsidies),
            (AdjustmentKind::Discount, &seed.discounts),
        ] {
            for entry in entries {
                catalog.create_entry(
                    org,
                    kind,
                    CatalogInput {
                        name: entry.name.clone(),
                        amount: entry.amount,
                        active: Some(entry.active),
                    },
                )?;
            }
            match kind {
                AdjustmentKind::Subsidy => summary.subsidies = entries.len(),
                AdjustmentKind::Discount => summary.discounts = entries.len(),
            }
        }

        for category in &seed.categories {
            expenses.create_category(
                org,
                CategoryInput {
                    name: category.name.clone(),
                    description: category.description.clone(),
                },
            )?;
            summary.categories += 1;
        }

        info!(
            org_unit = %org,
            employees = summary.employees,
            subsidies = summary.subsidies,
            discounts = summary.discounts,
            categories = summary.categories,
            "Seed data applied"
        );
        Ok(summary)
    }
}
