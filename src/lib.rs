//! Payroll and expense ledger engine for church headquarters and branches.
//!
//! This crate computes monthly net salaries from a base salary and selected
//! subsidies and discounts, aggregates expenses by category, and serves both
//! over a JSON HTTP API scoped to the caller's org unit.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod telemetry;
