//! Subsidy and discount catalog entries.
//!
//! Subsidies and discounts share one shape and differ only in the sign they
//! carry into the net salary, so both are modelled as a [`CatalogEntry`]
//! tagged with an [`AdjustmentKind`].

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OrgUnit;

/// Which catalog an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// An amount added on top of the base salary.
    Subsidy,
    /// An amount deducted from the base salary.
    Discount,
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentKind::Subsidy => write!(f, "Subsidy"),
            AdjustmentKind::Discount => write!(f, "Discount"),
        }
    }
}

/// A named subsidy or discount with a fixed monthly amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Identifier, unique within its kind.
    pub id: u64,
    /// Owning org unit.
    pub org_unit: OrgUnit,
    /// Subsidy or discount.
    pub kind: AdjustmentKind,
    /// Display name (e.g. "Subsídio de transporte").
    pub name: String,
    /// The monthly amount, never negative.
    pub amount: Decimal,
    /// Inactive entries cannot be applied to new computations.
    pub active: bool,
}

impl CatalogEntry {
    /// Captures the entry as it is applied to a salary record.
    pub fn applied(&self) -> AppliedAdjustment {
        AppliedAdjustment {
            id: self.id,
            name: self.name.clone(),
            amount: self.amount,
        }
    }
}

/// Fields needed to create a catalog entry; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCatalogEntry {
    /// Owning org unit.
    pub org_unit: OrgUnit,
    /// Subsidy or discount.
    pub kind: AdjustmentKind,
    /// Display name.
    pub name: String,
    /// The monthly amount.
    pub amount: Decimal,
    /// Initial active flag.
    pub active: bool,
}

/// Snapshot of a catalog entry at the moment a salary was computed.
///
/// Later edits to the catalog never change a stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedAdjustment {
    /// The catalog entry id.
    pub id: u64,
    /// The entry name at computation time.
    pub name: String,
    /// The entry amount at computation time.
    pub amount: Decimal,
}
