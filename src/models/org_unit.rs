//! Organizational scope of every stored record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The headquarters ("sede") or branch ("filial") a record belongs to.
///
/// Every read and write in the ledger is scoped to exactly one org unit.
/// A branch caller never sees headquarters records and vice versa.
///
/// # Examples
///
/// ```
/// use church_ledger::models::OrgUnit;
///
/// let unit = OrgUnit::Branch(4);
/// assert_eq!(unit.to_string(), "branch:4");
/// assert_ne!(unit, OrgUnit::Headquarters(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OrgUnit {
    /// A headquarters ("sede").
    Headquarters(u64),
    /// A branch ("filial") of a headquarters.
    Branch(u64),
}

impl OrgUnit {
    /// Resolves the caller's scope from optional headquarters and branch ids.
    ///
    /// A branch id takes precedence, matching how branch users are attached
    /// to both their branch and its headquarters.
    pub fn resolve(headquarters: Option<u64>, branch: Option<u64>) -> Option<Self> {
        match (headquarters, branch) {
            (_, Some(branch)) => Some(OrgUnit::Branch(branch)),
            (Some(headquarters), None) => Some(OrgUnit::Headquarters(headquarters)),
            (None, None) => None,
        }
    }
}

impl fmt::Display for OrgUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrgUnit::Headquarters(id) => write!(f, "headquarters:{}", id),
            OrgUnit::Branch(id) => write!(f, "branch:{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_takes_precedence() {
        assert_eq!(OrgUnit::resolve(Some(1), Some(9)), Some(OrgUnit::Branch(9)));
    }

    #[test]
    fn test_headquarters_only() {
        assert_eq!(
            OrgUnit::resolve(Some(1), None),
            Some(OrgUnit::Headquarters(1))
        );
    }

    #[test]
    fn test_no_scope() {
        assert_eq!(OrgUnit::resolve(None, None), None);
    }

    #[test]
    fn test_serialization_format() {
        let json = serde_json::to_value(OrgUnit::Branch(2)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "branch", "id": 2}));
    }
}
