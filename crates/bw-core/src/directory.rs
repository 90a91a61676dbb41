//! Staff directory models backing recipient resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Roles carried by staff directory entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Superadmin,
    Admin,
    Staff,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Superadmin => "superadmin",
            StaffRole::Admin => "admin",
            StaffRole::Staff => "staff",
        }
    }
}

impl std::str::FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "superadmin" => Ok(StaffRole::Superadmin),
            "admin" => Ok(StaffRole::Admin),
            "staff" => Ok(StaffRole::Staff),
            _ => Err(format!("unknown staff role: {}", s)),
        }
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Data Protection Officer contact record.
///
/// The resolver and the GDPR template both use the most recently updated
/// row; older rows are kept for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DpoContact {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_staff_role_from_str() {
        assert_eq!(StaffRole::from_str("superadmin").unwrap(), StaffRole::Superadmin);
        assert_eq!(StaffRole::from_str("ADMIN").unwrap(), StaffRole::Admin);
        assert!(StaffRole::from_str("auditor").is_err());
    }

    #[test]
    fn test_staff_role_round_trip() {
        for role in [StaffRole::Superadmin, StaffRole::Admin, StaffRole::Staff] {
            assert_eq!(StaffRole::from_str(role.as_str()).unwrap(), role);
        }
    }
}
