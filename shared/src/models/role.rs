//! Staff roles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a staff account within a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "user_role", rename_all = "lowercase")
)]
pub enum Role {
    /// Business owner, sees every branch
    Owner,
    /// Branch manager
    Manager,
    /// Front counter, owns tabs
    Cashier,
    /// Takes orders at tables
    Waiter,
    /// Kitchen display
    Kitchen,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::Cashier => "cashier",
            Role::Waiter => "waiter",
            Role::Kitchen => "kitchen",
        }
    }

    /// Owners are not confined to a single branch
    pub const fn spans_all_branches(&self) -> bool {
        matches!(self, Role::Owner)
    }

    /// Owner or manager
    pub const fn is_manager(&self) -> bool {
        matches!(self, Role::Owner | Role::Manager)
    }

    /// Whether an account with this role may create or edit an account with `target`.
    ///
    /// Owners manage everyone; managers manage everyone except owners.
    pub const fn can_manage(&self, target: Role) -> bool {
        match self {
            Role::Owner => true,
            Role::Manager => !matches!(target, Role::Owner),
            _ => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "manager" => Ok(Role::Manager),
            "cashier" => Ok(Role::Cashier),
            "waiter" => Ok(Role::Waiter),
            "kitchen" => Ok(Role::Kitchen),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [
            Role::Owner,
            Role::Manager,
            Role::Cashier,
            Role::Waiter,
            Role::Kitchen,
        ] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_scope() {
        assert!(Role::Owner.spans_all_branches());
        assert!(!Role::Manager.spans_all_branches());
        assert!(Role::Manager.is_manager());
        assert!(!Role::Cashier.is_manager());
    }

    #[test]
    fn test_can_manage() {
        assert!(Role::Owner.can_manage(Role::Owner));
        assert!(Role::Manager.can_manage(Role::Cashier));
        assert!(Role::Manager.can_manage(Role::Manager));
        assert!(!Role::Manager.can_manage(Role::Owner));
        assert!(!Role::Cashier.can_manage(Role::Waiter));
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Kitchen).unwrap(), "\"kitchen\"");
        let role: Role = serde_json::from_str("\"waiter\"").unwrap();
        assert_eq!(role, Role::Waiter);
    }
}
