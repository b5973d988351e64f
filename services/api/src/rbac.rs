//! Role-based access control for the back office
//!
//! All role strings that cross a boundary (JWT claims, database rows) are
//! parsed into [`Role`] immediately. The canonical wire form is upper-snake
//! (`MANAGING_DIRECTOR`); parsing is case-insensitive so tokens issued with
//! older lowercase role strings still resolve.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Staff role assigned to every user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    ManagingDirector,
    Admin,
    InventoryManager,
    Cashier,
    ReportViewer,
}

/// Actions gated by the permission table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create, update, activate/deactivate, and delete user accounts
    ManageUsers,
    /// Adjust stock levels and maintain inventory rows
    ManageInventory,
    /// Record sales
    ProcessSales,
    /// Read sales and stock reports
    ViewReports,
    /// Delete products or categories
    DeleteCatalogEntry,
    /// Create or update products or categories
    EditCatalogEntry,
}

impl Role {
    /// All roles, in privilege order
    pub const ALL: [Role; 5] = [
        Role::ManagingDirector,
        Role::Admin,
        Role::InventoryManager,
        Role::Cashier,
        Role::ReportViewer,
    ];

    /// Canonical string form, as stored in the database and JWT claims
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ManagingDirector => "MANAGING_DIRECTOR",
            Role::Admin => "ADMIN",
            Role::InventoryManager => "INVENTORY_MANAGER",
            Role::Cashier => "CASHIER",
            Role::ReportViewer => "REPORT_VIEWER",
        }
    }

    /// Whether this role is permitted to perform `action`
    ///
    /// Pure lookup over the fixed permission table.
    pub fn allows(&self, action: Action) -> bool {
        allowed_roles(action).contains(self)
    }
}

/// The permission table: which roles may perform `action`
///
/// Managing directors and admins may do everything; the remaining roles are
/// scoped to their own area.
pub fn allowed_roles(action: Action) -> &'static [Role] {
    match action {
        Action::ManageUsers => &[Role::ManagingDirector, Role::Admin],
        Action::ManageInventory => &[Role::ManagingDirector, Role::Admin, Role::InventoryManager],
        Action::ProcessSales => &[Role::ManagingDirector, Role::Admin, Role::Cashier],
        Action::ViewReports => &[Role::ManagingDirector, Role::Admin, Role::ReportViewer],
        Action::DeleteCatalogEntry => &[Role::ManagingDirector, Role::Admin],
        Action::EditCatalogEntry => &[Role::ManagingDirector, Role::Admin, Role::InventoryManager],
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MANAGING_DIRECTOR" => Ok(Role::ManagingDirector),
            "ADMIN" => Ok(Role::Admin),
            "INVENTORY_MANAGER" => Ok(Role::InventoryManager),
            "CASHIER" => Ok(Role::Cashier),
            "REPORT_VIEWER" => Ok(Role::ReportViewer),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Error returned when a role string does not name a known role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_table() {
        use Action::*;
        use Role::*;

        let table: [(Action, &[Role]); 6] = [
            (ManageUsers, &[ManagingDirector, Admin]),
            (
                ManageInventory,
                &[ManagingDirector, Admin, InventoryManager],
            ),
            (ProcessSales, &[ManagingDirector, Admin, Cashier]),
            (ViewReports, &[ManagingDirector, Admin, ReportViewer]),
            (DeleteCatalogEntry, &[ManagingDirector, Admin]),
            (
                EditCatalogEntry,
                &[ManagingDirector, Admin, InventoryManager],
            ),
        ];

        for (action, allowed) in table {
            for role in Role::ALL {
                assert_eq!(
                    role.allows(action),
                    allowed.contains(&role),
                    "role {role} action {action:?}"
                );
            }
        }
    }

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(
            "managing_director".parse::<Role>().unwrap(),
            Role::ManagingDirector
        );
        assert_eq!("Cashier".parse::<Role>().unwrap(), Role::Cashier);
    }

    #[test]
    fn test_unknown_role_fails_to_parse() {
        assert!("superuser".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
        assert!("admin ".parse::<Role>().is_err());
    }

    #[test]
    fn test_canonical_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }
}
