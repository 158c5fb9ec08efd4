//! Role computation from group membership.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse role label embedded in issued tokens
///
/// Computed from group membership at issuance and rotation time, never
/// stored. Variants serialize under their exact names (`"Superuser"`,
/// `"Admin"`, `"Default"`, `"UnAuthorized"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Superuser,
    Admin,
    Default,
    UnAuthorized,
}

impl Role {
    /// Computes the role from a set of group names
    ///
    /// Precedence: a superuser-equivalent group wins over an
    /// admin-equivalent group, which wins over any other group; an empty
    /// set yields `UnAuthorized`. Group names are matched
    /// case-insensitively.
    pub fn from_groups(group_names: &HashSet<String>) -> Role {
        let mut role = Role::UnAuthorized;
        for name in group_names {
            let candidate = match name.to_ascii_lowercase().as_str() {
                "superuser" | "superadmin" => Role::Superuser,
                "admin" | "staff" => Role::Admin,
                _ => Role::Default,
            };
            if candidate.rank() > role.rank() {
                role = candidate;
            }
        }
        role
    }

    fn rank(&self) -> u8 {
        match self {
            Role::Superuser => 3,
            Role::Admin => 2,
            Role::Default => 1,
            Role::UnAuthorized => 0,
        }
    }

    /// String form of the role label
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superuser => "Superuser",
            Role::Admin => "Admin",
            Role::Default => "Default",
            Role::UnAuthorized => "UnAuthorized",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
