/// Shared types used across the codebase
use serde::{Deserialize, Serialize};

/// Staff role carried in the session profile's `type` field.
/// Drives route authorization and the post-login landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "marketing")]
    Marketing,
    /// Branch manager
    #[serde(rename = "bm")]
    Bm,
}

impl Role {
    /// Dashboard root a user of this role lands on after login,
    /// and is bounced back to when visiting routes they cannot access.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Marketing => "/dashboard/marketing",
            Role::Bm => "/dashboard/manager",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Marketing => write!(f, "marketing"),
            Role::Bm => write!(f, "bm"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_to_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Marketing).unwrap(), "\"marketing\"");
        assert_eq!(serde_json::to_string(&Role::Bm).unwrap(), "\"bm\"");
    }

    #[test]
    fn home_paths_match_roles() {
        assert_eq!(Role::Marketing.home_path(), "/dashboard/marketing");
        assert_eq!(Role::Bm.home_path(), "/dashboard/manager");
    }
}
