//! The account on whose behalf content is rendered.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// User ID (Uuid::nil() for anonymous).
    pub id: Uuid,
    /// Whether the user is authenticated.
    pub authenticated: bool,
    /// Granted permissions.
    pub permissions: Vec<String>,
}

impl Account {
    /// Anonymous visitor with no permissions.
    pub fn anonymous() -> Self {
        Self {
            id: Uuid::nil(),
            authenticated: false,
            permissions: Vec::new(),
        }
    }

    /// Authenticated user with the given permissions.
    pub fn authenticated(id: Uuid, permissions: Vec<String>) -> Self {
        Self {
            id,
            authenticated: true,
            permissions,
        }
    }

    /// Check if user has a specific permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Check if user is admin.
    pub fn is_admin(&self) -> bool {
        self.has_permission("administer site")
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::anonymous()
    }
}
