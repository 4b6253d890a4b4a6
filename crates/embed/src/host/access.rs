//! Permission-based view access.

use anyhow::Result;

use super::EntityAccess;
use crate::models::{Account, Entity};

/// Grants view access from the current account's permissions.
///
/// - Admin users always have access.
/// - Published content needs "access content".
/// - Authors see their own unpublished content with "view own unpublished content".
/// - Otherwise the bundle permission "view {bundle} content" decides.
#[derive(Debug, Clone)]
pub struct PermissionAccess {
    account: Account,
}

impl PermissionAccess {
    pub fn new(account: Account) -> Self {
        Self { account }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }
}

impl EntityAccess for PermissionAccess {
    fn can_view(&self, entity: &Entity) -> Result<bool> {
        let user = &self.account;

        if user.is_admin() {
            return Ok(true);
        }

        if entity.is_published() && user.has_permission("access content") {
            return Ok(true);
        }

        if !entity.is_published()
            && user.authenticated
            && entity.author_id == user.id
            && user.has_permission("view own unpublished content")
        {
            return Ok(true);
        }

        let permission = format!("view {} content", entity.bundle);
        Ok(user.has_permission(&permission))
    }
}
