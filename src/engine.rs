//! Permission queries (pure, no I/O, never fail)
//!
//! The string functions take role and permission as they arrive from stored
//! membership data. Anything that does not parse is treated as holding no
//! permissions, so a malformed value can only ever deny.

use std::str::FromStr;

use crate::permission::{Permission, PermissionSet};
use crate::role::Role;
use crate::table::permissions_for;

/// Resolve a role string to its permission set; unknown roles get nothing.
#[inline]
fn role_set(role: &str) -> PermissionSet {
    Role::from_str(role).map(permissions_for).unwrap_or(PermissionSet::EMPTY)
}

/// True iff `permission` is in the role's set.
pub fn has_permission(role: &str, permission: &str) -> bool {
    role_set(role).contains_str(permission)
}

/// The role's permission set (empty for an unknown role).
pub fn get_user_permissions(role: &str) -> PermissionSet {
    role_set(role)
}

/// Can invite and administer members.
pub fn can_manage_users(role: &str) -> bool {
    has_permission(role, Permission::UserInvite.as_str())
}

pub fn can_manage_organization(role: &str) -> bool {
    has_permission(role, Permission::OrgSettingsUpdate.as_str())
}

/// Can delete *something* among products, suppliers and orders.
///
/// UI affordance only: it does not say the role may delete a particular
/// kind of item. Gate the actual delete on the exact permission.
/// Membership removal (`user:delete`) is not part of it.
pub fn can_delete_items(role: &str) -> bool {
    has_permission(role, Permission::ProductDelete.as_str())
        || has_permission(role, Permission::SupplierDelete.as_str())
        || has_permission(role, Permission::OrderDelete.as_str())
}

impl Role {
    #[inline]
    pub const fn permissions(self) -> PermissionSet {
        permissions_for(self)
    }

    #[inline]
    pub const fn has(self, permission: Permission) -> bool {
        permissions_for(self).contains(permission)
    }

    pub fn can_manage_users(self) -> bool {
        can_manage_users(self.as_str())
    }

    pub fn can_manage_organization(self) -> bool {
        can_manage_organization(self.as_str())
    }

    pub fn can_delete_items(self) -> bool {
        can_delete_items(self.as_str())
    }
}

/// Per-resource checks for one (possibly unresolved) role.
///
/// Each method is a single `has` lookup; `None` answers `false` everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    role: Option<Role>,
}

impl Capabilities {
    pub fn new(role: Option<Role>) -> Self {
        Self { role }
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    #[inline]
    pub fn has(&self, permission: Permission) -> bool {
        self.role.map(|r| r.has(permission)).unwrap_or(false)
    }

    pub fn permissions(&self) -> PermissionSet {
        self.role.map(Role::permissions).unwrap_or(PermissionSet::EMPTY)
    }

    pub fn can_manage_users(&self) -> bool { self.has(Permission::UserInvite) }
    pub fn can_manage_organization(&self) -> bool { self.has(Permission::OrgSettingsUpdate) }
    pub fn can_delete_items(&self) -> bool { self.role.map(Role::can_delete_items).unwrap_or(false) }

    pub fn can_create_products(&self) -> bool { self.has(Permission::ProductCreate) }
    pub fn can_update_products(&self) -> bool { self.has(Permission::ProductUpdate) }
    pub fn can_delete_products(&self) -> bool { self.has(Permission::ProductDelete) }

    pub fn can_create_suppliers(&self) -> bool { self.has(Permission::SupplierCreate) }
    pub fn can_update_suppliers(&self) -> bool { self.has(Permission::SupplierUpdate) }
    pub fn can_delete_suppliers(&self) -> bool { self.has(Permission::SupplierDelete) }

    pub fn can_create_orders(&self) -> bool { self.has(Permission::OrderCreate) }
    pub fn can_update_orders(&self) -> bool { self.has(Permission::OrderUpdate) }
    pub fn can_delete_orders(&self) -> bool { self.has(Permission::OrderDelete) }
    pub fn can_approve_orders(&self) -> bool { self.has(Permission::OrderApprove) }

    pub fn can_view_reports(&self) -> bool { self.has(Permission::ReportsView) }
    pub fn can_export_reports(&self) -> bool { self.has(Permission::ReportsExport) }
}
