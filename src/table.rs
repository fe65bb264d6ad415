//! The role → permission assignment table
//!
//! Flat on purpose: each role's row is written out in full, so revoking a
//! permission from one role never changes another. This is the only place
//! the assignment lives; everything else asks the engine.

use crate::permission::{Permission, PermissionSet, ResourceFamily};
use crate::role::Role;

use Permission::*;

/// Every permission in the vocabulary.
pub const VOCABULARY: PermissionSet = PermissionSet::of(&Permission::ALL);

pub const ADMIN_PERMISSIONS: PermissionSet = PermissionSet::of(&[
    ProductCreate,
    ProductRead,
    ProductUpdate,
    ProductDelete,
    SupplierCreate,
    SupplierRead,
    SupplierUpdate,
    SupplierDelete,
    OrderCreate,
    OrderRead,
    OrderUpdate,
    OrderDelete,
    OrderApprove,
    UserInvite,
    UserRead,
    UserUpdate,
    UserDelete,
    UserRoleUpdate,
    OrgSettingsUpdate,
    OrgDelete,
    ReportsView,
    ReportsExport,
]);

// Manages products, suppliers and orders and sees reports. No deletes, no membership admin.
pub const MANAGER_PERMISSIONS: PermissionSet = PermissionSet::of(&[
    ProductCreate,
    ProductRead,
    ProductUpdate,
    SupplierCreate,
    SupplierRead,
    SupplierUpdate,
    OrderCreate,
    OrderRead,
    OrderUpdate,
    OrderApprove,
    UserRead,
    ReportsView,
    ReportsExport,
]);

// Read-only.
pub const MEMBER_PERMISSIONS: PermissionSet = PermissionSet::of(&[
    ProductRead,
    SupplierRead,
    OrderRead,
    UserRead,
    ReportsView,
]);

/// One row per role, highest privilege first.
pub const ROLE_PERMISSIONS: [(Role, PermissionSet); 3] = [
    (Role::Admin, ADMIN_PERMISSIONS),
    (Role::Manager, MANAGER_PERMISSIONS),
    (Role::Member, MEMBER_PERMISSIONS),
];

/// The full closed vocabulary.
#[inline]
pub fn list_permissions() -> PermissionSet {
    VOCABULARY
}

/// The exact permission set of a role.
#[inline]
pub const fn permissions_for(role: Role) -> PermissionSet {
    match role {
        Role::Admin => ADMIN_PERMISSIONS,
        Role::Manager => MANAGER_PERMISSIONS,
        Role::Member => MEMBER_PERMISSIONS,
    }
}

/// One row of the role screen: a permission and whether each role holds it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MatrixRow {
    pub permission: Permission,
    pub label: &'static str,
    pub admin: bool,
    pub manager: bool,
    pub member: bool,
}

/// Permissions grouped by resource family with per-role grants.
pub fn permission_matrix() -> Vec<(ResourceFamily, Vec<MatrixRow>)> {
    ResourceFamily::ALL
        .into_iter()
        .map(|family| {
            let rows = family
                .permissions()
                .map(|p| MatrixRow {
                    permission: p,
                    label: p.label(),
                    admin: ADMIN_PERMISSIONS.contains(p),
                    manager: MANAGER_PERMISSIONS.contains(p),
                    member: MEMBER_PERMISSIONS.contains(p),
                })
                .collect();
            (family, rows)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_match_accessor() {
        for (role, set) in ROLE_PERMISSIONS {
            assert_eq!(permissions_for(role), set);
        }
    }

    #[test]
    fn admin_holds_the_whole_vocabulary() {
        assert_eq!(ADMIN_PERMISSIONS, VOCABULARY);
        assert_eq!(list_permissions().len(), 22);
    }

    // Strict nesting is a property of the shipped table, not something the engine enforces.
    #[test]
    fn shipped_table_nests_strictly() {
        assert!(ADMIN_PERMISSIONS.is_superset_of(MANAGER_PERMISSIONS));
        assert!(MANAGER_PERMISSIONS.is_superset_of(MEMBER_PERMISSIONS));
        assert_ne!(ADMIN_PERMISSIONS, MANAGER_PERMISSIONS);
        assert_ne!(MANAGER_PERMISSIONS, MEMBER_PERMISSIONS);
    }

    #[test]
    fn manager_row() {
        assert_eq!(MANAGER_PERMISSIONS.len(), 13);
        assert!(MANAGER_PERMISSIONS.contains(OrderApprove));
        assert!(MANAGER_PERMISSIONS.contains(ReportsExport));
        assert!(!MANAGER_PERMISSIONS.contains(UserInvite));
        assert!(!MANAGER_PERMISSIONS.contains(OrgSettingsUpdate));
        for p in [ProductDelete, SupplierDelete, OrderDelete, UserDelete] {
            assert!(!MANAGER_PERMISSIONS.contains(p));
        }
    }

    #[test]
    fn member_row_is_read_only() {
        assert_eq!(
            MEMBER_PERMISSIONS.names(),
            vec!["product:read", "supplier:read", "order:read", "user:read", "reports:view"]
        );
    }

    #[test]
    fn matrix_covers_every_permission_once() {
        let matrix = permission_matrix();
        assert_eq!(matrix.len(), 6);
        let rows: usize = matrix.iter().map(|(_, r)| r.len()).sum();
        assert_eq!(rows, 22);
        let (_, orders) = &matrix[2];
        let approve = orders.iter().find(|r| r.permission == OrderApprove).unwrap();
        assert_eq!(approve.label, "Approve Orders");
        assert!(approve.admin && approve.manager && !approve.member);
    }
}
