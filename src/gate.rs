//! Gate-before-mutate helpers
//!
//! Resource stores call these before touching storage. A denial is an
//! `AuthzError::Forbidden` whose message is safe to show the user.

use tracing::warn;

use crate::error::{AuthzError, Result};
use crate::permission::Permission;
use crate::role::Role;

/// Fail unless `role` holds `permission`. An unresolved role holds nothing.
#[inline]
pub fn require(role: Option<Role>, permission: Permission) -> Result<()> {
    if role.is_some_and(|r| r.has(permission)) {
        return Ok(());
    }
    warn!(role = ?role, permission = %permission, "permission denied");
    Err(AuthzError::Forbidden { role, permission })
}

/// Same as [`require`] for raw strings read from membership data.
///
/// An unknown permission is a caller bug and is reported as such; an unknown
/// role is treated as no role.
pub fn require_str(role: &str, permission: &str) -> Result<()> {
    let permission = Permission::parse(permission)?;
    require(Role::parse(role).ok(), permission)
}

/// Run `op` only if the role holds `permission`.
pub fn guarded<T, F>(role: Option<Role>, permission: Permission, op: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    require(role, permission)?;
    op()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn allows_held_permission() {
        assert!(require(Some(Role::Manager), Permission::OrderApprove).is_ok());
        assert!(require(Some(Role::Admin), Permission::OrgDelete).is_ok());
    }

    #[test]
    fn denies_missing_permission() {
        assert_eq!(
            require(Some(Role::Member), Permission::ProductCreate),
            Err(AuthzError::Forbidden {
                role: Some(Role::Member),
                permission: Permission::ProductCreate,
            })
        );
    }

    #[test]
    fn unresolved_role_is_denied() {
        for p in Permission::ALL {
            assert!(require(None, p).is_err());
        }
    }

    #[test]
    fn string_gate() {
        assert!(require_str("admin", "user:role:update").is_ok());
        assert!(matches!(
            require_str("superadmin", "product:read"),
            Err(AuthzError::Forbidden { role: None, .. })
        ));
        assert_eq!(
            require_str("admin", "product:archive"),
            Err(AuthzError::UnknownPermission("product:archive".into()))
        );
    }

    #[test]
    fn guarded_skips_op_on_denial() {
        let ran = Cell::new(false);
        let r = guarded(Some(Role::Manager), Permission::ProductDelete, || {
            ran.set(true);
            Ok(())
        });
        assert!(r.is_err());
        assert!(!ran.get());

        let r = guarded(Some(Role::Admin), Permission::ProductDelete, || {
            ran.set(true);
            Ok(42)
        });
        assert_eq!(r, Ok(42));
        assert!(ran.get());
    }
}
