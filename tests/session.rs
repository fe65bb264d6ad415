//! Organization-scoped sessions backed by the membership store

use inventack_authz::{
    clear_all, create_organization, init, join_organization, leave_organization, test_lock,
    update_member_role, AuthzError, MembershipDirectory, OrgSession, Permission, Role,
};
use std::sync::{MutexGuard, OnceLock};
use tempfile::TempDir;

static TEST_DIR: OnceLock<TempDir> = OnceLock::new();

fn setup() -> MutexGuard<'static, ()> {
    let lock = test_lock();
    let dir = TEST_DIR.get_or_init(|| TempDir::new().unwrap());
    init(dir.path().to_str().unwrap()).unwrap();
    clear_all().unwrap();
    lock
}

#[test]
fn switching_organizations_resolves_per_tenant_roles() {
    let _lock = setup();
    create_organization("acme", "alice").unwrap();
    create_organization("globex", "gina").unwrap();
    join_organization("globex", "alice").unwrap();

    let mut s = OrgSession::new("alice");
    assert_eq!(s.switch_organization(&MembershipDirectory, "acme"), Some(Role::Admin));
    assert!(s.capabilities().can_delete_products());
    assert!(s.require(Permission::OrgDelete).is_ok());

    assert_eq!(s.switch_organization(&MembershipDirectory, "globex"), Some(Role::Member));
    assert!(!s.capabilities().can_delete_products());
    assert!(s.capabilities().can_view_reports());
    assert!(matches!(
        s.require(Permission::OrgDelete),
        Err(AuthzError::Forbidden { role: Some(Role::Member), .. })
    ));
    assert!(matches!(
        s.require_in("acme", Permission::OrgDelete),
        Err(AuthzError::WrongOrganization { .. })
    ));
}

#[test]
fn refresh_picks_up_role_changes() {
    let _lock = setup();
    create_organization("acme", "alice").unwrap();
    join_organization("acme", "bob").unwrap();

    let mut s = OrgSession::new("bob");
    s.switch_organization(&MembershipDirectory, "acme");
    assert!(!s.has_permission(Permission::OrderApprove));

    update_member_role("alice", "acme", "bob", Role::Manager).unwrap();
    assert_eq!(s.refresh(&MembershipDirectory), Some(Role::Manager));
    assert!(s.has_permission(Permission::OrderApprove));

    leave_organization("acme", "bob").unwrap();
    assert_eq!(s.refresh(&MembershipDirectory), None);
    assert!(s.permissions().is_empty());
}

#[test]
fn invalid_organization_id_leaves_no_role() {
    let _lock = setup();
    create_organization("acme", "alice").unwrap();

    let mut s = OrgSession::new("alice");
    s.switch_organization(&MembershipDirectory, "acme");
    assert_eq!(s.switch_organization(&MembershipDirectory, ""), None);
    assert!(s.permissions().is_empty());
}
