//! Public permission API: scenarios, serde boundary and thread safety

use inventack_authz::{
    can_delete_items, can_manage_organization, can_manage_users, get_user_permissions,
    has_permission, list_permissions, permissions_for, Permission, PermissionSet, Role,
};
use std::thread;

#[test]
fn scenarios() {
    assert!(has_permission("admin", "org:delete"));
    assert!(!has_permission("member", "org:delete"));
    assert!(has_permission("manager", "order:approve"));
    assert!(!has_permission("member", "order:approve"));
    assert_eq!(
        get_user_permissions("member").names(),
        vec!["product:read", "supplier:read", "order:read", "user:read", "reports:view"]
    );
    assert!(!has_permission("superadmin", "product:read"));
    assert!(!can_delete_items("manager"));
    assert!(can_delete_items("admin"));
}

#[test]
fn every_role_set_is_within_the_vocabulary() {
    let all = list_permissions();
    assert_eq!(all.len(), 22);
    for role in Role::ALL {
        assert!(all.is_superset_of(permissions_for(role)));
        for p in Permission::ALL {
            assert_eq!(has_permission(role.as_str(), p.as_str()), permissions_for(role).contains(p));
        }
    }
}

#[test]
fn only_admin_manages_users_and_organization() {
    assert!(can_manage_users("admin") && can_manage_organization("admin"));
    for role in ["manager", "member", "", "ADMIN", "owner"] {
        assert!(!can_manage_users(role));
        assert!(!can_manage_organization(role));
    }
}

#[test]
fn serde_rejects_values_outside_the_closed_sets() {
    assert_eq!(serde_json::from_str::<Role>("\"manager\"").unwrap(), Role::Manager);
    assert!(serde_json::from_str::<Role>("\"owner\"").is_err());
    assert_eq!(
        serde_json::from_str::<Permission>("\"org:settings:update\"").unwrap(),
        Permission::OrgSettingsUpdate
    );
    assert!(serde_json::from_str::<Permission>("\"product:archive\"").is_err());
    assert_eq!(serde_json::to_string(&Permission::UserRoleUpdate).unwrap(), "\"user:role:update\"");
}

#[test]
fn permission_sets_serialize_as_names() {
    let set: PermissionSet = [Permission::ReportsView, Permission::ProductRead].into_iter().collect();
    assert_eq!(serde_json::to_string(&set).unwrap(), r#"["product:read","reports:view"]"#);
}

#[test]
fn queries_are_safe_across_threads() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || {
                let role = Role::ALL[i % 3];
                (0..1000).all(|_| {
                    has_permission(role.as_str(), "product:read")
                        && has_permission("admin", "org:delete") != has_permission("member", "org:delete")
                })
            })
        })
        .collect();
    for h in handles {
        assert!(h.join().unwrap());
    }
}
