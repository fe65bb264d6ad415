//! inventack-authz - role-based permissions for Inventack organizations
//!
//! Three roles (`admin`, `manager`, `member`), a closed vocabulary of 22
//! permissions, and one constant table assigning permissions to roles.
//! Permission sets are bitmasks, so every check is a single AND.
//!
//! Layers:
//! - [`table`] / [`engine`]: the assignment table and pure queries. Unknown
//!   roles and permissions answer `false`; nothing here logs or fails.
//! - [`gate`]: gate-before-mutate helpers returning `AuthzError::Forbidden`.
//! - [`membership`] / [`invitation`]: LMDB-backed record of each user's role
//!   per organization, the source collaborators resolve roles from.
//! - [`session`]: organization-scoped role resolution.
//!
//! ```
//! use inventack_authz::{has_permission, can_delete_items, get_user_permissions};
//!
//! assert!(has_permission("manager", "order:approve"));
//! assert!(!has_permission("member", "order:approve"));
//! assert!(!has_permission("superadmin", "product:read"));
//! assert!(!can_delete_items("manager"));
//! assert_eq!(get_user_permissions("member").len(), 5);
//! ```

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod gate;
pub mod invitation;
pub mod keys;
pub mod membership;
pub mod permission;
pub mod role;
pub mod session;
pub mod table;

#[cfg(feature = "server")]
pub mod server;

pub use config::Settings;
pub use db::{clear_all, init, init_with_map_size, test_lock};
pub use engine::{
    can_delete_items, can_manage_organization, can_manage_users, get_user_permissions,
    has_permission, Capabilities,
};
pub use error::{AuthzError, Result};
pub use invitation::{
    accept_invitation, cancel_invitation, decline_invitation, invitation, invite,
    pending_invitations, Invitation, InvitationStatus,
};
pub use membership::{
    create_organization, join_organization, leave_organization, members_of, membership, organizations_for,
    remove_member, role_counts, role_of, update_member_role, Membership,
};
pub use permission::{Permission, PermissionSet, ResourceFamily};
pub use role::Role;
pub use session::{MembershipDirectory, OrgSession, RoleResolver};
pub use table::{list_permissions, permission_matrix, permissions_for, MatrixRow, ROLE_PERMISSIONS};
