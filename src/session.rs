//! Organization-scoped role resolution
//!
//! A role only means something inside the organization it was read for.
//! [`OrgSession`] keeps the role together with that organization and
//! re-resolves it on every switch, so a role from one tenant is never used
//! to authorize work in another.

use tracing::{debug, warn};

use crate::engine::Capabilities;
use crate::error::{AuthzError, Result};
use crate::membership;
use crate::permission::{Permission, PermissionSet};
use crate::role::Role;

/// Source of a user's role in an organization.
///
/// `Ok(None)` means "not a member". Errors are resolution failures (no
/// session, storage down); callers must treat both as holding no role.
pub trait RoleResolver {
    fn resolve_role(&self, organization_id: &str, user_id: &str) -> Result<Option<Role>>;
}

impl<F> RoleResolver for F
where
    F: Fn(&str, &str) -> Result<Option<Role>>,
{
    fn resolve_role(&self, organization_id: &str, user_id: &str) -> Result<Option<Role>> {
        self(organization_id, user_id)
    }
}

/// Resolves roles from the LMDB membership store.
#[derive(Debug, Clone, Copy, Default)]
pub struct MembershipDirectory;

impl RoleResolver for MembershipDirectory {
    fn resolve_role(&self, organization_id: &str, user_id: &str) -> Result<Option<Role>> {
        membership::role_of(organization_id, user_id)
    }
}

/// A signed-in user and the organization they are currently working in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgSession {
    user_id: String,
    organization_id: Option<String>,
    role: Option<Role>,
}

impl OrgSession {
    /// A session with no organization selected and therefore no role.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), organization_id: None, role: None }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Make `organization_id` current and resolve the role there.
    ///
    /// The previous role is dropped before resolution starts; a failed or
    /// empty resolution leaves the session with no role.
    pub fn switch_organization<R: RoleResolver + ?Sized>(&mut self, resolver: &R, organization_id: &str) -> Option<Role> {
        self.role = None;
        self.organization_id = Some(organization_id.to_string());
        self.role = match resolver.resolve_role(organization_id, &self.user_id) {
            Ok(role) => role,
            Err(e) => {
                warn!(user_id = %self.user_id, organization_id, error = %e, "role resolution failed");
                None
            }
        };
        debug!(user_id = %self.user_id, organization_id, role = ?self.role, "organization selected");
        self.role
    }

    /// Re-resolve the role in the current organization, e.g. after a role change.
    pub fn refresh<R: RoleResolver + ?Sized>(&mut self, resolver: &R) -> Option<Role> {
        match self.organization_id.clone() {
            Some(org) => self.switch_organization(resolver, &org),
            None => None,
        }
    }

    /// Deselect the organization.
    pub fn clear(&mut self) {
        self.organization_id = None;
        self.role = None;
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::new(self.role)
    }

    pub fn permissions(&self) -> PermissionSet {
        self.capabilities().permissions()
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.capabilities().has(permission)
    }

    /// Gate an operation in the current organization.
    pub fn require(&self, permission: Permission) -> Result<()> {
        crate::gate::require(self.role, permission)
    }

    /// Gate an operation that targets `organization_id`. Denied unless it is
    /// the organization the role was resolved for.
    pub fn require_in(&self, organization_id: &str, permission: Permission) -> Result<()> {
        if self.organization_id.as_deref() != Some(organization_id) {
            warn!(user_id = %self.user_id, current = ?self.organization_id, requested = organization_id, "cross-organization check refused");
            return Err(AuthzError::WrongOrganization {
                current: self.organization_id.clone(),
                requested: organization_id.to_string(),
            });
        }
        self.require(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(org: &str, user: &str) -> Result<Option<Role>> {
        Ok(match (org, user) {
            ("acme", "alice") => Some(Role::Admin),
            ("globex", "alice") => Some(Role::Member),
            ("down", _) => return Err(AuthzError::Storage("connection refused".into())),
            _ => None,
        })
    }

    #[test]
    fn new_session_has_no_permissions() {
        let s = OrgSession::new("alice");
        assert_eq!(s.organization_id(), None);
        assert!(s.permissions().is_empty());
        assert!(s.require(Permission::ProductRead).is_err());
    }

    #[test]
    fn switching_re_resolves_the_role() {
        let mut s = OrgSession::new("alice");
        assert_eq!(s.switch_organization(&table, "acme"), Some(Role::Admin));
        assert!(s.has_permission(Permission::OrgDelete));

        assert_eq!(s.switch_organization(&table, "globex"), Some(Role::Member));
        assert!(!s.has_permission(Permission::OrgDelete));
        assert!(s.has_permission(Permission::ProductRead));
    }

    #[test]
    fn failed_resolution_drops_previous_role() {
        let mut s = OrgSession::new("alice");
        s.switch_organization(&table, "acme");
        assert_eq!(s.switch_organization(&table, "down"), None);
        assert_eq!(s.organization_id(), Some("down"));
        assert!(s.permissions().is_empty());
    }

    #[test]
    fn non_member_gets_nothing() {
        let mut s = OrgSession::new("mallory");
        assert_eq!(s.switch_organization(&table, "acme"), None);
        assert!(!s.capabilities().can_view_reports());
    }

    #[test]
    fn require_in_refuses_other_organizations() {
        let mut s = OrgSession::new("alice");
        s.switch_organization(&table, "globex");
        assert!(s.require_in("globex", Permission::ProductRead).is_ok());
        assert!(matches!(
            s.require_in("acme", Permission::ProductRead),
            Err(AuthzError::WrongOrganization { .. })
        ));
        assert!(matches!(
            s.require_in("globex", Permission::ProductCreate),
            Err(AuthzError::Forbidden { role: Some(Role::Member), .. })
        ));
    }

    #[test]
    fn refresh_and_clear() {
        let mut s = OrgSession::new("alice");
        assert_eq!(s.refresh(&table), None);
        s.switch_organization(&table, "acme");
        assert_eq!(s.refresh(&table), Some(Role::Admin));
        s.clear();
        assert_eq!(s.role(), None);
        assert_eq!(s.organization_id(), None);
    }
}
